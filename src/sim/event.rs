//! 事件 trait
//!
//! 定义可被调度器延迟执行的回调接口。

use super::scheduler::Scheduler;
use super::world::World;

/// 事件：被调度后只执行一次。使用 `self: Box<Self>` 以支持 move/所有权转移。
pub trait Event: Send + 'static {
    fn execute(self: Box<Self>, sched: &mut Scheduler, world: &mut dyn World);
}
