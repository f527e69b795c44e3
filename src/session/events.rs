//! 调度器事件：连接尝试与序列器 tick。

use crate::sim::{Event, Scheduler, World};

use super::world::ConfigWorld;

fn config_world(world: &mut dyn World) -> &mut ConfigWorld {
    world
        .as_any_mut()
        .downcast_mut::<ConfigWorld>()
        .expect("world must be ConfigWorld")
}

/// 事件：尝试发现并连接设备。`run` 不是当前这一轮 `start` 时忽略。
#[derive(Debug)]
pub struct ConnectAttempt {
    pub run: u64,
}

impl Event for ConnectAttempt {
    fn execute(self: Box<Self>, sched: &mut Scheduler, world: &mut dyn World) {
        let ConnectAttempt { run } = *self;
        config_world(world).on_connect_attempt(run, sched);
    }
}

/// 事件：推进某个会话的状态机一步。会话已结束或被替换时忽略。
#[derive(Debug)]
pub struct SequencerStep {
    pub session: u64,
}

impl Event for SequencerStep {
    fn execute(self: Box<Self>, sched: &mut Scheduler, world: &mut dyn World) {
        let SequencerStep { session } = *self;
        config_world(world).on_step(session, sched);
    }
}
