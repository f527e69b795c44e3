//! 调度核心模块
//!
//! 此模块包含单线程延迟调度所需的组件：时间、事件、世界和调度器。

// 子模块声明
mod event;
mod scheduled_event;
mod scheduler;
mod time;
mod world;

// 重新导出公共接口
pub use event::Event;
pub use scheduled_event::ScheduledEvent;
pub use scheduler::{PacedExit, Scheduler};
pub use time::SimTime;
pub use world::World;
