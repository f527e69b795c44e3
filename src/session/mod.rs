//! 配置会话
//!
//! 连接管理、命令序列器以及把二者挂到调度器上的事件与世界。

mod connect;
mod events;
mod journal;
mod sequencer;
mod world;

pub use connect::{Connection, ConnectionManager};
pub use events::{ConnectAttempt, SequencerStep};
pub use journal::{ConsoleLog, Journal, LogEntry, LogKind, LogSink, MemoryLog};
pub use sequencer::{Session, StepOutcome};
pub use world::{ConfigStats, ConfigWorld, SessionStatus};
