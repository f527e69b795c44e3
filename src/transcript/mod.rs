//! 会话记录（JSON transcript）
//!
//! 与面向用户的日志行不同，这里记录结构化事件，便于离线检查一次配置过程：
//! 每次连接尝试、阶段切换、发送的字节（hex）以及读到的回包。

mod types;

pub use types::{Transcript, TranscriptEvent, TranscriptKind};
