use serde::{Deserialize, Serialize};

use crate::catalog::Phase;
use crate::settings::Profile;

/// transcript 事件类型
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TranscriptKind {
    /// 本次运行使用的 profile（作为第一条事件）
    Meta { profile: Profile },
    ConnectAttempt { attempt: u64 },
    /// 连接失败；`retry_in_ms` 为空表示不再重试
    ConnectFailed {
        error: String,
        retry_in_ms: Option<u64>,
    },
    Connected { session: u64, device: String },
    PhaseEnter { session: u64, phase: Phase },
    PacketSent {
        session: u64,
        phase: Phase,
        description: String,
        bytes_hex: String,
    },
    /// 阶段之间读到的回包（按 UTF-8 宽松解码）
    Drained {
        session: u64,
        bytes: usize,
        text: String,
    },
    Aborted {
        #[serde(skip_serializing_if = "Option::is_none")]
        session: Option<u64>,
        error: String,
    },
    Closed { session: u64 },
    Done { session: u64 },
}

/// 一条带时间戳的事件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEvent {
    /// 会话时间（纳秒，和 `SimTime.0` 同口径）
    pub t_ns: u64,
    #[serde(flatten)]
    pub kind: TranscriptKind,
}

/// 事件收集器（存内存，运行结束写 JSON 文件）
#[derive(Debug, Default)]
pub struct Transcript {
    pub events: Vec<TranscriptEvent>,
}

impl Transcript {
    pub fn push(&mut self, t_ns: u64, kind: TranscriptKind) {
        self.events.push(TranscriptEvent { t_ns, kind });
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.events)
    }
}
