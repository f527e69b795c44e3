//! 命令包与阶段队列
//!
//! 队列只支持尾部追加、头部弹出：插入顺序即发送顺序。

use std::collections::VecDeque;

use super::bridge::BridgeCommand;
use super::ubx::UbxFrame;

/// 一个待发送的命令包（入队后不再修改）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub payload: Vec<u8>,
    pub description: String,
}

impl Packet {
    pub fn new(payload: Vec<u8>, description: impl Into<String>) -> Self {
        Self {
            payload,
            description: description.into(),
        }
    }

    /// Bridge ASCII 命令
    pub fn bridge(cmd: BridgeCommand) -> Self {
        Self::new(cmd.encode(), cmd.describe())
    }

    /// Receiver UBX 帧
    pub fn ubx(frame: &UbxFrame, description: impl Into<String>) -> Self {
        Self::new(frame.encode(), description)
    }
}

/// 某个阶段的发送队列
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseQueue {
    q: VecDeque<Packet>,
}

impl PhaseQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pkt: Packet) {
        self.q.push_back(pkt);
    }

    pub fn pop(&mut self) -> Option<Packet> {
        self.q.pop_front()
    }

    pub fn len(&self) -> usize {
        self.q.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Packet> {
        self.q.iter()
    }
}

impl FromIterator<Packet> for PhaseQueue {
    fn from_iter<I: IntoIterator<Item = Packet>>(iter: I) -> Self {
        Self {
            q: iter.into_iter().collect(),
        }
    }
}
