//! 命令序列器（状态机）
//!
//! 每个会话持有一个 transport 和当前阶段的发送队列。每次 tick：
//! 1. 非阻塞地读走已缓冲的回包并写入日志；
//! 2. 弹出队首包并写出；
//! 3. 队列空则推进到下一阶段并按该阶段的进入延迟调度，否则按固定间隔调度。
//!
//! 写失败是致命的：记录错误、释放 transport、不再调度。

use std::io;

use tracing::{debug, info, trace, warn};

use crate::catalog::{Catalog, Phase, PhaseQueue};
use crate::error::ConfigError;
use crate::link::Transport;
use crate::settings::Timing;
use crate::sim::SimTime;
use crate::transcript::TranscriptKind;

use super::journal::{Journal, hex};

/// 一次 tick 的结果
#[derive(Debug)]
pub enum StepOutcome {
    /// 在给定延迟后再 tick 一次
    Continue(SimTime),
    /// 正常结束，transport 已释放
    Finished,
    /// 致命错误，transport 已释放
    Aborted(ConfigError),
}

pub struct Session {
    id: u64,
    device: String,
    phase: Phase,
    queue: PhaseQueue,
    transport: Option<Box<dyn Transport>>,
    done_polls_left: u32,
    packets_written: u64,
    bytes_drained: u64,
}

impl Session {
    /// 新会话总是从 `Connected` 开始
    pub fn new(id: u64, device: impl Into<String>, transport: Box<dyn Transport>) -> Self {
        Self {
            id,
            device: device.into(),
            phase: Phase::Connected,
            queue: PhaseQueue::new(),
            transport: Some(transport),
            done_polls_left: 0,
            packets_written: 0,
            bytes_drained: 0,
        }
    }

    /// 直接置于某个阶段（队列为空），用于检验不变量
    #[cfg(test)]
    pub(crate) fn at_phase(id: u64, transport: Box<dyn Transport>, phase: Phase) -> Self {
        let mut s = Self::new(id, "test", transport);
        s.phase = phase;
        s
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// transport 是否仍未释放
    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    pub fn packets_written(&self) -> u64 {
        self.packets_written
    }

    pub fn bytes_drained(&self) -> u64 {
        self.bytes_drained
    }

    #[tracing::instrument(skip_all, fields(session = self.id, phase = ?self.phase))]
    pub fn step(&mut self, catalog: &Catalog, timing: &Timing, journal: &mut Journal) -> StepOutcome {
        match self.phase {
            Phase::Connected => self.open_streams(catalog, timing, journal),
            Phase::Done => self.linger(timing, journal),
            _ => self.send_next(catalog, timing, journal),
        }
    }

    fn open_streams(&mut self, catalog: &Catalog, timing: &Timing, journal: &mut Journal) -> StepOutcome {
        let res = match self.transport.as_mut() {
            Some(t) => t.open_streams(),
            None => Err(not_connected()),
        };
        if let Err(e) = res {
            journal.error(format!("Caught I/O error creating streams: {e}"));
            self.release(journal);
            return StepOutcome::Aborted(ConfigError::StreamSetupFailure(e));
        }
        journal.status("Successfully setup input and output streams.");
        StepOutcome::Continue(self.advance(catalog, timing, journal))
    }

    fn send_next(&mut self, catalog: &Catalog, timing: &Timing, journal: &mut Journal) -> StepOutcome {
        self.drain(journal);

        let Some(pkt) = self.queue.pop() else {
            let err = ConfigError::SequencingInvariantViolation { phase: self.phase };
            journal.error(format!("Sequencing error: {err}"));
            self.release(journal);
            return StepOutcome::Aborted(err);
        };

        let res = match self.transport.as_mut() {
            Some(t) => t.write(&pkt.payload),
            None => Err(not_connected()),
        };
        if let Err(source) = res {
            journal.error(format!(
                "Caught I/O error while\n\t{}:\n\t{}",
                pkt.description, source
            ));
            self.release(journal);
            return StepOutcome::Aborted(ConfigError::WriteFailure {
                description: pkt.description,
                source,
            });
        }

        self.packets_written += 1;
        trace!(bytes = pkt.payload.len(), remaining = self.queue.len(), "packet written");
        journal.record(TranscriptKind::PacketSent {
            session: self.id,
            phase: self.phase,
            description: pkt.description.clone(),
            bytes_hex: hex(&pkt.payload),
        });
        journal.status(pkt.description);

        if self.queue.is_empty() {
            StepOutcome::Continue(self.advance(catalog, timing, journal))
        } else {
            StepOutcome::Continue(timing.step_interval())
        }
    }

    /// Done：慢速轮询读走尾部回包，次数用尽后释放 transport。
    fn linger(&mut self, timing: &Timing, journal: &mut Journal) -> StepOutcome {
        self.drain(journal);
        if self.done_polls_left > 0 {
            self.done_polls_left -= 1;
            return StepOutcome::Continue(timing.done_poll());
        }
        self.release(journal);
        info!(session = self.id, packets = self.packets_written, "✅ configuration finished");
        StepOutcome::Finished
    }

    /// 进入下一阶段并构造其队列，返回该阶段的进入延迟。
    fn advance(&mut self, catalog: &Catalog, timing: &Timing, journal: &mut Journal) -> SimTime {
        let Some(next) = self.phase.next() else {
            return timing.done_poll();
        };
        debug!(from = ?self.phase, to = ?next, "phase advance");
        self.phase = next;
        self.queue = catalog.queue(next);
        journal.record(TranscriptKind::PhaseEnter {
            session: self.id,
            phase: next,
        });
        if next.is_terminal() {
            self.done_polls_left = timing.done_polls;
            journal.status("Done!");
        }
        next.entry_delay(timing)
    }

    /// 读走当前已缓冲的字节；没有数据时立即返回 0。
    pub fn drain(&mut self, journal: &mut Journal) -> usize {
        let Some(t) = self.transport.as_mut() else {
            return 0;
        };
        match t.read_available() {
            Ok(bytes) if bytes.is_empty() => 0,
            Ok(bytes) => {
                self.bytes_drained += bytes.len() as u64;
                journal.inbound(self.id, &bytes);
                bytes.len()
            }
            Err(e) => {
                debug!(error = %e, "drain failed, skipping");
                0
            }
        }
    }

    /// 关闭并丢弃 transport。只有第一次调用会真正关闭，返回是否关闭了。
    pub fn release(&mut self, journal: &mut Journal) -> bool {
        let Some(mut t) = self.transport.take() else {
            return false;
        };
        if let Err(e) = t.close() {
            journal.error(format!("I/O error closing transport: {e}"));
        }
        journal.record(TranscriptKind::Closed { session: self.id });
        debug!(session = self.id, device = %self.device, "transport released");
        true
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(mut t) = self.transport.take() {
            warn!(session = self.id, device = %self.device, "session dropped with an open transport, closing");
            let _ = t.close();
        }
    }
}

fn not_connected() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "transport already released")
}
