//! 配置世界
//!
//! 调度器事件访问的全部状态：连接管理器、包目录、时序、日志与当前会话。

use std::any::Any;

use tracing::{debug, error, info, trace};

use crate::catalog::{Catalog, Phase};
use crate::error::ConfigError;
use crate::link::Adapter;
use crate::settings::{Profile, Timing};
use crate::sim::{Scheduler, SimTime, World};
use crate::transcript::{Transcript, TranscriptKind};

use super::connect::ConnectionManager;
use super::events::{ConnectAttempt, SequencerStep};
use super::journal::{Journal, LogSink};
use super::sequencer::{Session, StepOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// 尚未调用 `start`
    Idle,
    /// 等待/重试连接
    Connecting,
    Configuring(Phase),
    Done,
    /// 致命错误，见 `last_error`
    Failed,
    /// 被外部停止
    Stopped,
}

impl SessionStatus {
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            SessionStatus::Done | SessionStatus::Failed | SessionStatus::Stopped
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigStats {
    pub connect_attempts: u64,
    pub sessions_started: u64,
    pub packets_written: u64,
    pub bytes_drained: u64,
}

pub struct ConfigWorld {
    pub journal: Journal,
    manager: ConnectionManager,
    catalog: Catalog,
    timing: Timing,
    session: Option<Session>,
    /// 每次 `start` 加一；旧一轮的连接重试据此作废
    run: u64,
    sessions_started: u64,
    retired: ConfigStats,
    status: SessionStatus,
    last_error: Option<ConfigError>,
}

impl ConfigWorld {
    pub fn new(adapter: Box<dyn Adapter>, profile: &Profile, sink: Box<dyn LogSink>) -> Self {
        Self {
            journal: Journal::new(sink),
            manager: ConnectionManager::new(adapter),
            catalog: Catalog::new(profile.bridge.clone(), profile.receiver.clone()),
            timing: profile.timing.clone(),
            session: None,
            run: 0,
            sessions_started: 0,
            retired: ConfigStats::default(),
            status: SessionStatus::Idle,
            last_error: None,
        }
    }

    /// 记录 JSON transcript（以 profile 作为第一条事件）
    pub fn enable_transcript(&mut self) {
        let profile = Profile {
            timing: self.timing.clone(),
            bridge: self.catalog.bridge.clone(),
            receiver: self.catalog.receiver.clone(),
            ..Profile::default()
        };
        self.journal.enable_transcript(profile);
    }

    pub fn take_transcript(&mut self) -> Option<Transcript> {
        self.journal.take_transcript()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn last_error(&self) -> Option<&ConfigError> {
        self.last_error.as_ref()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn stats(&self) -> ConfigStats {
        let mut s = self.retired;
        s.connect_attempts = self.manager.attempts();
        s.sessions_started = self.sessions_started;
        if let Some(cur) = &self.session {
            s.packets_written += cur.packets_written();
            s.bytes_drained += cur.bytes_drained();
        }
        s
    }

    /// 开始（或从头重新开始）配置：在启动延迟后发起第一次连接尝试。
    pub fn start(&mut self, sched: &mut Scheduler) {
        self.journal.set_now(sched.now());
        self.retire_session();
        self.run += 1;
        self.last_error = None;
        self.status = SessionStatus::Connecting;
        self.journal.status("Starting configurator...");
        sched.schedule_after(self.timing.start_delay(), ConnectAttempt { run: self.run });
    }

    /// 外部停止：释放 transport，之后残留的事件都会被忽略。
    pub fn shutdown(&mut self, sched: &mut Scheduler) {
        self.journal.set_now(sched.now());
        if let Some(session) = self.session.as_mut() {
            if session.release(&mut self.journal) {
                self.journal.status("Configuration stopped.");
            }
        }
        if !self.status.is_finished() {
            self.status = SessionStatus::Stopped;
        }
        info!(status = ?self.status, pending = sched.pending(), "configurator shut down");
    }

    pub(crate) fn on_connect_attempt(&mut self, run: u64, sched: &mut Scheduler) {
        if run != self.run || self.status != SessionStatus::Connecting {
            trace!(run, current = self.run, status = ?self.status, "stale connect attempt ignored");
            return;
        }
        self.journal.set_now(sched.now());
        self.journal.record(TranscriptKind::ConnectAttempt {
            attempt: self.manager.attempts() + 1,
        });

        match self.manager.connect(&mut self.journal) {
            Ok(conn) => {
                self.retire_session();
                self.sessions_started += 1;
                let id = self.sessions_started;
                self.journal.record(TranscriptKind::Connected {
                    session: id,
                    device: conn.device.name.clone(),
                });
                self.session = Some(Session::new(id, conn.device.name, conn.transport));
                self.last_error = None;
                self.status = SessionStatus::Configuring(Phase::Connected);
                sched.schedule_after(SimTime::ZERO, SequencerStep { session: id });
            }
            Err(e) if e.is_transient() => {
                let retry = self.timing.connect_retry();
                self.journal.error(retry_message(&e, retry));
                self.journal.record(TranscriptKind::ConnectFailed {
                    error: e.to_string(),
                    retry_in_ms: Some(retry.as_millis()),
                });
                self.last_error = Some(e);
                sched.schedule_after(retry, ConnectAttempt { run });
            }
            Err(e) => {
                self.journal.record(TranscriptKind::ConnectFailed {
                    error: e.to_string(),
                    retry_in_ms: None,
                });
                self.fail(None, e);
            }
        }
    }

    pub(crate) fn on_step(&mut self, session_id: u64, sched: &mut Scheduler) {
        let Some(session) = self.session.as_mut().filter(|s| s.id() == session_id) else {
            trace!(session_id, "step for a retired session ignored");
            return;
        };
        if !session.is_open() {
            trace!(session_id, "step after release ignored");
            return;
        }
        self.journal.set_now(sched.now());

        match session.step(&self.catalog, &self.timing, &mut self.journal) {
            StepOutcome::Continue(delay) => {
                self.status = SessionStatus::Configuring(session.phase());
                sched.schedule_after(delay, SequencerStep {
                    session: session_id,
                });
            }
            StepOutcome::Finished => {
                self.journal.record(TranscriptKind::Done {
                    session: session_id,
                });
                self.status = SessionStatus::Done;
            }
            StepOutcome::Aborted(e) => self.fail(Some(session_id), e),
        }
    }

    fn fail(&mut self, session: Option<u64>, e: ConfigError) {
        error!(?session, error = %e, "configuration aborted");
        self.journal.record(TranscriptKind::Aborted {
            session,
            error: e.to_string(),
        });
        self.status = SessionStatus::Failed;
        self.last_error = Some(e);
    }

    /// 丢弃旧会话（先释放 transport），把它的计数并入累计值。
    fn retire_session(&mut self) {
        if let Some(mut old) = self.session.take() {
            old.release(&mut self.journal);
            self.retired.packets_written += old.packets_written();
            self.retired.bytes_drained += old.bytes_drained();
            debug!(session = old.id(), "session retired");
        }
    }
}

/// 可重试错误的用户提示，例如 "No paired bluetooth devices found. Retrying in 5 seconds."
fn retry_message(e: &ConfigError, retry: SimTime) -> String {
    let secs = retry.as_millis() as f64 / 1_000.0;
    match e {
        ConfigError::NoCandidateDevice => {
            format!("No paired bluetooth devices found. Retrying in {secs} seconds.")
        }
        ConfigError::ConnectFailure { source, .. } => {
            format!("Caught I/O error creating serial channel: {source}. Retrying in {secs} seconds.")
        }
        other => format!("{other}. Retrying in {secs} seconds."),
    }
}

impl World for ConfigWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
