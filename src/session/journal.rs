//! 用户日志
//!
//! 面向用户的日志输出，外加可选的结构化 transcript。

use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

use tracing::{debug, error, info};

use crate::settings::Profile;
use crate::sim::SimTime;
use crate::transcript::{Transcript, TranscriptKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    /// Progress line (phase descriptions, connection steps).
    Status,
    Error,
    /// Bytes drained from the transport, decoded lossily.
    Inbound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub kind: LogKind,
    pub text: String,
}

/// Receives log lines in the order they happen.
pub trait LogSink: Send {
    fn append(&mut self, entry: LogEntry);
}

/// Keeps every entry in memory; clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn texts(&self, kind: LogKind) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.text)
            .collect()
    }
}

impl LogSink for MemoryLog {
    fn append(&mut self, entry: LogEntry) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(entry);
    }
}

/// Prints entries to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleLog;

impl LogSink for ConsoleLog {
    fn append(&mut self, entry: LogEntry) {
        match entry.kind {
            LogKind::Status => println!("{}", entry.text),
            LogKind::Error => println!("error: {}", entry.text),
            LogKind::Inbound => println!("<< {}", entry.text.escape_debug()),
        }
    }
}

pub(crate) fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{b:02x}");
    }
    out
}

/// 一次运行的所有输出都经过这里分发
pub struct Journal {
    sink: Box<dyn LogSink>,
    transcript: Option<Transcript>,
    now: SimTime,
}

impl Journal {
    pub fn new(sink: Box<dyn LogSink>) -> Self {
        Self {
            sink,
            transcript: None,
            now: SimTime::ZERO,
        }
    }

    /// Start recording; the profile becomes the first event.
    pub fn enable_transcript(&mut self, profile: Profile) {
        let mut t = Transcript::default();
        t.push(self.now.0, TranscriptKind::Meta { profile });
        self.transcript = Some(t);
    }

    pub fn take_transcript(&mut self) -> Option<Transcript> {
        self.transcript.take()
    }

    pub fn set_now(&mut self, now: SimTime) {
        self.now = now;
    }

    pub fn status(&mut self, text: impl Into<String>) {
        let text = text.into();
        info!(t_ms = self.now.as_millis(), "{text}");
        self.sink.append(LogEntry {
            kind: LogKind::Status,
            text,
        });
    }

    pub fn error(&mut self, text: impl Into<String>) {
        let text = text.into();
        error!(t_ms = self.now.as_millis(), "{text}");
        self.sink.append(LogEntry {
            kind: LogKind::Error,
            text,
        });
    }

    pub fn inbound(&mut self, session: u64, bytes: &[u8]) {
        let text = String::from_utf8_lossy(bytes).into_owned();
        debug!(session, bytes = bytes.len(), hex = %hex(bytes), "drained inbound bytes");
        self.record(TranscriptKind::Drained {
            session,
            bytes: bytes.len(),
            text: text.clone(),
        });
        self.sink.append(LogEntry {
            kind: LogKind::Inbound,
            text,
        });
    }

    pub fn record(&mut self, kind: TranscriptKind) {
        if let Some(t) = &mut self.transcript {
            t.push(self.now.0, kind);
        }
    }
}
