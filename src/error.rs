//! 错误类型
//!
//! `ConfigError` 描述一次配置运行中断或结束的原因，`ProfileError` 描述 profile 加载失败。

use std::io;

use thiserror::Error;

use crate::catalog::Phase;
use crate::link::AdapterState;

/// 配置运行中的错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Radio missing or switched off. Not retried.
    #[error("Bluetooth adapter unavailable ({0:?})")]
    AdapterUnavailable(AdapterState),

    /// No bonded device to connect to yet.
    #[error("no paired device found")]
    NoCandidateDevice,

    /// Opening the serial-profile channel failed.
    #[error("connecting to {device} failed: {source}")]
    ConnectFailure {
        device: String,
        #[source]
        source: io::Error,
    },

    /// Connected, but the input/output streams could not be obtained.
    #[error("stream setup failed: {0}")]
    StreamSetupFailure(#[source] io::Error),

    /// Writing a packet failed mid-sequence.
    #[error("write failed while {description}: {source}")]
    WriteFailure {
        description: String,
        #[source]
        source: io::Error,
    },

    /// A phase was stepped with an empty queue.
    #[error("phase {phase:?} stepped with an empty packet queue")]
    SequencingInvariantViolation { phase: Phase },
}

impl ConfigError {
    /// Transient errors are retried after the fixed connect delay; everything else ends the run.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ConfigError::NoCandidateDevice | ConfigError::ConnectFailure { .. }
        )
    }
}

/// 加载 JSON profile 时的错误
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported profile schema_version {0} (expected {1})")]
    UnsupportedSchema(u32, u32),

    #[error("invalid profile: {0}")]
    Invalid(String),
}
