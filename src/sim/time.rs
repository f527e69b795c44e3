//! 调度时间类型
//!
//! 定义会话时间轴上的时间点/时长及其单位转换。

use std::time::Duration;

/// 会话时间（纳秒）。既表示时间点，也表示延迟。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    pub fn from_micros(us: u64) -> SimTime {
        SimTime(us.saturating_mul(1_000))
    }
    pub fn from_millis(ms: u64) -> SimTime {
        SimTime(ms.saturating_mul(1_000_000))
    }
    pub fn from_secs(s: u64) -> SimTime {
        SimTime(s.saturating_mul(1_000_000_000))
    }

    /// 截断到毫秒
    pub fn as_millis(self) -> u64 {
        self.0 / 1_000_000
    }

    /// `self + delay`，溢出时饱和
    pub fn after(self, delay: SimTime) -> SimTime {
        SimTime(self.0.saturating_add(delay.0))
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_nanos(self.0)
    }
}
