//! 配置 profile
//!
//! 一份 JSON 文件描述时序常量、bridge 参数与 receiver 参数；所有段落都可省略，
//! 省略时使用经验默认值（硬件生效所需的等待时间，并非协议规定）。

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::bridge::{BridgeBaud, Parity};
use crate::catalog::ubx::{DEV_BBR, DEV_FLASH, PROTO_NMEA, PROTO_RTCM, PROTO_UBX};
use crate::error::ProfileError;
use crate::sim::SimTime;

pub const PROFILE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub schema_version: u32,
    #[serde(default)]
    pub timing: Timing,
    #[serde(default)]
    pub bridge: BridgeSettings,
    #[serde(default)]
    pub receiver: ReceiverSettings,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            schema_version: PROFILE_SCHEMA_VERSION,
            timing: Timing::default(),
            bridge: BridgeSettings::default(),
            receiver: ReceiverSettings::default(),
        }
    }
}

impl Profile {
    pub fn from_json_str(raw: &str) -> Result<Self, ProfileError> {
        let profile: Profile = serde_json::from_str(raw)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn from_path(path: &Path) -> Result<Self, ProfileError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    fn validate(&self) -> Result<(), ProfileError> {
        if self.schema_version != PROFILE_SCHEMA_VERSION {
            return Err(ProfileError::UnsupportedSchema(
                self.schema_version,
                PROFILE_SCHEMA_VERSION,
            ));
        }
        if self.receiver.in_proto_mask == 0 || self.receiver.out_proto_mask == 0 {
            return Err(ProfileError::Invalid(
                "receiver protocol masks must not be empty".to_string(),
            ));
        }
        if self.receiver.device_mask == 0 {
            return Err(ProfileError::Invalid(
                "receiver device_mask selects no storage".to_string(),
            ));
        }
        Ok(())
    }
}

/// 时序常量（毫秒）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// 用户发起配置到第一次连接尝试
    pub start_delay_ms: u64,
    /// 连接失败/无设备后的固定重试间隔（不递增、不设上限）
    pub connect_retry_ms: u64,
    /// 打开输入/输出流后进入第一个 bridge 阶段
    pub streams_ready_ms: u64,
    /// 同一阶段内相邻两个包的间隔
    pub step_interval_ms: u64,
    /// 进入 ReceiverSetBaudRate
    pub receiver_baud_settle_ms: u64,
    /// 进入 BridgeSwitchTo38400（bridge 改波特率后的命令模式延迟）
    pub bridge_switch_settle_ms: u64,
    /// 进入 ReceiverSaveConfig（flash 提交延迟）
    pub receiver_save_settle_ms: u64,
    /// 其它阶段推进（包括进入 Done）
    pub phase_advance_ms: u64,
    /// Done 状态的慢速轮询间隔
    pub done_poll_ms: u64,
    /// Done 状态轮询次数，之后释放 transport
    pub done_polls: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            start_delay_ms: 100,
            connect_retry_ms: 5_000,
            streams_ready_ms: 0,
            step_interval_ms: 2_000,
            receiver_baud_settle_ms: 2_000,
            bridge_switch_settle_ms: 5_000,
            receiver_save_settle_ms: 5_000,
            phase_advance_ms: 2_000,
            done_poll_ms: 500,
            done_polls: 4,
        }
    }
}

impl Timing {
    pub fn start_delay(&self) -> SimTime {
        SimTime::from_millis(self.start_delay_ms)
    }
    pub fn connect_retry(&self) -> SimTime {
        SimTime::from_millis(self.connect_retry_ms)
    }
    pub fn step_interval(&self) -> SimTime {
        SimTime::from_millis(self.step_interval_ms)
    }
    pub fn done_poll(&self) -> SimTime {
        SimTime::from_millis(self.done_poll_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeSettings {
    /// bridge 与 receiver 出厂时共同使用的波特率
    pub initial_baud: BridgeBaud,
    /// 配置完成后两端使用的波特率
    pub target_baud: BridgeBaud,
    pub parity: Parity,
    /// 每组 bridge 命令之后显式退出命令模式
    pub exit_command_mode: bool,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            initial_baud: BridgeBaud::B9600,
            target_baud: BridgeBaud::B38400,
            parity: Parity::None,
            exit_command_mode: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverSettings {
    /// receiver 上连接 bridge 的 UART 端口号
    pub port_id: u8,
    pub in_proto_mask: u16,
    pub out_proto_mask: u16,
    /// CFG-CFG saveMask
    pub save_mask: u32,
    /// CFG-CFG deviceMask
    pub device_mask: u8,
}

impl Default for ReceiverSettings {
    fn default() -> Self {
        Self {
            port_id: 1,
            in_proto_mask: PROTO_UBX | PROTO_NMEA | PROTO_RTCM,
            out_proto_mask: PROTO_UBX | PROTO_NMEA,
            save_mask: 0x0000_FFFF,
            device_mask: DEV_BBR | DEV_FLASH,
        }
    }
}
