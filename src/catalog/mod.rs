//! 包目录（Packet Catalog）
//!
//! 每个配置阶段要发送的命令包：bridge 的 ASCII 命令与 receiver 的 UBX 二进制帧。

pub mod bridge;
mod packet;
mod phase;
pub mod ubx;

pub use bridge::{BridgeBaud, BridgeCommand, Parity};
pub use packet::{Packet, PhaseQueue};
pub use phase::{Catalog, Phase};
pub use ubx::{CfgCfg, CfgPrt, UbxFrame};
