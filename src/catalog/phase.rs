//! 配置阶段表
//!
//! 阶段单调推进：`Connected → BridgeEnterCommandMode9600 → ReceiverSetBaudRate →
//! BridgeSwitchTo38400 → ReceiverSaveConfig → Done`。

use serde::{Deserialize, Serialize};

use crate::settings::{BridgeSettings, ReceiverSettings, Timing};
use crate::sim::SimTime;

use super::bridge::BridgeCommand;
use super::packet::{Packet, PhaseQueue};
use super::ubx::{CfgCfg, CfgPrt, DEV_BBR, DEV_EEPROM, DEV_FLASH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// transport 已连接，尚未打开输入/输出流
    Connected,
    BridgeEnterCommandMode9600,
    ReceiverSetBaudRate,
    BridgeSwitchTo38400,
    ReceiverSaveConfig,
    Done,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::Connected,
        Phase::BridgeEnterCommandMode9600,
        Phase::ReceiverSetBaudRate,
        Phase::BridgeSwitchTo38400,
        Phase::ReceiverSaveConfig,
        Phase::Done,
    ];

    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Connected => Some(Phase::BridgeEnterCommandMode9600),
            Phase::BridgeEnterCommandMode9600 => Some(Phase::ReceiverSetBaudRate),
            Phase::ReceiverSetBaudRate => Some(Phase::BridgeSwitchTo38400),
            Phase::BridgeSwitchTo38400 => Some(Phase::ReceiverSaveConfig),
            Phase::ReceiverSaveConfig => Some(Phase::Done),
            Phase::Done => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Phase::Done
    }

    /// 该阶段是否有发送队列
    pub fn sends_packets(self) -> bool {
        !matches!(self, Phase::Connected | Phase::Done)
    }

    /// 进入该阶段后第一次 tick 之前的等待时间
    pub fn entry_delay(self, timing: &Timing) -> SimTime {
        let ms = match self {
            Phase::Connected => 0,
            Phase::BridgeEnterCommandMode9600 => timing.streams_ready_ms,
            Phase::ReceiverSetBaudRate => timing.receiver_baud_settle_ms,
            Phase::BridgeSwitchTo38400 => timing.bridge_switch_settle_ms,
            Phase::ReceiverSaveConfig => timing.receiver_save_settle_ms,
            Phase::Done => timing.phase_advance_ms,
        };
        SimTime::from_millis(ms)
    }
}

/// 包目录：给定阶段返回其有序队列。无 I/O、无可变状态，每次进入阶段时重新构造。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub bridge: BridgeSettings,
    pub receiver: ReceiverSettings,
}

impl Catalog {
    pub fn new(bridge: BridgeSettings, receiver: ReceiverSettings) -> Self {
        Self { bridge, receiver }
    }

    pub fn queue(&self, phase: Phase) -> PhaseQueue {
        let b = &self.bridge;
        let r = &self.receiver;
        let mut q = PhaseQueue::new();
        match phase {
            Phase::Connected | Phase::Done => {}
            Phase::BridgeEnterCommandMode9600 => {
                q.push(Packet::bridge(BridgeCommand::EnterCommandMode));
                q.push(Packet::bridge(BridgeCommand::TemporaryBaud {
                    baud: b.initial_baud,
                    parity: b.parity,
                }));
                self.push_exit(&mut q);
            }
            Phase::ReceiverSetBaudRate => {
                let prt = CfgPrt::uart(
                    r.port_id,
                    b.target_baud.bps(),
                    r.in_proto_mask,
                    r.out_proto_mask,
                );
                q.push(Packet::ubx(
                    &prt.to_frame(),
                    format!(
                        "Configuring receiver UART{} baud rate to {}bps",
                        r.port_id, b.target_baud
                    ),
                ));
            }
            Phase::BridgeSwitchTo38400 => {
                q.push(Packet::bridge(BridgeCommand::EnterCommandMode));
                q.push(Packet::bridge(BridgeCommand::PermanentBaud(b.target_baud)));
                q.push(Packet::bridge(BridgeCommand::TemporaryBaud {
                    baud: b.target_baud,
                    parity: b.parity,
                }));
                self.push_exit(&mut q);
            }
            Phase::ReceiverSaveConfig => {
                let cfg = CfgCfg::save(r.save_mask, r.device_mask);
                q.push(Packet::ubx(
                    &cfg.to_frame(),
                    format!(
                        "Saving receiver configuration to {}",
                        storage_names(r.device_mask)
                    ),
                ));
            }
        }
        q
    }

    fn push_exit(&self, q: &mut PhaseQueue) {
        if self.bridge.exit_command_mode {
            q.push(Packet::bridge(BridgeCommand::ExitCommandMode));
        }
    }
}

fn storage_names(mask: u8) -> String {
    let names: Vec<&str> = [(DEV_BBR, "BBR"), (DEV_FLASH, "Flash"), (DEV_EEPROM, "EEPROM")]
        .into_iter()
        .filter(|(bit, _)| mask & bit != 0)
        .map(|(_, name)| name)
        .collect();
    match names.as_slice() {
        [] => format!("devices {mask:#04x}"),
        [one] => one.to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}
