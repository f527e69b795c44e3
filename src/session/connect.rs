//! 连接管理
//!
//! 检查 adapter 状态，选择第一个已配对设备（不排序），打开串口服务通道并连接。
//! 只负责一次尝试；是否重试由调用方根据 [`ConfigError::is_transient`] 决定。

use tracing::{debug, info, warn};

use crate::error::ConfigError;
use crate::link::{Adapter, AdapterState, DeviceInfo, SERIAL_PORT_SERVICE_UUID, Transport};

use super::journal::Journal;

/// 一次成功的连接
pub struct Connection {
    pub device: DeviceInfo,
    pub transport: Box<dyn Transport>,
}

pub struct ConnectionManager {
    adapter: Box<dyn Adapter>,
    service_uuid: String,
    attempts: u64,
}

impl ConnectionManager {
    pub fn new(adapter: Box<dyn Adapter>) -> Self {
        Self {
            adapter,
            service_uuid: SERIAL_PORT_SERVICE_UUID.to_string(),
            attempts: 0,
        }
    }

    /// 目前为止的连接尝试次数（含失败）
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    #[tracing::instrument(skip_all)]
    pub fn connect(&mut self, journal: &mut Journal) -> Result<Connection, ConfigError> {
        self.attempts += 1;

        match self.adapter.state() {
            AdapterState::Absent => {
                journal.error("No Bluetooth adapter found, aborting.");
                return Err(ConfigError::AdapterUnavailable(AdapterState::Absent));
            }
            AdapterState::Disabled => {
                journal.error("Bluetooth adapter found, but it is disabled. Aborting.");
                return Err(ConfigError::AdapterUnavailable(AdapterState::Disabled));
            }
            AdapterState::Enabled => {}
        }

        journal.status("Bluetooth enabled, checking for paired devices...");
        self.adapter.start_discovery();

        let devices = self.adapter.bonded_devices();
        let count = devices.len();
        let Some(device) = devices.into_iter().next() else {
            debug!("bonded device list is empty");
            return Err(ConfigError::NoCandidateDevice);
        };

        journal.status(format!(
            "Found {count} paired devices. Using the first device."
        ));
        journal.status(format!("Using device {} for configuration.", device.name));

        match self.open_and_connect(&device) {
            Ok(transport) => {
                info!(device = %device.name, address = %device.address, "🔗 transport connected");
                Ok(Connection { device, transport })
            }
            Err(source) => {
                warn!(device = %device.name, error = %source, "connect failed");
                // 候选设备与 transport 直接丢弃，下次尝试重新发现
                self.adapter.start_discovery();
                Err(ConfigError::ConnectFailure {
                    device: device.name,
                    source,
                })
            }
        }
    }

    fn open_and_connect(&mut self, device: &DeviceInfo) -> std::io::Result<Box<dyn Transport>> {
        let mut transport = self.adapter.open(device, &self.service_uuid)?;
        // discovery 会拖慢连接
        self.adapter.cancel_discovery();
        transport.connect()?;
        Ok(transport)
    }
}
