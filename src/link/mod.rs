//! 链路层：设备发现与传输
//!
//! 配置器不直接操作无线电：[`Adapter`] 列出已配对设备并交出 [`Transport`]，
//! 之后一切都只是字节流。

use std::io;

#[cfg(test)]
pub mod mock;
pub mod tcp;

#[cfg(test)]
pub use mock::{LinkProbe, ScriptedAdapter, ScriptedTransport, SharedProbe};
pub use tcp::{TcpAdapter, TcpTransport};

/// Serial Port Profile service class.
pub const SERIAL_PORT_SERVICE_UUID: &str = "00001101-0000-1000-8000-00805F9B34FB";

/// Radio availability as reported by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    Absent,
    Disabled,
    Enabled,
}

/// A bonded (paired) device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: String,
    pub address: String,
}

impl DeviceInfo {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

/// 到 bridge 的双向字节流
pub trait Transport: Send {
    /// Open the channel. Called once per transport.
    fn connect(&mut self) -> io::Result<()>;
    /// Obtain the input/output halves of a connected channel.
    fn open_streams(&mut self) -> io::Result<()>;
    /// Whatever is already buffered; never waits. Empty when nothing is pending.
    fn read_available(&mut self) -> io::Result<Vec<u8>>;
    /// May block briefly; callers do not retry.
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;
    fn close(&mut self) -> io::Result<()>;
}

/// 设备发现层，负责创建 transport
pub trait Adapter: Send {
    fn state(&self) -> AdapterState;
    fn bonded_devices(&mut self) -> Vec<DeviceInfo>;
    fn start_discovery(&mut self) {}
    fn cancel_discovery(&mut self) {}
    /// Create an unconnected transport to `service_uuid` on `device`.
    fn open(&mut self, device: &DeviceInfo, service_uuid: &str) -> io::Result<Box<dyn Transport>>;
}
