//! 测试用的内存 adapter/transport
//!
//! 同一个 [`ScriptedAdapter`] 交出的所有 transport 共享一个 [`LinkProbe`]，
//! 测试可以预置回包、注入失败，并在重连之后检查写出的内容。

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{Adapter, AdapterState, DeviceInfo, Transport};

#[derive(Debug, Default)]
pub struct LinkProbe {
    /// Successful writes, in order.
    pub writes: Vec<Vec<u8>>,
    /// Inbound chunks; one chunk is returned per `read_available`.
    pub inbound: VecDeque<Vec<u8>>,
    pub opened: u32,
    pub connect_calls: u32,
    pub read_calls: u32,
    pub close_calls: u32,
    /// Fail this many `connect` calls before succeeding.
    pub fail_connects: u32,
    pub fail_open_streams: bool,
    /// Fail the write with this zero-based index (counted across all writes).
    pub fail_write_at: Option<usize>,
    /// `start_discovery` 调用次数
    pub discovery_starts: u32,
    /// `cancel_discovery` 调用次数
    pub discovery_cancels: u32,
    write_attempts: usize,
}

impl LinkProbe {
    pub fn push_inbound(&mut self, bytes: &[u8]) {
        self.inbound.push_back(bytes.to_vec());
    }

    /// All written bytes, concatenated.
    pub fn written(&self) -> Vec<u8> {
        self.writes.concat()
    }
}

pub type SharedProbe = Arc<Mutex<LinkProbe>>;

fn lock(probe: &SharedProbe) -> MutexGuard<'_, LinkProbe> {
    probe.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct ScriptedTransport {
    probe: SharedProbe,
}

impl ScriptedTransport {
    pub fn new(probe: SharedProbe) -> Self {
        Self { probe }
    }
}

impl Transport for ScriptedTransport {
    fn connect(&mut self) -> io::Result<()> {
        let mut p = lock(&self.probe);
        p.connect_calls += 1;
        if p.fail_connects > 0 {
            p.fail_connects -= 1;
            return Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "scripted connect failure",
            ));
        }
        Ok(())
    }

    fn open_streams(&mut self) -> io::Result<()> {
        if lock(&self.probe).fail_open_streams {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "scripted stream failure",
            ));
        }
        Ok(())
    }

    fn read_available(&mut self) -> io::Result<Vec<u8>> {
        let mut p = lock(&self.probe);
        p.read_calls += 1;
        Ok(p.inbound.pop_front().unwrap_or_default())
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut p = lock(&self.probe);
        let idx = p.write_attempts;
        p.write_attempts += 1;
        if p.fail_write_at == Some(idx) {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "scripted write failure",
            ));
        }
        p.writes.push(bytes.to_vec());
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        lock(&self.probe).close_calls += 1;
        Ok(())
    }
}

pub struct ScriptedAdapter {
    pub state: AdapterState,
    pub devices: Vec<DeviceInfo>,
    /// Bonded list appears empty for this many calls.
    pub hide_devices_for: u32,
    probe: SharedProbe,
}

impl ScriptedAdapter {
    pub fn new(probe: SharedProbe) -> Self {
        Self {
            state: AdapterState::Enabled,
            devices: vec![DeviceInfo::new("bridge", "00:06:66:00:00:01")],
            hide_devices_for: 0,
            probe,
        }
    }

    pub fn with_state(mut self, state: AdapterState) -> Self {
        self.state = state;
        self
    }
}

impl Adapter for ScriptedAdapter {
    fn state(&self) -> AdapterState {
        self.state
    }

    fn bonded_devices(&mut self) -> Vec<DeviceInfo> {
        if self.hide_devices_for > 0 {
            self.hide_devices_for -= 1;
            return Vec::new();
        }
        self.devices.clone()
    }

    fn start_discovery(&mut self) {
        lock(&self.probe).discovery_starts += 1;
    }

    fn cancel_discovery(&mut self) {
        lock(&self.probe).discovery_cancels += 1;
    }

    fn open(&mut self, _device: &DeviceInfo, _service_uuid: &str) -> io::Result<Box<dyn Transport>> {
        lock(&self.probe).opened += 1;
        Ok(Box::new(ScriptedTransport::new(Arc::clone(&self.probe))))
    }
}
