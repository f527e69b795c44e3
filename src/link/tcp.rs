//! TCP transport
//!
//! 用于通过串口/RFCOMM 转 TCP 中继暴露出来的 bridge。

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, trace, warn};

use super::{Adapter, AdapterState, DeviceInfo, Transport};

const READ_CHUNK: usize = 256;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// "Bonded" devices are a fixed list of `host:port` endpoints.
#[derive(Debug, Clone)]
pub struct TcpAdapter {
    devices: Vec<DeviceInfo>,
    connect_timeout: Duration,
}

impl TcpAdapter {
    pub fn new(devices: Vec<DeviceInfo>) -> Self {
        Self {
            devices,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

impl Adapter for TcpAdapter {
    fn state(&self) -> AdapterState {
        AdapterState::Enabled
    }

    fn bonded_devices(&mut self) -> Vec<DeviceInfo> {
        self.devices.clone()
    }

    fn open(&mut self, device: &DeviceInfo, service_uuid: &str) -> io::Result<Box<dyn Transport>> {
        debug!(device = %device.name, address = %device.address, service_uuid, "opening tcp transport");
        Ok(Box::new(TcpTransport::new(
            device.address.clone(),
            self.connect_timeout,
        )))
    }
}

#[derive(Debug)]
pub struct TcpTransport {
    address: String,
    connect_timeout: Duration,
    stream: Option<TcpStream>,
    input: Option<TcpStream>,
}

impl TcpTransport {
    pub fn new(address: String, connect_timeout: Duration) -> Self {
        Self {
            address,
            connect_timeout,
            stream: None,
            input: None,
        }
    }

    fn not_connected() -> io::Error {
        io::Error::new(io::ErrorKind::NotConnected, "transport not connected")
    }
}

impl Transport for TcpTransport {
    fn connect(&mut self) -> io::Result<()> {
        let mut last_err = None;
        for addr in self.address.to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, self.connect_timeout) {
                Ok(stream) => {
                    debug!(%addr, "tcp connected");
                    self.stream = Some(stream);
                    return Ok(());
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("{} resolved to no addresses", self.address),
            )
        }))
    }

    fn open_streams(&mut self) -> io::Result<()> {
        let stream = self.stream.as_ref().ok_or_else(Self::not_connected)?;
        stream.set_nodelay(true)?;
        self.input = Some(stream.try_clone()?);
        Ok(())
    }

    fn read_available(&mut self) -> io::Result<Vec<u8>> {
        let input = self.input.as_mut().ok_or_else(Self::not_connected)?;
        // The clone shares the socket, so blocking mode is restored before returning.
        input.set_nonblocking(true)?;
        let mut out = Vec::new();
        let mut buf = [0u8; READ_CHUNK];
        let res = loop {
            match input.read(&mut buf) {
                Ok(0) => {
                    trace!("peer closed its side");
                    break Ok(());
                }
                Ok(n) => out.extend_from_slice(&buf[..n]),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break Ok(()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => break Err(e),
            }
        };
        input.set_nonblocking(false)?;
        res.map(|()| out)
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        let stream = self.stream.as_mut().ok_or_else(Self::not_connected)?;
        stream.write_all(bytes)?;
        stream.flush()
    }

    fn close(&mut self) -> io::Result<()> {
        self.input = None;
        let Some(stream) = self.stream.take() else {
            return Ok(());
        };
        match stream.shutdown(Shutdown::Both) {
            Err(e) if e.kind() != io::ErrorKind::NotConnected => {
                warn!(error = %e, "tcp shutdown failed");
                Err(e)
            }
            _ => Ok(()),
        }
    }
}
