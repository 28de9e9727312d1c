//! Serial transport for UHF readers
//!
//! Readers attach over RS-232/RS-485 or a USB serial bridge, always 8N1.

use std::io::ErrorKind;
use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;
use tokio_serial::{ClearBuffer, SerialPort, SerialPortBuilderExt, SerialStream};
use tracing::{debug, trace, warn};

use crate::{error::*, Transport};

/// Serial transport
pub struct SerialTransport {
    port: String,
    baud_rate: u32,
    stream: Option<SerialStream>,
    read_timeout: Duration,
}

impl SerialTransport {
    /// Create new serial transport
    pub fn new(port: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port: port.into(),
            baud_rate,
            stream: None,
            read_timeout: Duration::from_millis(500),
        }
    }

    /// Set the per-read byte timeout of the underlying port
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Err(Error::AlreadyConnected);
        }

        debug!("Opening {} @ {} baud...", self.port, self.baud_rate);

        let stream = tokio_serial::new(&self.port, self.baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .timeout(self.read_timeout)
            .open_native_async()
            .map_err(|source| Error::LinkUnavailable {
                port: self.port.clone(),
                source,
            })?;

        debug!("Opened {}", self.port);

        self.stream = Some(stream);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            debug!("Closing {}...", self.port);

            // Port is released on drop
            let _ = stream.flush().await;
        }

        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        trace!("Sending {} bytes: {:02X?}", data.len(), data);

        stream.write_all(data).await?;
        stream.flush().await?;

        Ok(())
    }

    fn bytes_available(&self) -> Result<usize> {
        let stream = self.stream.as_ref().ok_or(Error::NotConnected)?;
        Ok(stream.bytes_to_read()? as usize)
    }

    fn clear_input(&mut self) -> Result<()> {
        let stream = self.stream.as_ref().ok_or(Error::NotConnected)?;
        stream.clear(ClearBuffer::Input)?;
        Ok(())
    }

    async fn receive(&mut self, max: usize, wait: Duration) -> Result<BytesMut> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        let mut buf = BytesMut::with_capacity(max);
        buf.resize(max, 0);

        let n = match timeout(wait, stream.read(&mut buf)).await {
            Ok(Ok(n)) => n,
            Ok(Err(e)) if e.kind() == ErrorKind::TimedOut => 0,
            Ok(Err(e)) => {
                warn!("Read error on {}: {}", self.port, e);
                return Err(Error::Io(e));
            }
            Err(_) => 0,
        };

        buf.truncate(n);

        if n > 0 {
            trace!("Received {} bytes: {:02X?}", n, &buf[..]);
        }

        Ok(buf)
    }

    fn port_name(&self) -> String {
        self.port.clone()
    }
}
