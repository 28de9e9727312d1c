//! High-level reader interface

use std::time::Duration;

use bytes::Bytes;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, trace, warn};

use uhfkit_core::constants::DEFAULT_READ_CHUNK;
use uhfkit_core::decode::{self, Decoded, StatusAck};
use uhfkit_core::frame::hex_dump;
use uhfkit_core::{anomaly, Command, Frame, Session};
use uhfkit_transport::{SerialTransport, Transport};
use uhfkit_types::{InventoryReport, WorkMode};

use crate::config::ReaderConfig;
use crate::error::{Error, Result};

/// UHF RFID reader
///
/// Owns the serial link and runs one command/response cycle at a time.
///
/// # Examples
///
/// ```no_run
/// use uhfkit::Reader;
///
/// #[tokio::main]
/// async fn main() -> uhfkit::Result<()> {
///     let mut reader = Reader::new("/dev/ttyUSB0", 115_200);
///
///     reader.connect().await?;
///
///     let response = reader.read_firmware_version().await?;
///     println!("{} bytes", response.len());
///
///     reader.close().await?;
///     Ok(())
/// }
/// ```
pub struct Reader {
    transport: Box<dyn Transport>,
    session: Session,
    config: ReaderConfig,
}

impl Reader {
    /// Create a reader on a serial port with default timings
    pub fn new(port: impl Into<String>, baud_rate: u32) -> Self {
        let config = ReaderConfig {
            port: port.into(),
            baud_rate,
            ..ReaderConfig::default()
        };
        Self::from_config(config)
    }

    /// Create a serial reader from a loaded configuration
    pub fn from_config(config: ReaderConfig) -> Self {
        let transport = SerialTransport::new(config.port.clone(), config.baud_rate)
            .with_read_timeout(config.read_timeout());
        Self::with_transport(Box::new(transport), config)
    }

    /// Create a reader over any transport
    pub fn with_transport(transport: Box<dyn Transport>, config: ReaderConfig) -> Self {
        Self {
            transport,
            session: Session::new(),
            config,
        }
    }

    /// Set the delay between writing a command and reading its response
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.config.settle_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Set how long a response read may wait
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the idle poll interval used while listening for tags
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Check if connected
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Open the link
    ///
    /// Does nothing if the link is already open.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the port cannot be opened.
    pub async fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            debug!("Already connected to {}", self.transport.port_name());
            return Ok(());
        }

        let port = self.transport.port_name();
        info!("Connecting to {}...", port);

        self.transport.connect().await?;
        self.session.open(port);

        info!("Connected");
        Ok(())
    }

    /// Close the link
    ///
    /// Safe to call when already closed.
    pub async fn close(&mut self) -> Result<()> {
        if !self.transport.is_connected() {
            self.session.close();
            return Ok(());
        }

        info!("Closing {}...", self.transport.port_name());

        let result = self.transport.disconnect().await;
        self.session.close();
        result?;

        info!("Closed");
        Ok(())
    }

    /// Send a command and collect whatever the reader answers with
    ///
    /// Stale input is discarded before the write. After the settle delay,
    /// all buffered bytes are read in one go (or up to
    /// [`DEFAULT_READ_CHUNK`] if nothing has arrived yet). An empty
    /// response is not an error.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] if the link is closed
    /// - `InvalidPayloadSize` if the frame cannot be encoded
    /// - `CommunicationTimeout` if the response has the stuck-reader shape
    pub async fn send_command(&mut self, command: impl Into<u8>, payload: &[u8]) -> Result<Bytes> {
        self.ensure_connected()?;

        let frame = Frame::build(command, payload)?;
        let seq = self.session.next_sequence();
        let name = Command::try_from(frame.command())
            .map(Command::name)
            .unwrap_or("CMD_UNKNOWN");

        debug!(seq, "-> {} {}", name, frame);

        self.transport.clear_input()?;
        self.transport.send(frame.as_bytes()).await?;

        sleep(self.config.settle_delay()).await;

        let waiting = self.transport.bytes_available()?;
        let max = if waiting > 0 { waiting } else { DEFAULT_READ_CHUNK };
        let response = self
            .transport
            .receive(max, self.config.read_timeout())
            .await?
            .freeze();

        debug!(seq, "<- {} bytes", response.len());
        trace!(seq, "<- {}", hex_dump(&response));

        anomaly::screen(&response)?;

        Ok(response)
    }

    /// Classify every frame in a raw response
    pub fn decode(raw: &[u8]) -> Vec<Decoded> {
        decode::decode(raw)
    }

    pub async fn read_firmware_version(&mut self) -> Result<Bytes> {
        info!("Reading firmware version...");
        self.send_command(Command::ReadFirmware, &[]).await
    }

    pub async fn start_inventory(&mut self) -> Result<Bytes> {
        info!("Starting inventory...");
        self.send_command(Command::StartInventory, &[]).await
    }

    pub async fn stop_inventory(&mut self) -> Result<Bytes> {
        info!("Stopping inventory...");
        self.send_command(Command::StopInventory, &[]).await
    }

    /// Switch the reader to reporting TIDs
    pub async fn read_tid(&mut self) -> Result<Bytes> {
        info!("Requesting TID reads...");
        self.send_command(Command::ReadTid, &[]).await
    }

    pub async fn set_work_mode(&mut self, mode: WorkMode) -> Result<Bytes> {
        info!("Setting work mode to {}...", mode);
        self.send_command(Command::SetWorkMode, &mode.to_bytes()).await
    }

    /// Ask the reader for its work mode
    ///
    /// Returns `None` if the response is too short to carry one.
    pub async fn query_work_mode(&mut self) -> Result<Option<WorkMode>> {
        let response = self.send_command(Command::QueryWorkMode, &[]).await?;
        let mode = decode::decode_work_mode(&response);

        match mode {
            Some(mode) => info!("Work mode: {}", mode),
            None => warn!("Unreadable work-mode response: {}", hex_dump(&response)),
        }

        Ok(mode)
    }

    /// Reset the reader
    ///
    /// The reader reboots; expect a short silence afterwards.
    pub async fn reset_device(&mut self) -> Result<Bytes> {
        warn!("Resetting reader...");
        self.send_command(Command::Reset, &[]).await
    }

    /// Put the reader back into TID mode
    ///
    /// Stops any running inventory, waits for the reader to settle, then
    /// requests TID reads. Returns `true` if the reader acknowledged the
    /// request or answered with a TID straight away.
    pub async fn enter_tid_mode(&mut self) -> Result<bool> {
        info!("Switching reader to TID mode...");

        self.stop_inventory().await?;
        sleep(self.config.operation_delay()).await;

        let response = self.read_tid().await?;
        let accepted = Self::decode(&response).iter().any(|decoded| {
            matches!(
                decoded,
                Decoded::Status(StatusAck::TidReadAccepted) | Decoded::Tid(_)
            )
        });

        if accepted {
            info!("Reader is in TID mode");
        } else {
            warn!("Read-TID not acknowledged: {}", hex_dump(&response));
        }

        Ok(accepted)
    }

    /// Run an inventory for `window` and collect the tags seen
    ///
    /// Tags are grouped by antenna, each EPC once per antenna. Inventory is
    /// stopped before returning, also when listening fails.
    pub async fn read_inventory(&mut self, window: Duration) -> Result<InventoryReport> {
        let mut report = InventoryReport::new();

        let started = self.start_inventory().await?;
        decode::decode_inventory(&started, &mut report);

        let listened = self.listen_inventory(window, &mut report).await;
        let stopped = self.stop_inventory().await;

        listened?;
        decode::decode_inventory(&stopped?, &mut report);

        info!("{}", report);
        Ok(report)
    }

    /// Run an inventory for the configured window
    /// ([`ReaderConfig::inventory_window_ms`])
    pub async fn read_inventory_default(&mut self) -> Result<InventoryReport> {
        self.read_inventory(self.config.inventory_window()).await
    }

    async fn listen_inventory(&mut self, window: Duration, report: &mut InventoryReport) -> Result<()> {
        let deadline = deadline_after(window);

        loop {
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }

            let waiting = self.transport.bytes_available()?;
            if waiting == 0 {
                sleep(self.config.poll_interval().min(deadline - now)).await;
                continue;
            }

            let raw = self
                .transport
                .receive(waiting, self.config.read_timeout())
                .await?;
            anomaly::screen(&raw)?;
            decode::decode_inventory(&raw, report);
        }
    }

    pub(crate) fn ensure_connected(&self) -> Result<()> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }
        Ok(())
    }

    pub(crate) fn transport_mut(&mut self) -> &mut dyn Transport {
        self.transport.as_mut()
    }
}

/// `now + window`, saturating to a far-future instant for unbounded windows
pub(crate) fn deadline_after(window: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(window)
        .unwrap_or_else(|| now + FAR_FUTURE)
}

/// Roughly 30 years
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

impl Drop for Reader {
    fn drop(&mut self) {
        if self.is_connected() {
            warn!("Reader dropped while still connected");
        }
    }
}
