//! Stable TID acquisition
//!
//! With the reader in TID mode, frames stream in unprompted. The loop drains
//! them, decodes TIDs and reports a TID once it has been read the required
//! number of times in a row. Acquisition ends on confirmation, when the time
//! budget runs out, or when the caller cancels.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use uhfkit_core::decode::decode_tids;
use uhfkit_core::frame::hex_dump;
use uhfkit_core::TidConfirmer;
use uhfkit_types::TidReading;

use crate::config::ReaderConfig;
use crate::error::Result;
use crate::reader::{deadline_after, Reader};

/// Progress event, sent for every decoded TID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TidProgress {
    pub tid: TidReading,

    /// Consecutive reads of `tid`, including this one
    pub count: u32,

    pub required: u32,
}

/// How an acquisition ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acquisition {
    /// The same TID was read the required number of times in a row
    Confirmed(TidReading),

    /// Time budget ran out first
    Expired,

    /// Cancelled by the caller
    Cancelled,
}

impl Acquisition {
    pub fn tid(&self) -> Option<&TidReading> {
        match self {
            Self::Confirmed(tid) => Some(tid),
            _ => None,
        }
    }
}

/// Acquisition parameters
#[derive(Debug, Clone)]
pub struct AcquireOptions {
    pub required_count: u32,
    pub max_duration: Duration,
    progress: Option<UnboundedSender<TidProgress>>,
    cancel: CancellationToken,
}

impl AcquireOptions {
    pub fn new(required_count: u32, max_duration: Duration) -> Self {
        Self {
            required_count,
            max_duration,
            progress: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Report every decoded TID on `tx`
    ///
    /// A closed receiver does not stop the acquisition.
    pub fn with_progress(mut self, tx: UnboundedSender<TidProgress>) -> Self {
        self.progress = Some(tx);
        self
    }

    /// Stop early when `token` is cancelled
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }
}

impl From<&ReaderConfig> for AcquireOptions {
    fn from(config: &ReaderConfig) -> Self {
        Self::new(config.tid_required_count, config.tid_max_duration())
    }
}

impl Reader {
    /// Read TIDs until one is confirmed, time runs out, or the caller cancels
    ///
    /// The reader must already be in TID mode (see
    /// [`Reader::enter_tid_mode`]). Input buffered before the call is
    /// discarded.
    ///
    /// # Errors
    ///
    /// - `NotConnected` if the link is closed
    /// - `ModeMismatch` if the reader is reporting EPCs; call
    ///   [`Reader::enter_tid_mode`] and retry
    pub async fn acquire_stable_tid(&mut self, options: AcquireOptions) -> Result<Acquisition> {
        self.ensure_connected()?;

        let mut confirmer = TidConfirmer::new(options.required_count);
        let poll_interval = self.config().poll_interval();
        let read_timeout = self.config().read_timeout();
        let deadline = deadline_after(options.max_duration);

        info!(
            required = confirmer.required(),
            budget_ms = options.max_duration.as_millis() as u64,
            "Acquiring TID..."
        );

        let transport = self.transport_mut();
        transport.clear_input()?;

        loop {
            if options.cancel.is_cancelled() {
                info!("TID acquisition cancelled");
                return Ok(Acquisition::Cancelled);
            }

            let now = Instant::now();
            if now >= deadline {
                match confirmer.current() {
                    Some((tid, count)) => info!(%tid, count, "TID acquisition expired"),
                    None => info!("TID acquisition expired, no TID read"),
                }
                return Ok(Acquisition::Expired);
            }

            let waiting = transport.bytes_available()?;
            if waiting == 0 {
                tokio::select! {
                    _ = options.cancel.cancelled() => {}
                    _ = sleep(poll_interval.min(deadline - now)) => {}
                }
                continue;
            }

            let raw = transport.receive(waiting, read_timeout).await?;
            trace!("Drained {}", hex_dump(&raw));

            let tids = decode_tids(&raw).inspect_err(|_| {
                warn!("Reader is in inventory mode, TID acquisition aborted");
            })?;

            for tid in tids {
                let observation = confirmer.observe(tid);
                debug!(
                    tid = %observation.tid,
                    count = observation.count,
                    required = confirmer.required(),
                    "TID read"
                );

                if let Some(tx) = &options.progress {
                    let _ = tx.send(TidProgress {
                        tid: observation.tid.clone(),
                        count: observation.count,
                        required: confirmer.required(),
                    });
                }

                if observation.confirmed {
                    info!(tid = %observation.tid, "TID confirmed");
                    return Ok(Acquisition::Confirmed(observation.tid));
                }
            }
        }
    }
}
