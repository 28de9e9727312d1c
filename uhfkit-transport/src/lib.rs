//! Transport layer for uhfkit
//!
//! Provides the byte-stream link to a reader. The protocol layers only need
//! a handful of operations: write a frame, ask how many bytes are buffered,
//! drop stale input, and read what is there within a bounded wait.

pub mod error;
pub mod serial;

pub use error::{Error, Result};
pub use serial::SerialTransport;

use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;

/// Transport trait for reader links
///
/// Implementations are not reentrant: one request/response cycle at a time.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open the link
    async fn connect(&mut self) -> Result<()>;

    /// Close the link
    async fn disconnect(&mut self) -> Result<()>;

    /// Check if connected
    fn is_connected(&self) -> bool;

    /// Send raw bytes
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Bytes received and not yet read
    fn bytes_available(&self) -> Result<usize>;

    /// Discard any buffered input
    fn clear_input(&mut self) -> Result<()>;

    /// Read up to `max` bytes, waiting at most `wait` for the first byte
    ///
    /// Returns an empty buffer if nothing arrives in time.
    async fn receive(&mut self, max: usize, wait: Duration) -> Result<BytesMut>;

    /// Get port identifier
    fn port_name(&self) -> String;
}
