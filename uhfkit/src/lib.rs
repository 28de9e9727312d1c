//! # uhfkit
//!
//! Async driver for D9-framed UHF RFID readers on a serial link.
//!
//! ## Features
//!
//! - Frame encoding and tolerant decoding of the reader's byte stream
//! - Inventory reads grouped by antenna
//! - Stable TID acquisition with consecutive-match confirmation
//! - Stuck-reader detection
//! - TOML configuration
//!
//! ## Quick Start
//!
//! ```no_run
//! use uhfkit::{AcquireOptions, Acquisition, Reader, ReaderConfig};
//!
//! #[tokio::main]
//! async fn main() -> uhfkit::Result<()> {
//!     let config = ReaderConfig::for_port("/dev/ttyUSB0");
//!     let mut reader = Reader::from_config(config.clone());
//!     reader.connect().await?;
//!
//!     reader.enter_tid_mode().await?;
//!
//!     match reader.acquire_stable_tid(AcquireOptions::from(&config)).await? {
//!         Acquisition::Confirmed(tid) => println!("TID {}", tid),
//!         other => println!("No TID: {:?}", other),
//!     }
//!
//!     reader.close().await?;
//!     Ok(())
//! }
//! ```

pub mod acquire;
pub mod config;
pub mod error;
pub mod reader;

#[cfg(test)]
mod mock;

// Re-exports
pub use acquire::{AcquireOptions, Acquisition, TidProgress};
pub use config::{ConfigError, ReaderConfig};
pub use error::{Error, Result};
pub use reader::Reader;

// Re-export protocol and transport types
pub use tokio_util::sync::CancellationToken;
pub use uhfkit_core::{Command, Decoded, Frame, StatusAck};
pub use uhfkit_transport::{SerialTransport, Transport};
pub use uhfkit_types::{InventoryReport, TagReading, TidReading, WorkMode};
