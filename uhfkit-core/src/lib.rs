//! # uhfkit-core
//!
//! Core protocol implementation for D9-framed UHF RFID readers.
//!
//! This crate provides the low-level protocol primitives, free of I/O:
//! - Frame structure and encoding
//! - Checksum calculation
//! - Command definitions
//! - Candidate frame extraction and decoding
//! - Stuck-reader detection
//! - TID confirmation state

pub mod anomaly;
pub mod checksum;
pub mod command;
pub mod confirm;
pub mod constants;
pub mod decode;
pub mod error;
pub mod extract;
pub mod frame;
pub mod session;

pub use command::Command;
pub use confirm::{Observation, TidConfirmer};
pub use decode::{Decoded, StatusAck};
pub use error::{Error, Result};
pub use frame::{Frame, FrameHeader};
pub use session::{Session, SessionState};

/// Build a frame for `command` carrying `payload`
///
/// Shorthand for [`Frame::build`].
pub fn build_frame(command: impl Into<u8>, payload: &[u8]) -> Result<Frame> {
    Frame::build(command, payload)
}
