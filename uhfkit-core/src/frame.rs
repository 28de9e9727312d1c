//! Reader frame structure and encoding

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

use crate::{
    checksum,
    constants::{ADDRESS, MARKER},
    error::{Error, Result},
};

/// Outgoing reader frame
///
/// # Frame Structure
///
/// ```text
/// ┌────────┬────────┬──────────┬─────────┬───────────┬──────────┐
/// │ Marker │ Length │ Address  │ Command │  Payload  │ Checksum │
/// │  0xD9  │ 1 byte │ 01 00    │ 1 byte  │  N bytes  │  1 byte  │
/// └────────┴────────┴──────────┴─────────┴───────────┴──────────┘
/// ```
///
/// `Length` counts every byte after itself, checksum included, which is what
/// the reader puts on the wire (an 8-byte acknowledgment declares 6).
///
/// Because the checksum byte is counted, the largest payload is
/// [`Frame::MAX_PAYLOAD_SIZE`] = 251 bytes, not the 252 a length field
/// excluding the checksum would allow. A 252-byte payload is rejected with
/// [`Error::InvalidPayloadSize`].
///
/// # Examples
///
/// ```
/// use uhfkit_core::{Command, Frame};
///
/// let frame = Frame::build(Command::StopInventory, &[]).unwrap();
/// assert_eq!(frame.as_bytes(), &[0xD9, 0x04, 0x01, 0x00, 0x2F, 0xF3]);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Bytes,
}

impl Frame {
    /// Marker, length, address and command
    pub const HEADER_SIZE: usize = 5;

    /// Address, command and checksum; the bytes `Length` counts besides the payload
    const LENGTH_OVERHEAD: usize = 4;

    /// Largest payload the 1-byte length field can describe
    pub const MAX_PAYLOAD_SIZE: usize = u8::MAX as usize - Self::LENGTH_OVERHEAD;

    /// Build a frame for `command` carrying `payload`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPayloadSize`] if the payload exceeds
    /// [`Frame::MAX_PAYLOAD_SIZE`].
    pub fn build(command: impl Into<u8>, payload: &[u8]) -> Result<Self> {
        if payload.len() > Self::MAX_PAYLOAD_SIZE {
            return Err(Error::InvalidPayloadSize {
                size: payload.len(),
                max: Self::MAX_PAYLOAD_SIZE,
            });
        }

        let length = (payload.len() + Self::LENGTH_OVERHEAD) as u8;
        let mut buf = BytesMut::with_capacity(Self::HEADER_SIZE + payload.len() + 1);

        buf.put_u8(MARKER);
        buf.put_u8(length);
        buf.put_slice(&ADDRESS);
        buf.put_u8(command.into());
        buf.put_slice(payload);

        let ck = checksum::calculate(&buf);
        buf.put_u8(ck);

        Ok(Self { bytes: buf.freeze() })
    }

    /// Encoded frame, checksum included
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume into the encoded bytes
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    /// Command byte
    pub fn command(&self) -> u8 {
        self.bytes[4]
    }

    /// Payload between command and checksum
    pub fn payload(&self) -> &[u8] {
        &self.bytes[Self::HEADER_SIZE..self.bytes.len() - 1]
    }

    /// Trailing checksum byte
    pub fn checksum(&self) -> u8 {
        self.bytes[self.bytes.len() - 1]
    }

    /// Parsed header fields
    pub fn header(&self) -> FrameHeader {
        FrameHeader {
            marker: self.bytes[0],
            length: self.bytes[1],
            address: [self.bytes[2], self.bytes[3]],
            command: self.bytes[4],
        }
    }

    /// Get total frame size
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("command", &format!("0x{:02X}", self.command()))
            .field("length", &self.bytes[1])
            .field("checksum", &format!("0x{:02X}", self.checksum()))
            .field("payload_len", &self.payload().len())
            .finish()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex_dump(&self.bytes))
    }
}

/// Header fields read from the front of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub marker: u8,
    pub length: u8,
    pub address: [u8; 2],
    pub command: u8,
}

impl FrameHeader {
    /// Read the header from a received slice
    ///
    /// Returns `None` if the slice is shorter than a header or does not start
    /// with the marker. No checksum or length validation is done.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Frame::HEADER_SIZE || bytes[0] != MARKER {
            return None;
        }

        Some(Self {
            marker: bytes[0],
            length: bytes[1],
            address: [bytes[2], bytes[3]],
            command: bytes[4],
        })
    }

    /// Frame size implied by the length field
    pub fn declared_size(&self) -> usize {
        self.length as usize + 2
    }
}

/// Space-separated uppercase hex, as used in trace logs
pub fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::constants::acks;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_build_matches_device_acks() {
        // The reader's acknowledgments are ordinary frames with a 2-byte status
        let start = Frame::build(Command::StartInventory, &[0x00, 0x00]).unwrap();
        let stop = Frame::build(Command::StopInventory, &[0x00, 0x00]).unwrap();
        let tid = Frame::build(Command::ReadTid, &[0x00, 0x00]).unwrap();

        assert_eq!(start.as_bytes(), &acks::START_INVENTORY);
        assert_eq!(stop.as_bytes(), &acks::STOP_INVENTORY);
        assert_eq!(tid.as_bytes(), &acks::READ_TID_ACCEPTED);
    }

    #[test]
    fn test_build_empty_payload() {
        let frame = Frame::build(Command::ReadTid, &[]).unwrap();

        assert_eq!(frame.as_bytes(), &[0xD9, 0x04, 0x01, 0x00, 0x2D, 0xF5]);
        assert_eq!(frame.size(), 6);
        assert!(frame.payload().is_empty());
    }

    #[test]
    fn test_build_with_payload() {
        let frame = Frame::build(Command::SetWorkMode, &[0x03, 0x00, 0x00, 0x00]).unwrap();

        assert_eq!(frame.command(), 0x51);
        assert_eq!(frame.payload(), &[0x03, 0x00, 0x00, 0x00]);
        assert_eq!(frame.header().length, 8);
        assert!(checksum::verify(frame.as_bytes()));
    }

    #[test]
    fn test_build_raw_command_byte() {
        let frame = Frame::build(0x77u8, &[0x01]).unwrap();
        assert_eq!(frame.command(), 0x77);
    }

    #[test]
    fn test_build_max_payload() {
        let payload = vec![0xAB; Frame::MAX_PAYLOAD_SIZE];
        let frame = Frame::build(Command::ReadTid, &payload).unwrap();

        assert_eq!(frame.header().length, 0xFF);
        assert_eq!(frame.header().declared_size(), frame.size());
    }

    #[test]
    fn test_max_payload_leaves_room_for_checksum() {
        assert_eq!(Frame::MAX_PAYLOAD_SIZE, 251);

        let frame = Frame::build(Command::SetWorkMode, &[0x00; 251]).unwrap();
        assert_eq!(frame.size(), 257);
        assert_eq!(usize::from(frame.header().length), frame.size() - 2);
    }

    #[test]
    fn test_build_payload_too_large() {
        let payload = vec![0u8; Frame::MAX_PAYLOAD_SIZE + 1];
        let result = Frame::build(Command::ReadTid, &payload);

        assert!(matches!(
            result,
            Err(Error::InvalidPayloadSize { size: 252, max: 251 })
        ));
    }

    #[test]
    fn test_header_parse_rejects_noise() {
        assert_eq!(FrameHeader::parse(&[0xD9, 0x04, 0x01]), None);
        assert_eq!(FrameHeader::parse(&[0x00, 0x04, 0x01, 0x00, 0x2D, 0xF5]), None);
    }

    #[test]
    fn test_display_hex_dump() {
        let frame = Frame::build(Command::Reset, &[]).unwrap();
        assert_eq!(frame.to_string(), "D9 04 01 00 40 E2");
    }

    proptest! {
        #[test]
        fn prop_header_round_trip(
            command in any::<u8>(),
            payload in proptest::collection::vec(any::<u8>(), 0..=Frame::MAX_PAYLOAD_SIZE),
        ) {
            let frame = Frame::build(command, &payload).unwrap();
            let header = FrameHeader::parse(frame.as_bytes()).unwrap();

            prop_assert_eq!(header.marker, MARKER);
            prop_assert_eq!(header.command, command);
            prop_assert_eq!(header.address, ADDRESS);
            prop_assert_eq!(header.declared_size(), frame.size());
            prop_assert_eq!(frame.payload(), payload.as_slice());
            prop_assert!(checksum::verify(frame.as_bytes()));
        }
    }
}
