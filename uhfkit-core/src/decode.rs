//! Frame classification and payload decoding
//!
//! Candidates come from [`crate::extract`] and may be noise. Anything too
//! short or not starting with the marker is skipped without error.
//!
//! Checksums of received frames are logged but not enforced. Pathological
//! output is caught by [`crate::anomaly`] before decoding.

use byteorder::{BigEndian, ByteOrder};
use tracing::{debug, trace, warn};

use uhfkit_types::{InventoryReport, TagReading, TidReading, WorkMode};

use crate::{
    checksum,
    command::Command,
    constants::{acks, layout, MARKER, MIN_FRAME_LEN},
    error::{Error, Result},
    extract::{inventory_candidates, split_frames},
    frame::hex_dump,
};

/// Control acknowledgments recognized by exact match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusAck {
    InventoryStarted,
    InventoryStopped,
    TidReadAccepted,
}

impl StatusAck {
    const TABLE: [(Self, &'static [u8; 8]); 3] = [
        (Self::InventoryStarted, &acks::START_INVENTORY),
        (Self::InventoryStopped, &acks::STOP_INVENTORY),
        (Self::TidReadAccepted, &acks::READ_TID_ACCEPTED),
    ];

    /// Match a candidate against the acknowledgment table
    pub fn recognize(candidate: &[u8]) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(_, bytes)| candidate == &bytes[..])
            .map(|(ack, _)| *ack)
    }
}

/// One classified frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Status(StatusAck),
    Tag(TagReading),
    Tid(TidReading),
}

/// Check that a candidate is long enough and marker-aligned
pub fn is_viable(candidate: &[u8]) -> bool {
    candidate.len() >= MIN_FRAME_LEN && candidate[0] == MARKER
}

/// Decode an EPC reading from an inventory frame
///
/// The EPC length comes from the protocol-control word (upper five bits,
/// in 16-bit words). RSSI is reported in tenths of a dBm.
pub fn decode_tag(frame: &[u8]) -> Option<TagReading> {
    if !is_viable(frame) || frame[layout::COMMAND] != u8::from(Command::StartInventory) {
        return None;
    }

    if frame.len() < layout::ID_START {
        return None;
    }

    let pc = BigEndian::read_u16(&frame[layout::PC..layout::ID_START]);
    let epc_len = usize::from(pc >> 11) * 2;
    let epc_end = layout::ID_START + epc_len;

    if epc_len == 0 || frame.len() < epc_end + layout::TRAILER_LEN {
        trace!(len = frame.len(), epc_len, "Inventory frame too short for its EPC");
        return None;
    }

    let rssi_at = epc_end + 2;
    let rssi = BigEndian::read_i16(&frame[rssi_at..rssi_at + 2]) / 10;

    Some(TagReading::new(
        frame[layout::ANTENNA],
        hex::encode_upper(&frame[layout::ID_START..epc_end]),
        rssi,
    ))
}

/// Decode a TID reading from a read-TID frame
///
/// Returns `None` for short frames, other commands, and all-zero TIDs.
pub fn decode_tid(frame: &[u8]) -> Option<TidReading> {
    if frame.len() < layout::MIN_TID_FRAME_LEN
        || frame[0] != MARKER
        || frame[layout::COMMAND] != u8::from(Command::ReadTid)
    {
        return None;
    }

    let window = &frame[layout::ID_START..layout::ID_START + layout::TID_LEN];
    match TidReading::from_bytes(window) {
        Ok(tid) => Some(tid),
        Err(e) => {
            trace!("Discarding TID window {}: {}", hex_dump(window), e);
            None
        }
    }
}

/// Classify a single candidate frame
pub fn classify(candidate: &[u8]) -> Option<Decoded> {
    if !is_viable(candidate) {
        return None;
    }

    if let Some(ack) = StatusAck::recognize(candidate) {
        return Some(Decoded::Status(ack));
    }

    if !checksum::verify(candidate) {
        trace!("Checksum mismatch tolerated: {}", hex_dump(candidate));
    }

    match Command::try_from(candidate[layout::COMMAND]) {
        Ok(Command::StartInventory) => decode_tag(candidate).map(Decoded::Tag),
        Ok(Command::ReadTid) => decode_tid(candidate).map(Decoded::Tid),
        _ => None,
    }
}

/// Classify every frame in a raw response
///
/// # Examples
///
/// ```
/// use uhfkit_core::decode::{decode, Decoded, StatusAck};
///
/// let raw = [0xD9, 0x06, 0x01, 0x00, 0x2F, 0x00, 0x00, 0xF1];
/// assert_eq!(decode(&raw), vec![Decoded::Status(StatusAck::InventoryStopped)]);
/// ```
pub fn decode(raw: &[u8]) -> Vec<Decoded> {
    inventory_candidates(raw).filter_map(classify).collect()
}

/// Decode the TIDs in a response read while the reader is in TID mode
///
/// # Errors
///
/// Returns [`Error::ModeMismatch`] as soon as an inventory frame is seen;
/// the reader is reporting EPCs and must be switched back to TID mode.
pub fn decode_tids(raw: &[u8]) -> Result<Vec<TidReading>> {
    let mut tids = Vec::new();

    for frame in split_frames(raw) {
        if !is_viable(frame) {
            trace!("Skipping fragment: {}", hex_dump(frame));
            continue;
        }

        match Command::try_from(frame[layout::COMMAND]) {
            Ok(Command::ReadTid) => {
                if let Some(tid) = decode_tid(frame) {
                    debug!(%tid, "Decoded TID");
                    tids.push(tid);
                }
            }
            Ok(Command::StartInventory) => {
                warn!("Inventory frame while expecting TIDs: {}", hex_dump(frame));
                return Err(Error::ModeMismatch);
            }
            _ => {
                trace!(command = frame[layout::COMMAND], "Ignoring non-TID frame");
            }
        }
    }

    Ok(tids)
}

/// Decode inventory output into `report`, returning how many new readings
/// were recorded
pub fn decode_inventory(raw: &[u8], report: &mut InventoryReport) -> usize {
    let mut added = 0;

    for decoded in decode(raw) {
        match decoded {
            Decoded::Tag(tag) => {
                let desc = tag.to_string();
                if report.record(tag) {
                    debug!("Read {}", desc);
                    added += 1;
                } else {
                    trace!("Duplicate {}", desc);
                }
            }
            Decoded::Status(ack) => trace!(?ack, "Skipping status frame"),
            Decoded::Tid(tid) => trace!(%tid, "Ignoring TID during inventory"),
        }
    }

    added
}

/// Read the work mode from a query-work-mode response
///
/// Only a query-work-mode frame is trusted; noise and other frames in the
/// same read are skipped.
pub fn decode_work_mode(raw: &[u8]) -> Option<WorkMode> {
    let frame = split_frames(raw).find(|frame| {
        frame.len() >= layout::WORK_MODE.end
            && frame[layout::COMMAND] == u8::from(Command::QueryWorkMode)
    })?;

    let mut mode = [0u8; 4];
    mode.copy_from_slice(&frame[layout::WORK_MODE]);
    Some(WorkMode::from(mode))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::anomaly::STUCK_PATTERN;
    use crate::frame::Frame;
    use pretty_assertions::assert_eq;

    const TID: [u8; 12] = [
        0xE2, 0x80, 0x11, 0x60, 0x60, 0x00, 0x02, 0x04, 0x08, 0x14, 0xA1, 0x3F,
    ];

    /// FLAGS FREQ ANT PC(2) TID(12) CRC(2) RSSI(2)
    fn tid_payload(tid: &[u8; 12]) -> Vec<u8> {
        let mut payload = vec![0x01, 0x02, 0x03, 0x30, 0x00];
        payload.extend_from_slice(tid);
        payload.extend_from_slice(&[0x12, 0x34, 0xFD, 0xA8]);
        payload
    }

    /// FLAGS FREQ ANT PC(2) EPC(n) CRC(2) RSSI(2)
    fn tag_frame(antenna: u8, epc: &[u8], rssi_tenths: i16) -> Frame {
        let words = (epc.len() / 2) as u16;
        let pc = (words << 11).to_be_bytes();
        let mut payload = vec![0x01, 0x0D, antenna, pc[0], pc[1]];
        payload.extend_from_slice(epc);
        payload.extend_from_slice(&[0x12, 0x34]);
        payload.extend_from_slice(&rssi_tenths.to_be_bytes());
        Frame::build(Command::StartInventory, &payload).unwrap()
    }

    #[test]
    fn test_decode_tid_frame() {
        let frame = Frame::build(Command::ReadTid, &tid_payload(&TID)).unwrap();
        assert_eq!(frame.size(), 27);

        let tid = decode_tid(frame.as_bytes()).unwrap();
        assert_eq!(tid.as_str(), "E2801160600002040814A13F");
    }

    #[test]
    fn test_decode_tid_minimum_length() {
        // 26 bytes: drop the checksum, the window at offset 10 is intact
        let frame = Frame::build(Command::ReadTid, &tid_payload(&TID)).unwrap();
        let short = &frame.as_bytes()[..26];

        assert_eq!(decode_tid(short).unwrap(), TidReading::from_bytes(&TID).unwrap());
        assert_eq!(decode_tid(&frame.as_bytes()[..25]), None);
    }

    #[test]
    fn test_decode_tid_rejects_zero_window() {
        let frame = Frame::build(Command::ReadTid, &tid_payload(&[0u8; 12])).unwrap();
        assert_eq!(decode_tid(frame.as_bytes()), None);
    }

    #[test]
    fn test_decode_tid_rejects_other_command() {
        let frame = Frame::build(Command::QueryWorkMode, &tid_payload(&TID)).unwrap();
        assert_eq!(decode_tid(frame.as_bytes()), None);
    }

    #[test]
    fn test_decode_tids_captured_stream() {
        let tids = decode_tids(&STUCK_PATTERN).unwrap();
        assert_eq!(tids.len(), 1);
        assert_eq!(tids[0].as_str(), "E280F30220000000B9C7CA0A");
    }

    #[test]
    fn test_decode_tids_skips_acks_and_noise() {
        let frame = Frame::build(Command::ReadTid, &tid_payload(&TID)).unwrap();
        let raw = [
            &[0x00, 0x01][..],
            &acks::READ_TID_ACCEPTED[..],
            frame.as_bytes(),
            &[0xD9, 0x03],
        ]
        .concat();

        let tids = decode_tids(&raw).unwrap();
        assert_eq!(tids, vec![TidReading::from_bytes(&TID).unwrap()]);
    }

    #[test]
    fn test_decode_tids_mode_mismatch() {
        let tid = Frame::build(Command::ReadTid, &tid_payload(&TID)).unwrap();
        let epc = tag_frame(1, &[0xAA; 12], -600);
        let raw = [tid.as_bytes(), epc.as_bytes()].concat();

        let result = decode_tids(&raw);
        assert!(matches!(result, Err(Error::ModeMismatch)));
    }

    #[test]
    fn test_decode_tag_frame() {
        let frame = tag_frame(2, &[0xE2, 0x00, 0x00, 0x17, 0x22, 0x0B], -654);
        let tag = decode_tag(frame.as_bytes()).unwrap();

        assert_eq!(tag, TagReading::new(2, "E2000017220B", -65));
    }

    #[test]
    fn test_decode_tag_too_short_for_pc() {
        let frame = tag_frame(2, &[0xE2, 0x00, 0x00, 0x17, 0x22, 0x0B], -654);
        let truncated = &frame.as_bytes()[..frame.size() - 4];

        assert_eq!(decode_tag(truncated), None);
    }

    #[test]
    fn test_classify_status_frames() {
        assert_eq!(
            classify(&acks::START_INVENTORY),
            Some(Decoded::Status(StatusAck::InventoryStarted))
        );
        assert_eq!(
            classify(&acks::READ_TID_ACCEPTED),
            Some(Decoded::Status(StatusAck::TidReadAccepted))
        );
        assert_eq!(classify(&[0xD9, 0x06, 0x01]), None);
    }

    #[test]
    fn test_decode_mixed_response() {
        let tag = tag_frame(1, &[0x30, 0x08, 0x33, 0xB2], -500);
        let raw = [&acks::START_INVENTORY[..], tag.as_bytes(), &acks::STOP_INVENTORY[..]].concat();

        assert_eq!(
            decode(&raw),
            vec![
                Decoded::Status(StatusAck::InventoryStarted),
                Decoded::Tag(TagReading::new(1, "300833B2", -50)),
                Decoded::Status(StatusAck::InventoryStopped),
            ]
        );
    }

    #[test]
    fn test_decode_inventory_dedups_per_antenna() {
        let a1 = tag_frame(1, &[0x30, 0x08, 0x33, 0xB2], -500);
        let a1_again = tag_frame(1, &[0x30, 0x08, 0x33, 0xB2], -480);
        let a2 = tag_frame(2, &[0x30, 0x08, 0x33, 0xB2], -700);
        let raw = [
            &acks::START_INVENTORY[..],
            a1.as_bytes(),
            a1_again.as_bytes(),
            a2.as_bytes(),
        ]
        .concat();

        let mut report = InventoryReport::new();
        assert_eq!(decode_inventory(&raw, &mut report), 2);
        assert_eq!(report.antenna(1), &[TagReading::new(1, "300833B2", -50)]);
        assert_eq!(report.antenna(2).len(), 1);

        // Same tags in a later read of the same window add nothing
        assert_eq!(decode_inventory(&raw, &mut report), 0);
    }

    #[test]
    fn test_decode_work_mode() {
        let resp = Frame::build(Command::QueryWorkMode, &[0x03, 0x00, 0x00, 0x00]).unwrap();
        assert_eq!(decode_work_mode(resp.as_bytes()), Some(WorkMode::PowerOn));
        assert_eq!(decode_work_mode(&[0xD9, 0x04]), None);
    }

    #[test]
    fn test_decode_work_mode_skips_noise_and_other_frames() {
        let resp = Frame::build(Command::QueryWorkMode, &[0x00, 0x00, 0x00, 0x00]).unwrap();
        let raw = [&[0x13, 0x37][..], &acks::STOP_INVENTORY[..], resp.as_bytes()].concat();
        assert_eq!(decode_work_mode(&raw), Some(WorkMode::Response));

        // Long enough, but not a work-mode frame
        let tid = Frame::build(Command::ReadTid, &tid_payload(&TID)).unwrap();
        assert_eq!(decode_work_mode(tid.as_bytes()), None);

        let noisy = [0x01, 0x02, 0x03, 0x04, 0x05, 0xD9, 0x06, 0x01, 0x00, 0x2F];
        assert_eq!(decode_work_mode(&noisy), None);
    }
}
