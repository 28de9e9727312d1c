//! Protocol constants

/// Frame start marker
pub const MARKER: u8 = 0xD9;

/// RS-485 address field as it appears on the wire
pub const ADDRESS: [u8; 2] = [0x01, 0x00];

/// Shortest frame worth classifying: header, 2-byte status, checksum
pub const MIN_FRAME_LEN: usize = 8;

/// Default settle delay between write and read (milliseconds)
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 50;

/// Default per-read byte timeout (milliseconds)
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 500;

/// Default polling interval for the TID acquisition loop (milliseconds)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Read size used when nothing is buffered yet
pub const DEFAULT_READ_CHUNK: usize = 256;

/// Default serial baud rate
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Fixed acknowledgment frames
pub mod acks {
    /// Inventory started
    pub const START_INVENTORY: [u8; 8] = [0xD9, 0x06, 0x01, 0x00, 0x20, 0x00, 0x00, 0x00];

    /// Inventory stopped
    pub const STOP_INVENTORY: [u8; 8] = [0xD9, 0x06, 0x01, 0x00, 0x2F, 0x00, 0x00, 0xF1];

    /// Read-TID command accepted
    pub const READ_TID_ACCEPTED: [u8; 8] = [0xD9, 0x06, 0x01, 0x00, 0x2D, 0x00, 0x00, 0xF3];
}

/// Tag-data frame layout
///
/// ```text
/// D9 LEN ADDR(2) CMD FLAGS FREQ ANT PC(2) ID(n) CRC(2) RSSI(2) CK
/// ```
pub mod layout {
    /// Command byte
    pub const COMMAND: usize = 4;

    /// Antenna port
    pub const ANTENNA: usize = 7;

    /// Protocol-control word (big-endian)
    pub const PC: usize = 8;

    /// First identifier byte
    pub const ID_START: usize = 10;

    /// CRC(2) + RSSI(2) + checksum(1) after the identifier
    pub const TRAILER_LEN: usize = 5;

    /// TID length in bytes
    pub const TID_LEN: usize = 12;

    /// Shortest frame that can carry a TID
    pub const MIN_TID_FRAME_LEN: usize = 26;

    /// Work-mode bytes within a query-work-mode response
    pub const WORK_MODE: std::ops::Range<usize> = 5..9;
}

/// Stuck-device heuristics
pub mod anomaly {
    /// Responses shorter than this are never flagged
    pub const SHORT_RESPONSE_FLOOR: usize = 50;

    /// Responses longer than this are always flagged
    pub const MAX_RESPONSE_LEN: usize = 500;

    /// Occurrences of [`STUCK_PATTERN`] that flag a response
    pub const PATTERN_REPEAT_THRESHOLD: usize = 3;

    /// TID frame the reader replays over and over when the link is stuck
    pub const STUCK_PATTERN: [u8; 27] = [
        0xD9, 0x19, 0x01, 0x00, 0x2D, 0x01, 0x0D, 0x01, 0x30, 0x00, 0xE2, 0x80, 0xF3, 0x02,
        0x20, 0x00, 0x00, 0x00, 0xB9, 0xC7, 0xCA, 0x0A, 0xDF, 0x22, 0x00, 0x00, 0xD5,
    ];
}
