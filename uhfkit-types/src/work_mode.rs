//! Reader work modes

use std::fmt;

/// Reader work mode, carried as a 4-byte payload by the set/query
/// work-mode commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkMode {
    /// Reader answers commands only
    Response,

    /// Reader starts reporting on power-up
    PowerOn,

    /// Any payload not listed above
    Other([u8; 4]),
}

impl WorkMode {
    pub const RESPONSE_BYTES: [u8; 4] = [0x00, 0x00, 0x00, 0x00];
    pub const POWER_ON_BYTES: [u8; 4] = [0x03, 0x00, 0x00, 0x00];

    pub fn to_bytes(self) -> [u8; 4] {
        match self {
            Self::Response => Self::RESPONSE_BYTES,
            Self::PowerOn => Self::POWER_ON_BYTES,
            Self::Other(bytes) => bytes,
        }
    }
}

impl From<[u8; 4]> for WorkMode {
    fn from(bytes: [u8; 4]) -> Self {
        match bytes {
            Self::RESPONSE_BYTES => Self::Response,
            Self::POWER_ON_BYTES => Self::PowerOn,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for WorkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Response => f.write_str("response"),
            Self::PowerOn => f.write_str("power-on"),
            Self::Other(bytes) => write!(f, "unknown({:02X?})", bytes),
        }
    }
}
