//! Tag readings produced by the frame decoders

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A single EPC observation from an inventory frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagReading {
    /// Antenna port the tag was seen on
    pub antenna: u8,

    /// EPC identifier, uppercase hex
    pub epc: String,

    /// Signal strength in dBm
    pub rssi: i16,
}

impl TagReading {
    pub fn new(antenna: u8, epc: impl Into<String>, rssi: i16) -> Self {
        Self {
            antenna,
            epc: epc.into(),
            rssi,
        }
    }
}

impl fmt::Display for TagReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tag[ant={:02}, EPC={}, RSSI={} dBm]",
            self.antenna, self.epc, self.rssi
        )
    }
}

/// Chip-unique tag identifier.
///
/// Always exactly [`TidReading::LEN`] bytes, rendered as uppercase hex.
/// An all-zero block is never a valid reading.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TidReading(String);

impl TidReading {
    /// TID length in bytes
    pub const LEN: usize = 12;

    /// Build a reading from the raw TID window of a frame
    ///
    /// # Examples
    ///
    /// ```
    /// use uhfkit_types::TidReading;
    ///
    /// let tid = TidReading::from_bytes(&[0xE2, 0x80, 0x11, 0x60, 0x60, 0x00, 0x02, 0x04, 0x08, 0x14, 0xA1, 0x3F]).unwrap();
    /// assert_eq!(tid.as_str(), "E2801160600002040814A13F");
    /// ```
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::LEN {
            return Err(Error::InvalidTidLength {
                expected: Self::LEN,
                actual: bytes.len(),
            });
        }

        if bytes.iter().all(|&b| b == 0) {
            return Err(Error::ZeroTid);
        }

        Ok(Self(hex::encode_upper(bytes)))
    }

    /// Hex representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raw identifier bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        // The inner string is only ever produced by hex::encode_upper
        hex::decode(&self.0).unwrap_or_default()
    }
}

impl FromStr for TidReading {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = hex::decode(s.trim())?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Display for TidReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TidReading {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
