//! Error types for uhfkit-core

/// Result type alias for uhfkit-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Payload does not fit the 1-byte length field
    #[error("Invalid payload size: {size} bytes (max: {max} bytes)")]
    InvalidPayloadSize {
        size: usize,
        max: usize,
    },

    /// Unknown command code
    #[error("Unknown command code: 0x{0:02X}")]
    UnknownCommand(u8),

    /// Reader is emitting inventory (EPC) frames while TID frames were expected
    #[error("Mode mismatch: reader is in EPC inventory mode, stop inventory and reissue read-TID")]
    ModeMismatch,

    /// Response matched the stuck-device signature
    #[error("Communication timeout: pathological {len}-byte response from reader")]
    CommunicationTimeout {
        len: usize,
    },
}

impl Error {
    /// Check if the reader must be switched back to TID mode before retrying
    pub fn requires_mode_reset(&self) -> bool {
        matches!(self, Self::ModeMismatch)
    }

    /// Check if the reader should be reset rather than simply retried
    pub fn requires_device_reset(&self) -> bool {
        matches!(self, Self::CommunicationTimeout { .. })
    }
}
