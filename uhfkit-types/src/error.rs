pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid hex identifier: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("Invalid TID length: expected {expected} bytes, got {actual}")]
    InvalidTidLength {
        expected: usize,
        actual: usize,
    },

    #[error("All-zero TID is not a valid reading")]
    ZeroTid,
}
