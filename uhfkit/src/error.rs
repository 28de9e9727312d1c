//! High-level error types

use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Core protocol error: {0}")]
    Core(#[from] uhfkit_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] uhfkit_transport::Error),

    #[error("Type error: {0}")]
    Types(#[from] uhfkit_types::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Reader not connected")]
    NotConnected,
}

impl Error {
    /// Reader is reporting EPCs instead of TIDs; stop inventory and
    /// reissue read-TID before retrying
    pub fn requires_mode_reset(&self) -> bool {
        matches!(self, Self::Core(e) if e.requires_mode_reset())
    }

    /// Reader produced the stuck-link signature; reset it rather than retry
    pub fn requires_device_reset(&self) -> bool {
        matches!(self, Self::Core(e) if e.requires_device_reset())
    }

    /// Worth retrying after the matching recovery step (reconnect, mode
    /// reset or device reset)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotConnected)
            || self.requires_mode_reset()
            || self.requires_device_reset()
            || self.is_link_unavailable()
    }

    /// Serial link could not be opened or was lost
    pub fn is_link_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Transport(
                uhfkit_transport::Error::LinkUnavailable { .. } | uhfkit_transport::Error::Io(_)
            )
        )
    }
}
