//! Per-link bookkeeping for a reader
//!
//! A session is opened each time the link comes up and tracks:
//! - Port the link was opened on
//! - Command sequence counter, used to correlate log lines
//!
//! Whether the link is actually up is the transport's call; the session only
//! records what was opened.

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No link
    Disconnected,

    /// Link open, commands may be sent
    Connected,
}

/// Session bookkeeping, owned by the reader
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Port name, `None` when disconnected
    port: Option<String>,

    /// Commands sent since the link was opened
    sequence: u32,
}

impl Session {
    /// Create a new disconnected session
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current state
    pub fn state(&self) -> SessionState {
        match self.port {
            Some(_) => SessionState::Connected,
            None => SessionState::Disconnected,
        }
    }

    /// Port of the open link
    pub fn port(&self) -> Option<&str> {
        self.port.as_deref()
    }

    /// Start a fresh session on `port`
    ///
    /// Reopening replaces any previous session, so a link that dropped
    /// underneath can simply be reconnected.
    pub fn open(&mut self, port: impl Into<String>) {
        self.port = Some(port.into());
        self.sequence = 0;
    }

    /// Close session
    ///
    /// Safe to call when already disconnected.
    pub fn close(&mut self) {
        self.port = None;
        self.sequence = 0;
    }

    /// Get the next command sequence number, starting at 1
    pub fn next_sequence(&mut self) -> u32 {
        self.sequence = self.sequence.wrapping_add(1);
        self.sequence
    }
}
