//! Stuck-reader detection
//!
//! When the serial link wedges, the reader does not go quiet. It replays the
//! same TID frame over and over or floods the buffer. Both shapes are
//! screened here before any decoding is attempted.
//!
//! Rules, in order:
//! 1. Responses under [`SHORT_RESPONSE_FLOOR`] bytes are never flagged
//! 2. [`STUCK_PATTERN`] occurring [`PATTERN_REPEAT_THRESHOLD`] or more times is flagged
//! 3. Responses over [`MAX_RESPONSE_LEN`] bytes are flagged
//!
//! An empty response is an ordinary quiet read, not an anomaly.

use tracing::warn;

use crate::constants::anomaly::{
    MAX_RESPONSE_LEN, PATTERN_REPEAT_THRESHOLD, SHORT_RESPONSE_FLOOR, STUCK_PATTERN,
};
use crate::error::{Error, Result};

/// Why a response was flagged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anomaly {
    /// The stuck frame repeated `count` times
    RepeatedPattern { count: usize },

    /// Response longer than the plausible maximum
    Oversized { len: usize },
}

/// Inspect a raw response for the stuck-reader signature
pub fn detect(data: &[u8]) -> Option<Anomaly> {
    if data.len() < SHORT_RESPONSE_FLOOR {
        return None;
    }

    let count = count_occurrences(data, &STUCK_PATTERN);
    if count >= PATTERN_REPEAT_THRESHOLD {
        warn!(count, len = data.len(), "Stuck-reader pattern repeated");
        return Some(Anomaly::RepeatedPattern { count });
    }

    if data.len() > MAX_RESPONSE_LEN {
        warn!(len = data.len(), "Oversized reader response");
        return Some(Anomaly::Oversized { len: data.len() });
    }

    None
}

/// Fail with [`Error::CommunicationTimeout`] if the response is anomalous
pub fn screen(data: &[u8]) -> Result<()> {
    match detect(data) {
        Some(_) => Err(Error::CommunicationTimeout { len: data.len() }),
        None => Ok(()),
    }
}

/// Count non-overlapping occurrences
fn count_occurrences(haystack: &[u8], needle: &[u8]) -> usize {
    let mut count = 0;
    let mut pos = 0;

    while pos + needle.len() <= haystack.len() {
        if &haystack[pos..pos + needle.len()] == needle {
            count += 1;
            pos += needle.len();
        } else {
            pos += 1;
        }
    }

    count
}
