//! Candidate frame extraction from raw reader output
//!
//! The reader streams frames back-to-back with no delimiter other than the
//! marker byte, and a single read may start or end mid-frame. Extraction is
//! best effort: every marker starts a new candidate that runs up to the next
//! marker. Length and checksum are not checked here; short or garbled
//! candidates are dropped by the decoders.
//!
//! Each read is processed on its own. A frame split across two reads is lost.

use crate::constants::{acks, MARKER};

/// Iterator over marker-aligned candidate frames in one buffer
///
/// Candidates borrow from the buffer. Bytes before the first marker are
/// discarded as noise.
#[derive(Debug, Clone)]
pub struct FrameSplitter<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> FrameSplitter<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }
}

impl<'a> Iterator for FrameSplitter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let rest = self.buf.get(self.pos..)?;
            let start = self.pos + rest.iter().position(|&b| b == MARKER)?;

            let end = self.buf[start + 1..]
                .iter()
                .position(|&b| b == MARKER)
                .map_or(self.buf.len(), |i| start + 1 + i);

            self.pos = end;

            // A lone marker (two markers in a row) carries nothing
            if end - start > 1 {
                return Some(&self.buf[start..end]);
            }
        }
    }
}

/// Split a buffer into candidate frames
///
/// # Examples
///
/// ```
/// use uhfkit_core::extract::split_frames;
///
/// let raw = [0x00, 0xD9, 0x04, 0x01, 0x00, 0x2F, 0xF3, 0xD9, 0x04, 0x01, 0x00, 0x2D, 0xF5];
/// let frames: Vec<&[u8]> = split_frames(&raw).collect();
/// assert_eq!(frames.len(), 2);
/// ```
pub fn split_frames(buf: &[u8]) -> FrameSplitter<'_> {
    FrameSplitter::new(buf)
}

/// Split inventory output into candidate frames
///
/// Tag frames frequently follow the inventory-started acknowledgment within
/// the same read. Everything after each acknowledgment is split again on its
/// own, and the acknowledgment is yielded whole so the classifier sees it as
/// a status frame rather than tag data.
pub fn inventory_candidates(buf: &[u8]) -> InventoryCandidates<'_> {
    InventoryCandidates::new(buf)
}

/// Iterator returned by [`inventory_candidates`]
///
/// Walks the buffer one acknowledgment-delimited segment at a time, so each
/// byte is scanned once however many acknowledgments the read contains.
#[derive(Debug, Clone)]
pub struct InventoryCandidates<'a> {
    buf: &'a [u8],
    segment: FrameSplitter<'a>,
    ack: Option<&'a [u8]>,
    /// Start of the next segment, `None` once the last one is loaded
    next: Option<usize>,
}

impl<'a> InventoryCandidates<'a> {
    fn new(buf: &'a [u8]) -> Self {
        let mut candidates = Self {
            buf,
            segment: split_frames(&[]),
            ack: None,
            next: Some(0),
        };
        candidates.load_segment();
        candidates
    }

    /// Load the segment starting at `self.next` and the acknowledgment ending it
    fn load_segment(&mut self) {
        let Some(from) = self.next else {
            return;
        };
        let rest = &self.buf[from..];

        match find(rest, &acks::START_INVENTORY) {
            Some(at) => {
                let end = at + acks::START_INVENTORY.len();
                self.segment = split_frames(&rest[..at]);
                self.ack = Some(&rest[at..end]);
                self.next = Some(from + end);
            }
            None => {
                self.segment = split_frames(rest);
                self.ack = None;
                self.next = None;
            }
        }
    }
}

impl<'a> Iterator for InventoryCandidates<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(frame) = self.segment.next() {
                return Some(frame);
            }
            if let Some(ack) = self.ack.take() {
                return Some(ack);
            }
            self.next?;
            self.load_segment();
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
