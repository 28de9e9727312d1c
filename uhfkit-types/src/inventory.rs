//! Readings collected during one inventory window

use std::collections::BTreeMap;
use std::fmt;

use crate::reading::TagReading;

/// Tag readings grouped by antenna.
///
/// Within one report an EPC is recorded at most once per antenna; the first
/// observation wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryReport {
    by_antenna: BTreeMap<u8, Vec<TagReading>>,
}

impl InventoryReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reading, returning `false` if the EPC was already seen on
    /// that antenna
    pub fn record(&mut self, reading: TagReading) -> bool {
        let tags = self.by_antenna.entry(reading.antenna).or_default();

        if tags.iter().any(|t| t.epc == reading.epc) {
            return false;
        }

        tags.push(reading);
        true
    }

    /// Readings for a single antenna
    pub fn antenna(&self, antenna: u8) -> &[TagReading] {
        self.by_antenna
            .get(&antenna)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Antennas that produced at least one reading, ascending
    pub fn antennas(&self) -> impl Iterator<Item = u8> + '_ {
        self.by_antenna.keys().copied()
    }

    /// Total number of distinct (antenna, EPC) pairs
    pub fn len(&self) -> usize {
        self.by_antenna.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for InventoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Inventory[{} tags on {} antennas]",
            self.len(),
            self.by_antenna.len()
        )
    }
}
