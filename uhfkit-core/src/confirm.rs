//! Consecutive-match confirmation of TID readings
//!
//! A tag in the field is read many times a second, and stray reads of
//! neighbouring tags are common. A TID is only trusted after it has been
//! decoded `required` times in a row with no other TID in between.

use uhfkit_types::TidReading;

/// Result of feeding one decoded TID to a [`TidConfirmer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub tid: TidReading,

    /// Consecutive reads of `tid` so far, including this one
    pub count: u32,

    /// `count` reached the required number of matches
    pub confirmed: bool,
}

/// Confirmation state for one acquisition
#[derive(Debug, Clone)]
pub struct TidConfirmer {
    required: u32,
    candidate: Option<TidReading>,
    count: u32,
}

impl TidConfirmer {
    /// `required_count` below 1 is treated as 1
    pub fn new(required_count: u32) -> Self {
        Self {
            required: required_count.max(1),
            candidate: None,
            count: 0,
        }
    }

    /// Record a decoded TID
    ///
    /// # Examples
    ///
    /// ```
    /// use uhfkit_core::confirm::TidConfirmer;
    /// use uhfkit_types::TidReading;
    ///
    /// let tid: TidReading = "E2801160600002040814A13F".parse().unwrap();
    /// let mut confirmer = TidConfirmer::new(2);
    ///
    /// assert!(!confirmer.observe(tid.clone()).confirmed);
    /// assert!(confirmer.observe(tid).confirmed);
    /// ```
    pub fn observe(&mut self, tid: TidReading) -> Observation {
        if self.candidate.as_ref() == Some(&tid) {
            self.count += 1;
        } else {
            self.candidate = Some(tid.clone());
            self.count = 1;
        }

        Observation {
            tid,
            count: self.count,
            confirmed: self.count >= self.required,
        }
    }

    /// Current candidate and its consecutive count
    pub fn current(&self) -> Option<(&TidReading, u32)> {
        self.candidate.as_ref().map(|tid| (tid, self.count))
    }

    pub fn required(&self) -> u32 {
        self.required
    }
}
