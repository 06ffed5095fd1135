use std::fmt::{Debug, Formatter};

use chrono::{DateTime, Local, TimeDelta};

/// Half-open time range.
#[derive(Copy, Clone, Eq, PartialEq)]
#[must_use]
pub struct Interval {
    /// Inclusive.
    pub start: DateTime<Local>,

    /// Exclusive.
    pub end: DateTime<Local>,
}

impl Debug for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}..{:?}", self.start, self.end)
    }
}

impl Interval {
    /// The interval of the given length that ends right before `end`.
    pub fn until(end: DateTime<Local>, duration: TimeDelta) -> Self {
        Self { start: end - duration, end }
    }

    #[must_use]
    pub fn contains(self, time: DateTime<Local>) -> bool {
        (self.start <= time) && (time < self.end)
    }
}
