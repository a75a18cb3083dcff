// Reporting date ranges
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Inclusive date window a dashboard is reported over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting end-before-start.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// Trailing window of `days` ending today (UTC).
    pub fn last_days(days: u32) -> Self {
        let end = Utc::now().date_naive();
        let start = end - Duration::days(i64::from(days.max(1)) - 1);
        Self { start, end }
    }

    /// Number of days covered, endpoints included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// The equal-length window immediately before this one, used for
    /// period-over-period comparisons.
    pub fn previous(&self) -> Self {
        let len = self.days();
        Self {
            start: self.start - Duration::days(len),
            end: self.start - Duration::days(1),
        }
    }
}
