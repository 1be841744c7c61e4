//! Historical window derivation.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Date range `[start, end)` the analysis covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisWindow {
    pub start: NaiveDate,
    /// Exclusive. Usually "today", which has no close yet.
    pub end: NaiveDate,
}

impl AnalysisWindow {
    /// Window ending at `today` and starting on the same calendar day `years` earlier.
    ///
    /// Feb 29 maps to Feb 28 when the start year is not a leap year.
    pub fn ending(today: NaiveDate, years: u32) -> Self {
        let year = today.year() - i32::try_from(years).unwrap_or(i32::MAX / 2);
        let start = NaiveDate::from_ymd_opt(year, today.month(), today.day())
            .or_else(|| NaiveDate::from_ymd_opt(year, today.month(), 28))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end: today }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }
}
