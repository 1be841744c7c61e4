//! Raw closing-price series as supplied by a data provider.

use super::ids::InstrumentId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day's close. `None` means the provider had no price that day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: Option<f64>,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            close: Some(close),
        }
    }

    pub fn missing(date: NaiveDate) -> Self {
        Self { date, close: None }
    }

    /// The close if it is a usable price (finite and non-negative).
    pub fn usable_close(&self) -> Option<f64> {
        self.close.filter(|p| p.is_finite() && *p >= 0.0)
    }
}

/// Closing prices for a single instrument, ascending by date, each date at most once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub instrument: InstrumentId,
    points: Vec<PricePoint>,
}

/// The reference index is shaped exactly like any other single-column series.
pub type BenchmarkSeries = PriceSeries;

impl PriceSeries {
    /// Build a series, sorting by date and keeping the first point for a repeated date.
    pub fn new(instrument: impl Into<InstrumentId>, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        points.dedup_by_key(|p| p.date);
        Self {
            instrument: instrument.into(),
            points,
        }
    }

    /// Convenience constructor from `(date, close)` pairs.
    pub fn from_closes(
        instrument: impl Into<InstrumentId>,
        closes: impl IntoIterator<Item = (NaiveDate, f64)>,
    ) -> Self {
        let points = closes
            .into_iter()
            .map(|(date, close)| PricePoint::new(date, close))
            .collect();
        Self::new(instrument, points)
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True when no point carries a usable price.
    pub fn has_no_prices(&self) -> bool {
        self.points.iter().all(|p| p.usable_close().is_none())
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}
