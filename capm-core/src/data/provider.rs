//! Price provider seam and its error type.
//!
//! The DataProvider trait abstracts over closing-price sources (Yahoo Finance, CSV
//! import, synthetic) so the runner can swap implementations and tests can mock them.

use crate::domain::PriceSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a symbol could not be fetched.
///
/// These are designed to be displayable in CLI output and report diagnostics.
#[derive(Debug, Clone, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no data available for {symbol} over the selected period")]
    NoData { symbol: String },

    #[error("provider is refusing requests (circuit breaker open)")]
    CircuitBreakerTripped,

    #[error("csv import error for {symbol}: {reason}")]
    CsvImport { symbol: String, reason: String },

    #[error("data error: {0}")]
    Other(String),
}

/// Closes for one symbol plus where they came from.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub series: PriceSeries,
    pub source: DataSource,
}

/// Origin of a price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    YahooFinance,
    CsvImport,
    Synthetic,
}

/// Trait for closing-price providers.
///
/// `end` is exclusive: a provider returns trading days in `[start, end)`.
pub trait DataProvider: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Fetch daily closes for a symbol over a date range.
    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError>;

    /// `false` while the provider is blocked or its backing store is missing.
    fn is_available(&self) -> bool;
}

/// Observer for a batch of per-symbol fetches (the benchmark counts as one of them).
pub trait DownloadProgress: Send {
    /// A fetch for `symbol` is about to start. `index` is zero-based.
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    fn on_complete(&self, symbol: &str, index: usize, total: usize, result: &Result<(), DataError>);

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Prints one line per event to stdout.
pub struct StdoutProgress;

impl DownloadProgress for StdoutProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        println!("[{}/{}] {symbol}: fetching closes", index + 1, total);
    }

    fn on_complete(
        &self,
        symbol: &str,
        _index: usize,
        _total: usize,
        result: &Result<(), DataError>,
    ) {
        match result {
            Ok(()) => println!("      {symbol}: ok"),
            Err(e) => println!("      {symbol}: failed ({e})"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        println!("\nFetch complete: {succeeded}/{total} succeeded, {failed} failed");
    }
}

/// Progress reporter that discards every event.
pub struct SilentProgress;

impl DownloadProgress for SilentProgress {
    fn on_start(&self, _symbol: &str, _index: usize, _total: usize) {}

    fn on_complete(
        &self,
        _symbol: &str,
        _index: usize,
        _total: usize,
        _result: &Result<(), DataError>,
    ) {
    }

    fn on_batch_complete(&self, _succeeded: usize, _failed: usize, _total: usize) {}
}
