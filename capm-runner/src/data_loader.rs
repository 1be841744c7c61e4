//! Price loading for the runner.
//!
//! Fetches the benchmark first, then every instrument, through a single
//! [`DataProvider`]. The two failure modes are deliberately asymmetric:
//! - benchmark unavailable → the whole load fails
//! - instrument unavailable → recorded as a [`LoadFailure`], an empty series
//!   takes its place, and the pipeline later reports it as missing data
//!
//! Series produced by the synthetic provider are tagged so reports can say so.

use capm_core::data::{DataError, DataProvider, DataSource, DownloadProgress, FetchResult};
use capm_core::domain::DatasetHash;
use capm_core::{BenchmarkSeries, InstrumentId, PriceSeries};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::window::AnalysisWindow;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("benchmark {symbol} is unavailable: {source}")]
    BenchmarkUnavailable {
        symbol: String,
        #[source]
        source: DataError,
    },

    #[error("data provider '{provider}' is not available")]
    ProviderUnavailable { provider: String },
}

/// An instrument whose prices could not be retrieved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadFailure {
    pub instrument: InstrumentId,
    pub reason: String,
}

/// Loaded price series plus provenance.
#[derive(Debug, Clone)]
pub struct LoadedPrices {
    pub benchmark: BenchmarkSeries,
    /// One series per requested instrument, in request order. Failed fetches are empty.
    pub instruments: Vec<PriceSeries>,
    pub failures: Vec<LoadFailure>,
    /// Data source per successfully loaded symbol (benchmark included).
    pub sources: BTreeMap<InstrumentId, DataSource>,
    /// BLAKE3 over every loaded date and close, in symbol order.
    pub dataset_hash: DatasetHash,
    pub has_synthetic: bool,
}

/// Load the benchmark and every instrument over `window`.
pub fn load_prices(
    instruments: &[InstrumentId],
    benchmark: &InstrumentId,
    provider: &dyn DataProvider,
    progress: Option<&dyn DownloadProgress>,
    window: &AnalysisWindow,
) -> Result<LoadedPrices, LoadError> {
    if !provider.is_available() {
        return Err(LoadError::ProviderUnavailable {
            provider: provider.name().to_string(),
        });
    }

    let total = instruments.len() + 1;
    let mut sources = BTreeMap::new();

    let benchmark_series = match fetch_one(provider, benchmark, 0, total, progress, window) {
        Ok(result) => {
            sources.insert(benchmark.clone(), result.source);
            rename(result.series, benchmark)
        }
        Err(source) => {
            return Err(LoadError::BenchmarkUnavailable {
                symbol: benchmark.to_string(),
                source,
            })
        }
    };

    let mut series = Vec::with_capacity(instruments.len());
    let mut failures = Vec::new();
    for (i, id) in instruments.iter().enumerate() {
        match fetch_one(provider, id, i + 1, total, progress, window) {
            Ok(result) => {
                tracing::debug!(instrument = %id, rows = result.series.len(), "loaded prices");
                sources.insert(id.clone(), result.source);
                series.push(rename(result.series, id));
            }
            Err(e) => {
                tracing::warn!(instrument = %id, error = %e, "instrument data unavailable");
                failures.push(LoadFailure {
                    instrument: id.clone(),
                    reason: e.to_string(),
                });
                series.push(PriceSeries::new(id.clone(), Vec::new()));
            }
        }
    }

    if let Some(p) = progress {
        p.on_batch_complete(total - failures.len(), failures.len(), total);
    }

    let has_synthetic = sources.values().any(|s| *s == DataSource::Synthetic);
    if has_synthetic {
        tracing::warn!("results use synthetic prices and are not market data");
    }
    let dataset_hash = compute_dataset_hash(&benchmark_series, &series);

    Ok(LoadedPrices {
        benchmark: benchmark_series,
        instruments: series,
        failures,
        sources,
        dataset_hash,
        has_synthetic,
    })
}

/// Key the series by the requested symbol, whatever casing the provider echoed back.
fn rename(series: PriceSeries, id: &InstrumentId) -> PriceSeries {
    if series.instrument == *id {
        series
    } else {
        PriceSeries::new(id.clone(), series.points().to_vec())
    }
}

fn fetch_one(
    provider: &dyn DataProvider,
    id: &InstrumentId,
    index: usize,
    total: usize,
    progress: Option<&dyn DownloadProgress>,
    window: &AnalysisWindow,
) -> Result<FetchResult, DataError> {
    if let Some(p) = progress {
        p.on_start(id.as_str(), index, total);
    }
    let fetched = provider.fetch(id.as_str(), window.start, window.end);
    if let Some(p) = progress {
        let status = fetched.as_ref().map(|_| ()).map_err(Clone::clone);
        p.on_complete(id.as_str(), index, total, &status);
    }
    fetched
}

/// Deterministic BLAKE3 hash over all loaded prices.
///
/// Series are hashed in symbol order so request order does not change the hash.
fn compute_dataset_hash(benchmark: &BenchmarkSeries, instruments: &[PriceSeries]) -> DatasetHash {
    let mut all: Vec<&PriceSeries> = instruments.iter().chain(std::iter::once(benchmark)).collect();
    all.sort_by(|a, b| a.instrument.cmp(&b.instrument));

    let mut hasher = blake3::Hasher::new();
    for series in all {
        hasher.update(series.instrument.as_str().as_bytes());
        for point in series.points() {
            hasher.update(point.date.to_string().as_bytes());
            match point.close {
                Some(close) => hasher.update(&close.to_le_bytes()),
                None => hasher.update(b"-"),
            };
        }
    }
    DatasetHash::from_hash(&hasher.finalize().to_hex())
}
