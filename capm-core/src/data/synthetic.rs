//! Deterministic synthetic closes for demos, benches, and offline development.
//!
//! Every symbol shares one seeded market random walk; a non-benchmark symbol loads
//! on it with a symbol-specific beta plus idiosyncratic noise, so the estimator has
//! something real to recover. Results from this provider are tagged synthetic.

use super::provider::{DataError, DataProvider, DataSource, FetchResult};
use crate::domain::{InstrumentId, PricePoint, PriceSeries};
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const MARKET_SEED: &[u8] = b"capm-synthetic-market";

pub struct SyntheticProvider {
    benchmark: InstrumentId,
}

impl SyntheticProvider {
    pub fn new(benchmark: impl Into<InstrumentId>) -> Self {
        Self {
            benchmark: benchmark.into(),
        }
    }

    /// Loading on the market factor for `symbol`, in `[0.4, 1.8)`. Exactly 1 for the benchmark.
    pub fn loading(&self, symbol: &str) -> f64 {
        if symbol == self.benchmark.as_str() {
            return 1.0;
        }
        let mut rng = rng_for(symbol.as_bytes());
        rng.gen_range(0.4..1.8)
    }

    pub fn generate(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> PriceSeries {
        let is_benchmark = symbol == self.benchmark.as_str();
        let beta = self.loading(symbol);

        let mut market = rng_for(MARKET_SEED);
        let mut own = rng_for(symbol.as_bytes());
        // Skip the draw consumed by `loading` so noise is independent of it.
        let _: f64 = own.gen_range(0.4..1.8);

        let mut price = if is_benchmark { 4000.0 } else { own.gen_range(20.0..500.0) };
        let mut points = Vec::new();

        for date in start.iter_days().take_while(|d| *d < end) {
            if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                continue;
            }
            let market_return: f64 = market.gen_range(-0.02..0.021);
            let noise: f64 = if is_benchmark {
                0.0
            } else {
                own.gen_range(-0.01..0.01)
            };
            points.push(PricePoint::new(date, price));
            price *= 1.0 + beta * market_return + noise;
        }

        PriceSeries::new(symbol, points)
    }
}

fn rng_for(seed_material: &[u8]) -> StdRng {
    let seed: [u8; 32] = *blake3::hash(seed_material).as_bytes();
    StdRng::from_seed(seed)
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let series = self.generate(symbol, start, end);
        if series.is_empty() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
            });
        }
        Ok(FetchResult {
            series,
            source: DataSource::Synthetic,
        })
    }

    fn is_available(&self) -> bool {
        true
    }
}
