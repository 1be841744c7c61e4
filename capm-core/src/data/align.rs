//! Multi-symbol time alignment.
//!
//! Given closing prices for several instruments and one benchmark, align them to a
//! common timeline by strict inner join: a date survives only if every input has a
//! usable price on it. Nothing is forward-filled.

use crate::analytics::AnalysisError;
use crate::domain::{AlignedTable, BenchmarkSeries, DatedTable, InstrumentId, PriceSeries};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

/// Inner-join instrument series with the benchmark on date.
///
/// Instrument columns keep the order they were passed in; a repeated instrument id
/// only contributes its first series. Zero surviving rows (including the case of no
/// instruments at all) is [`AnalysisError::EmptyAlignment`].
pub fn align(
    instruments: &[PriceSeries],
    benchmark: &BenchmarkSeries,
) -> Result<AlignedTable, AnalysisError> {
    let mut seen: HashSet<&InstrumentId> = HashSet::new();
    let mut lookups: Vec<(&InstrumentId, HashMap<NaiveDate, f64>)> = Vec::new();
    for series in instruments {
        if !seen.insert(&series.instrument) {
            tracing::warn!(instrument = %series.instrument, "duplicate instrument series ignored");
            continue;
        }
        lookups.push((&series.instrument, price_lookup(series)));
    }

    if lookups.is_empty() {
        return Err(AnalysisError::EmptyAlignment);
    }

    // The benchmark is already sorted ascending, so walking it yields the date axis in order.
    let mut dates = Vec::new();
    let mut bench_col = Vec::new();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); lookups.len()];

    for point in benchmark.points() {
        let Some(bench_price) = point.usable_close() else {
            continue;
        };
        let row: Option<Vec<f64>> = lookups
            .iter()
            .map(|(_, lookup)| lookup.get(&point.date).copied())
            .collect();
        if let Some(row) = row {
            dates.push(point.date);
            bench_col.push(bench_price);
            for (col, value) in columns.iter_mut().zip(row) {
                col.push(value);
            }
        }
    }

    if dates.is_empty() {
        return Err(AnalysisError::EmptyAlignment);
    }

    tracing::info!(
        rows = dates.len(),
        instruments = lookups.len(),
        benchmark = %benchmark.instrument,
        "aligned price table"
    );

    let ids = lookups.into_iter().map(|(id, _)| id.clone()).collect();
    Ok(DatedTable::from_parts(
        dates,
        ids,
        columns,
        benchmark.instrument.clone(),
        bench_col,
    ))
}

/// date → close for every usable point of a series.
fn price_lookup(series: &PriceSeries) -> HashMap<NaiveDate, f64> {
    series
        .points()
        .iter()
        .filter_map(|p| p.usable_close().map(|c| (p.date, c)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PricePoint;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn series(symbol: &str, rows: &[(&str, f64)]) -> PriceSeries {
        PriceSeries::from_closes(symbol, rows.iter().map(|(dt, c)| (d(dt), *c)))
    }

    #[test]
    fn align_drops_dates_missing_anywhere() {
        let spy = series(
            "^GSPC",
            &[("2024-01-02", 100.0), ("2024-01-03", 101.0), ("2024-01-04", 102.0)],
        );
        let qqq = series("QQQ", &[("2024-01-02", 200.0), ("2024-01-04", 202.0)]);
        let aapl = series(
            "AAPL",
            &[("2024-01-02", 50.0), ("2024-01-03", 51.0), ("2024-01-04", 52.0)],
        );

        let aligned = align(&[qqq, aapl], &spy).unwrap();

        assert_eq!(aligned.dates(), &[d("2024-01-02"), d("2024-01-04")]);
        assert_eq!(aligned.column("QQQ"), Some(&[200.0, 202.0][..]));
        assert_eq!(aligned.column("AAPL"), Some(&[50.0, 52.0][..]));
        assert_eq!(aligned.benchmark(), &[100.0, 102.0]);
    }

    #[test]
    fn missing_close_counts_as_missing_date() {
        let bench = series("^GSPC", &[("2024-01-02", 100.0), ("2024-01-03", 101.0)]);
        let a = PriceSeries::new(
            "A",
            vec![
                PricePoint::new(d("2024-01-02"), 10.0),
                PricePoint::missing(d("2024-01-03")),
            ],
        );
        let aligned = align(&[a], &bench).unwrap();
        assert_eq!(aligned.len(), 1);
    }

    #[test]
    fn no_overlap_is_empty_alignment() {
        let bench = series("^GSPC", &[("2021-01-01", 100.0)]);
        let a = series("A", &[("2020-01-01", 10.0)]);
        assert_eq!(align(&[a], &bench), Err(AnalysisError::EmptyAlignment));
    }

    #[test]
    fn empty_input_is_empty_alignment() {
        let bench = series("^GSPC", &[("2021-01-01", 100.0)]);
        let a = series("A", &[]);
        assert_eq!(align(&[a], &bench), Err(AnalysisError::EmptyAlignment));
        assert_eq!(align(&[], &bench), Err(AnalysisError::EmptyAlignment));
    }

    #[test]
    fn duplicate_instrument_keeps_first() {
        let bench = series("^GSPC", &[("2024-01-02", 100.0)]);
        let a1 = series("A", &[("2024-01-02", 1.0)]);
        let a2 = series("A", &[("2024-01-02", 2.0)]);
        let aligned = align(&[a1, a2], &bench).unwrap();
        assert_eq!(aligned.instruments().len(), 1);
        assert_eq!(aligned.column("A"), Some(&[1.0][..]));
    }
}
