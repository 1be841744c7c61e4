//! CSV import provider: one `{SYMBOL}.csv` file per symbol with `Date,Close` columns.
//!
//! This is the offline path. Files written by [`write_series_csv`] round-trip through
//! [`CsvProvider`], which is how the CLI `download` command seeds later offline runs.

use super::provider::{DataError, DataProvider, DataSource, FetchResult};
use crate::domain::{PricePoint, PriceSeries};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date", alias = "date")]
    date: NaiveDate,
    #[serde(rename = "Close", alias = "close")]
    close: Option<f64>,
}

/// Reads closing prices from a directory of per-symbol CSV files.
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `{dir}/{SYMBOL}.csv`
    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }

    fn read(&self, symbol: &str) -> Result<Vec<PricePoint>, DataError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        let mut reader = csv::Reader::from_path(&path).map_err(|e| DataError::CsvImport {
            symbol: symbol.to_string(),
            reason: e.to_string(),
        })?;

        reader
            .deserialize::<CsvRow>()
            .enumerate()
            .map(|(i, row)| {
                let row = row.map_err(|e| DataError::CsvImport {
                    symbol: symbol.to_string(),
                    reason: format!("row {}: {e}", i + 1),
                })?;
                Ok(PricePoint {
                    date: row.date,
                    close: row.close,
                })
            })
            .collect()
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let points: Vec<PricePoint> = self
            .read(symbol)?
            .into_iter()
            .filter(|p| p.date >= start && p.date < end)
            .collect();

        if points.is_empty() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
            });
        }

        tracing::debug!(symbol, points = points.len(), "loaded from csv");
        Ok(FetchResult {
            series: PriceSeries::new(symbol, points),
            source: DataSource::CsvImport,
        })
    }

    fn is_available(&self) -> bool {
        self.dir.is_dir()
    }
}

/// Write a series in the format [`CsvProvider`] reads. Missing closes become empty cells.
pub fn write_series_csv(path: &Path, series: &PriceSeries) -> Result<(), DataError> {
    let symbol = series.instrument.as_str();
    let err = |e: csv::Error| DataError::CsvImport {
        symbol: symbol.to_string(),
        reason: e.to_string(),
    };

    let mut writer = csv::Writer::from_path(path).map_err(err)?;
    for p in series.points() {
        writer
            .serialize(CsvRow {
                date: p.date,
                close: p.close,
            })
            .map_err(err)?;
    }
    writer.flush().map_err(|e| DataError::CsvImport {
        symbol: symbol.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn reads_window_with_exclusive_end() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("AAPL.csv"),
            "Date,Close\n2024-01-02,185.6\n2024-01-03,\n2024-01-04,181.9\n2024-01-05,181.2\n",
        )
        .unwrap();

        let provider = CsvProvider::new(dir.path());
        let fetched = provider.fetch("AAPL", d("2024-01-02"), d("2024-01-05")).unwrap();

        assert_eq!(fetched.source, DataSource::CsvImport);
        assert_eq!(fetched.series.len(), 3);
        assert_eq!(fetched.series.points()[1].close, None);
        assert_eq!(fetched.series.last_date(), Some(d("2024-01-04")));
    }

    #[test]
    fn missing_file_is_symbol_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let provider = CsvProvider::new(dir.path());
        assert!(matches!(
            provider.fetch("NOPE", d("2024-01-01"), d("2024-02-01")),
            Err(DataError::SymbolNotFound { .. })
        ));
    }

    #[test]
    fn out_of_window_is_no_data() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("A.csv"), "date,close\n2020-01-02,1.0\n").unwrap();
        let provider = CsvProvider::new(dir.path());
        assert!(matches!(
            provider.fetch("A", d("2024-01-01"), d("2024-02-01")),
            Err(DataError::NoData { .. })
        ));
    }

    #[test]
    fn malformed_row_reports_row_number() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("A.csv"), "Date,Close\n2024-01-02,abc\n").unwrap();
        let provider = CsvProvider::new(dir.path());
        let err = provider
            .fetch("A", d("2024-01-01"), d("2024-02-01"))
            .unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn written_series_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let series = PriceSeries::new(
            "^GSPC",
            vec![
                PricePoint::new(d("2024-01-02"), 4742.83),
                PricePoint::missing(d("2024-01-03")),
            ],
        );
        let provider = CsvProvider::new(dir.path());
        write_series_csv(&provider.path_for("^GSPC"), &series).unwrap();

        let back = provider.fetch("^GSPC", d("2024-01-01"), d("2024-02-01")).unwrap();
        assert_eq!(back.series, series);
    }
}
