//! Display-ready views of a finished analysis.
//!
//! The analysis itself keeps full precision; rounding happens here, at the edge.

use capm_core::data::DataSource;
use capm_core::domain::DatasetHash;
use capm_core::{AlignedTable, CapmAnalysis, DiagnosticKind, InstrumentId};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::{AnalysisConfig, RunId};
use crate::data_loader::LoadFailure;
use crate::window::AnalysisWindow;

/// Rows shown in the head and tail previews.
pub const PREVIEW_ROWS: usize = 5;

/// Placeholder shown for an instrument without an expected return.
pub const NOT_AVAILABLE: &str = "N/A";

/// Round to two decimal places for display. Never returns negative zero.
pub fn round2(x: f64) -> f64 {
    let r = (x * 100.0).round() / 100.0;
    if r == 0.0 {
        0.0
    } else {
        r
    }
}

fn short(hash: &str) -> &str {
    hash.get(..16).unwrap_or(hash)
}

/// One row of the beta table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BetaRow {
    pub stock: InstrumentId,
    pub beta_value: f64,
}

/// One row of the expected return table. `expected_return` is a 2-decimal value or `N/A`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpectedReturnRow {
    pub stock: InstrumentId,
    pub expected_return: String,
}

/// Complete, serializable result of a run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub schema_version: u32,
    pub run_id: RunId,
    /// Config with `today` resolved.
    pub config: AnalysisConfig,
    pub window: AnalysisWindow,
    pub dataset_hash: DatasetHash,
    pub has_synthetic: bool,
    pub sources: BTreeMap<InstrumentId, DataSource>,
    pub load_failures: Vec<LoadFailure>,
    pub analysis: CapmAnalysis,
}

impl AnalysisReport {
    /// Directory name for this run's artifacts: config hash plus dataset hash, so the
    /// same config over different data (another source, another day) never collides.
    pub fn artifact_key(&self) -> String {
        format!("{}-{}", short(&self.run_id), short(&self.dataset_hash.0))
    }

    pub fn head(&self) -> AlignedTable {
        self.analysis.aligned.head(PREVIEW_ROWS)
    }

    pub fn tail(&self) -> AlignedTable {
        self.analysis.aligned.tail(PREVIEW_ROWS)
    }

    /// Betas of the instruments that have one, in request order.
    pub fn beta_table(&self) -> Vec<BetaRow> {
        self.analysis
            .projections
            .iter()
            .filter_map(|p| {
                self.analysis.beta(p.instrument.as_str()).map(|beta| BetaRow {
                    stock: p.instrument.clone(),
                    beta_value: round2(beta),
                })
            })
            .collect()
    }

    /// Every requested instrument, in request order.
    pub fn expected_return_table(&self) -> Vec<ExpectedReturnRow> {
        self.analysis
            .projections
            .iter()
            .map(|p| ExpectedReturnRow {
                stock: p.instrument.clone(),
                expected_return: match p.expected.value() {
                    Some(v) => format!("{:.2}", round2(v)),
                    None => NOT_AVAILABLE.to_string(),
                },
            })
            .collect()
    }

    /// Human-readable warnings: retrieval failures first, then analysis diagnostics.
    ///
    /// An instrument that failed to load is also reported by the analysis as missing
    /// data; that second message is folded into the first.
    pub fn warnings(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .load_failures
            .iter()
            .map(|f| format!("no data available for {}: {}", f.instrument, f.reason))
            .collect();
        for d in &self.analysis.diagnostics {
            let already_reported = d.kind == DiagnosticKind::MissingInstrumentData
                && d
                    .instrument
                    .as_ref()
                    .is_some_and(|id| self.load_failures.iter().any(|f| f.instrument == *id));
            if !already_reported {
                out.push(d.message.clone());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_behaves() {
        assert_eq!(round2(1.23456), 1.23);
        assert_eq!(round2(-0.005_000_1), -0.01);
        assert_eq!(round2(25.2), 25.2);
    }

    #[test]
    fn small_negatives_do_not_print_minus_zero() {
        assert_eq!(format!("{:.2}", round2(-0.001)), "0.00");
        assert_eq!(format!("{:.2}", round2(-0.0)), "0.00");
        assert!(round2(-0.004).is_sign_positive());
        assert_eq!(format!("{:.2}", round2(-0.006)), "-0.01");
    }
}
