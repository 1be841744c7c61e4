//! End-to-end CAPM analysis over already-loaded price series.
//!
//! Loader output → [`align`] → { [`normalize`] for display, [`daily_return`] →
//! [`estimate_all`] → CAPM projection }. Pure: no I/O, no clock, no globals.
//!
//! Failure policy: anything scoped to one instrument becomes a [`Diagnostic`] and that
//! instrument's expected return is `Unavailable`. A zero benchmark close drops that
//! date from the join. Only an empty alignment aborts the whole analysis.

use crate::analytics::{
    annualized_benchmark_return, daily_return, estimate_all, normalize, project, AnalysisError,
    BetaAlpha, CapmParams, ExpectedReturn,
};
use crate::data::align::align;
use crate::domain::{AlignedTable, BenchmarkSeries, InstrumentId, PriceSeries, ReturnTable};
use serde::Serialize;
use std::collections::BTreeMap;

/// Category of a reported, non-fatal problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    EmptyAlignment,
    MissingInstrumentData,
    InsufficientData,
    DegenerateRegression,
    DivisionUndefined,
    UnknownInstrument,
}

/// Human-readable record of something that went wrong for one instrument (or the run).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub instrument: Option<InstrumentId>,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl From<&AnalysisError> for Diagnostic {
    fn from(err: &AnalysisError) -> Self {
        let kind = match err {
            AnalysisError::EmptyAlignment => DiagnosticKind::EmptyAlignment,
            AnalysisError::MissingInstrumentData { .. } => DiagnosticKind::MissingInstrumentData,
            AnalysisError::InsufficientData { .. } => DiagnosticKind::InsufficientData,
            AnalysisError::DegenerateRegression { .. } => DiagnosticKind::DegenerateRegression,
            AnalysisError::DivisionUndefined { .. } => DiagnosticKind::DivisionUndefined,
            AnalysisError::UnknownInstrument { .. } => DiagnosticKind::UnknownInstrument,
        };
        Self {
            instrument: err.instrument().cloned(),
            kind,
            message: err.to_string(),
        }
    }
}

/// Expected return of one requested instrument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentProjection {
    pub instrument: InstrumentId,
    pub expected: ExpectedReturn,
}

/// Everything one analysis run produces.
#[derive(Debug, Clone, Serialize)]
pub struct CapmAnalysis {
    /// Date-joined raw prices of every instrument that had data.
    pub aligned: AlignedTable,
    /// Rebased view of the columns that survived return computation.
    pub normalized: AlignedTable,
    pub returns: ReturnTable,
    /// Successful estimates only.
    pub estimates: BTreeMap<InstrumentId, BetaAlpha>,
    pub annualized_benchmark_return: Option<f64>,
    /// One entry per requested instrument, in request order.
    pub projections: Vec<InstrumentProjection>,
    pub diagnostics: Vec<Diagnostic>,
    pub params: CapmParams,
}

impl CapmAnalysis {
    pub fn beta(&self, instrument: &str) -> Option<f64> {
        self.estimates.get(instrument).map(|e| e.beta)
    }

    pub fn expected_return(&self, instrument: &str) -> Option<&ExpectedReturn> {
        self.projections
            .iter()
            .find(|p| p.instrument.as_str() == instrument)
            .map(|p| &p.expected)
    }

    pub fn diagnostics_for(&self, instrument: &str) -> impl Iterator<Item = &Diagnostic> {
        let instrument = instrument.to_string();
        self.diagnostics
            .iter()
            .filter(move |d| d.instrument.as_ref().is_some_and(|i| i.0 == instrument))
    }
}

/// Run the full pipeline for `instruments` against `benchmark`.
///
/// An instrument whose series is empty (or has no usable price) is reported as
/// [`AnalysisError::MissingInstrumentData`] and left out of the join.
pub fn analyze(
    instruments: &[PriceSeries],
    benchmark: &BenchmarkSeries,
    params: &CapmParams,
) -> Result<CapmAnalysis, AnalysisError> {
    let mut diagnostics = Vec::new();

    let (present, absent): (Vec<&PriceSeries>, Vec<&PriceSeries>) =
        instruments.iter().partition(|s| !s.has_no_prices());
    for series in absent {
        report(
            &mut diagnostics,
            AnalysisError::MissingInstrumentData {
                instrument: series.instrument.clone(),
                reason: "source table is empty".into(),
            },
        );
    }

    let present: Vec<PriceSeries> = present.into_iter().cloned().collect();
    let aligned = drop_zero_benchmark_rows(align(&present, benchmark)?, &mut diagnostics)?;

    let (returns, usable) = drop_failing_columns(&aligned, daily_return, &mut diagnostics)?;
    let (normalized, _) = drop_failing_columns(&usable, normalize, &mut diagnostics)?;

    let mut estimates = BTreeMap::new();
    for (id, result) in estimate_all(&returns) {
        match result {
            Ok(est) => {
                estimates.insert(id, est);
            }
            Err(err) => report(&mut diagnostics, err),
        }
    }

    let rm = annualized_benchmark_return(&returns, params.trading_days_per_year);
    let projections = instruments
        .iter()
        .map(|s| {
            let id = &s.instrument;
            let estimate = rm.and(estimates.get(id));
            let expected = project(estimate, params.risk_free_rate, rm.unwrap_or_default(), || {
                unavailable_reason(&diagnostics, id)
            });
            InstrumentProjection {
                instrument: id.clone(),
                expected,
            }
        })
        .collect();

    tracing::info!(
        instruments = instruments.len(),
        estimated = estimates.len(),
        issues = diagnostics.len(),
        "CAPM analysis complete"
    );

    Ok(CapmAnalysis {
        aligned,
        normalized,
        returns,
        estimates,
        annualized_benchmark_return: rm,
        projections,
        diagnostics,
        params: *params,
    })
}

/// Apply `stage`, dropping any instrument column it rejects with a division by zero.
///
/// Returns the stage output and the table it was computed from. A failure in the
/// benchmark column, or any other error, propagates.
fn drop_failing_columns<T>(
    table: &AlignedTable,
    stage: impl Fn(&AlignedTable) -> Result<T, AnalysisError>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<(T, AlignedTable), AnalysisError> {
    let mut current = table.clone();
    loop {
        match stage(&current) {
            Ok(out) => return Ok((out, current)),
            Err(AnalysisError::DivisionUndefined { column, date })
                if column != *current.benchmark_id() && current.contains(column.as_str()) =>
            {
                current = current.without(column.as_str());
                report(
                    diagnostics,
                    AnalysisError::DivisionUndefined { column, date },
                );
            }
            Err(err) => return Err(err),
        }
    }
}

/// A zero benchmark close leaves that date's returns undefined for every instrument,
/// so the date is treated as missing from the join. Empty afterwards is fatal.
fn drop_zero_benchmark_rows(
    aligned: AlignedTable,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<AlignedTable, AnalysisError> {
    let zero_rows: Vec<usize> = (0..aligned.len())
        .filter(|&i| aligned.benchmark()[i] == 0.0)
        .collect();
    if zero_rows.is_empty() {
        return Ok(aligned);
    }
    for &i in &zero_rows {
        report(
            diagnostics,
            AnalysisError::DivisionUndefined {
                column: aligned.benchmark_id().clone(),
                date: aligned.dates()[i],
            },
        );
    }
    let kept = aligned.retain_rows(|i| aligned.benchmark()[i] != 0.0);
    if kept.is_empty() {
        return Err(AnalysisError::EmptyAlignment);
    }
    Ok(kept)
}

fn report(diagnostics: &mut Vec<Diagnostic>, err: AnalysisError) {
    tracing::warn!("{err}");
    diagnostics.push(Diagnostic::from(&err));
}

fn unavailable_reason(diagnostics: &[Diagnostic], id: &InstrumentId) -> String {
    diagnostics
        .iter()
        .find(|d| d.instrument.as_ref() == Some(id))
        .map(|d| d.message.clone())
        .unwrap_or_else(|| format!("no beta estimate for {id}"))
}
