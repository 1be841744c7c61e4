//! Structured failure kinds for the analysis pipeline.
//!
//! Every variant is recoverable. Instrument-scoped variants name the instrument
//! so the caller can mark just that instrument unavailable and keep going.

use crate::domain::InstrumentId;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("no overlapping data for the selected instruments and period")]
    EmptyAlignment,

    #[error("no data available for {instrument}: {reason}")]
    MissingInstrumentData {
        instrument: InstrumentId,
        reason: String,
    },

    #[error(
        "not enough data to estimate beta for {instrument}: {rows} return row(s), need at least 2"
    )]
    InsufficientData { instrument: InstrumentId, rows: usize },

    #[error("benchmark returns have zero variance; beta for {instrument} is undefined")]
    DegenerateRegression { instrument: InstrumentId },

    #[error("division by zero price in column {column} on {date}")]
    DivisionUndefined { column: InstrumentId, date: NaiveDate },

    #[error("instrument {instrument} is not present in the table")]
    UnknownInstrument { instrument: InstrumentId },
}

impl AnalysisError {
    /// The instrument this failure is scoped to, if any.
    pub fn instrument(&self) -> Option<&InstrumentId> {
        match self {
            AnalysisError::EmptyAlignment => None,
            AnalysisError::MissingInstrumentData { instrument, .. }
            | AnalysisError::InsufficientData { instrument, .. }
            | AnalysisError::DegenerateRegression { instrument }
            | AnalysisError::UnknownInstrument { instrument } => Some(instrument),
            AnalysisError::DivisionUndefined { column, .. } => Some(column),
        }
    }
}
