//! Rebase every price column to 1.0 on the first aligned date.
//!
//! Display-only: the regression path works on raw returns, not on this view.

use super::AnalysisError;
use crate::domain::{AlignedTable, DatedTable, InstrumentId};

/// Divide each column by its first value so all columns start at exactly 1.0.
pub fn normalize(table: &AlignedTable) -> Result<AlignedTable, AnalysisError> {
    let Some(&first_date) = table.dates().first() else {
        return Err(AnalysisError::EmptyAlignment);
    };

    let rebase = |id: &InstrumentId, col: &[f64]| -> Result<Vec<f64>, AnalysisError> {
        let base = col[0];
        if base == 0.0 {
            return Err(AnalysisError::DivisionUndefined {
                column: id.clone(),
                date: first_date,
            });
        }
        Ok(col.iter().map(|p| p / base).collect())
    };

    let columns = table
        .instrument_columns()
        .map(|(id, col)| rebase(id, col))
        .collect::<Result<Vec<_>, _>>()?;
    let benchmark = rebase(table.benchmark_id(), table.benchmark())?;

    Ok(DatedTable::from_parts(
        table.dates().to_vec(),
        table.instruments().to_vec(),
        columns,
        table.benchmark_id().clone(),
        benchmark,
    ))
}
