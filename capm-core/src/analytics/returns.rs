//! Day-over-day fractional returns.

use super::AnalysisError;
use crate::domain::{AlignedTable, DatedTable, InstrumentId, ReturnTable};
use chrono::NaiveDate;

/// `r[t] = price[t] / price[t-1] - 1` for every column; the first row is dropped.
///
/// A zero divisor fails with [`AnalysisError::DivisionUndefined`] naming the column
/// and the date of the return that could not be computed.
pub fn daily_return(table: &AlignedTable) -> Result<ReturnTable, AnalysisError> {
    let dates = table.dates();

    let columns = table
        .instrument_columns()
        .map(|(id, col)| pct_change(id, dates, col))
        .collect::<Result<Vec<_>, _>>()?;
    let benchmark = pct_change(table.benchmark_id(), dates, table.benchmark())?;

    Ok(DatedTable::from_parts(
        dates.iter().skip(1).copied().collect(),
        table.instruments().to_vec(),
        columns,
        table.benchmark_id().clone(),
        benchmark,
    ))
}

/// Percentage change of one price column against its own previous row.
pub fn pct_change(
    id: &InstrumentId,
    dates: &[NaiveDate],
    prices: &[f64],
) -> Result<Vec<f64>, AnalysisError> {
    prices
        .windows(2)
        .zip(dates.iter().skip(1))
        .map(|(w, &date)| {
            if w[0] == 0.0 {
                Err(AnalysisError::DivisionUndefined {
                    column: id.clone(),
                    date,
                })
            } else {
                Ok(w[1] / w[0] - 1.0)
            }
        })
        .collect()
}
