//! Dense, date-indexed column tables shared by every pipeline stage.
//!
//! Storage is column-major: one `Vec<f64>` per instrument plus one for the
//! benchmark, all the same length as the date axis. The phantom `K` marks what
//! the cells hold, so a table of prices can never be passed where returns are
//! expected.

use super::ids::InstrumentId;
use chrono::NaiveDate;
use serde::Serialize;
use std::marker::PhantomData;

/// Marker: cells are closing prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prices {}

/// Marker: cells are fractional day-over-day changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Returns {}

/// Date-joined prices of every instrument plus the benchmark. No missing cells.
pub type AlignedTable = DatedTable<Prices>;

/// Daily returns derived from an [`AlignedTable`]; one row fewer than its source.
pub type ReturnTable = DatedTable<Returns>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(bound = "")]
pub struct DatedTable<K> {
    dates: Vec<NaiveDate>,
    instruments: Vec<InstrumentId>,
    columns: Vec<Vec<f64>>,
    benchmark_id: InstrumentId,
    benchmark: Vec<f64>,
    #[serde(skip)]
    _kind: PhantomData<K>,
}

/// A single row view, values in instrument order.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow<'a> {
    pub date: NaiveDate,
    pub values: Vec<f64>,
    pub benchmark: f64,
    pub instruments: &'a [InstrumentId],
}

impl<K> DatedTable<K> {
    /// Assemble a table from parts. Callers guarantee every column matches `dates` in length.
    pub(crate) fn from_parts(
        dates: Vec<NaiveDate>,
        instruments: Vec<InstrumentId>,
        columns: Vec<Vec<f64>>,
        benchmark_id: InstrumentId,
        benchmark: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(instruments.len(), columns.len());
        debug_assert!(columns.iter().all(|c| c.len() == dates.len()));
        debug_assert_eq!(benchmark.len(), dates.len());
        Self {
            dates,
            instruments,
            columns,
            benchmark_id,
            benchmark,
            _kind: PhantomData,
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn instruments(&self) -> &[InstrumentId] {
        &self.instruments
    }

    pub fn benchmark_id(&self) -> &InstrumentId {
        &self.benchmark_id
    }

    pub fn benchmark(&self) -> &[f64] {
        &self.benchmark
    }

    /// Row count.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn contains(&self, instrument: &str) -> bool {
        self.instruments.iter().any(|i| i.as_str() == instrument)
    }

    /// Column for an instrument, or the benchmark column when `name` is the benchmark id.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        if let Some(idx) = self.instruments.iter().position(|i| i.as_str() == name) {
            return Some(&self.columns[idx]);
        }
        (self.benchmark_id.as_str() == name).then_some(self.benchmark.as_slice())
    }

    /// Instrument columns in order, benchmark excluded.
    pub fn instrument_columns(&self) -> impl Iterator<Item = (&InstrumentId, &[f64])> {
        self.instruments
            .iter()
            .zip(self.columns.iter().map(Vec::as_slice))
    }

    /// Instrument columns in order, followed by the benchmark column.
    pub fn iter_columns(&self) -> impl Iterator<Item = (&InstrumentId, &[f64])> {
        self.instrument_columns()
            .chain(std::iter::once((
                &self.benchmark_id,
                self.benchmark.as_slice(),
            )))
    }

    pub fn row(&self, index: usize) -> Option<TableRow<'_>> {
        let date = *self.dates.get(index)?;
        Some(TableRow {
            date,
            values: self.columns.iter().map(|c| c[index]).collect(),
            benchmark: self.benchmark[index],
            instruments: &self.instruments,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = TableRow<'_>> {
        (0..self.len()).filter_map(move |i| self.row(i))
    }

    /// The first `n` rows (fewer if the table is shorter).
    pub fn head(&self, n: usize) -> Self {
        self.slice_rows(0, n.min(self.len()))
    }

    /// The last `n` rows (fewer if the table is shorter).
    pub fn tail(&self, n: usize) -> Self {
        let start = self.len().saturating_sub(n);
        self.slice_rows(start, self.len())
    }

    /// Copy of the table without one instrument's column. Unknown ids are a no-op.
    pub fn without(&self, instrument: &str) -> Self {
        let (instruments, columns): (Vec<_>, Vec<_>) = self
            .instruments
            .iter()
            .cloned()
            .zip(self.columns.iter().cloned())
            .filter(|(id, _)| id.as_str() != instrument)
            .unzip();
        Self::from_parts(
            self.dates.clone(),
            instruments,
            columns,
            self.benchmark_id.clone(),
            self.benchmark.clone(),
        )
    }

    /// Copy of the table keeping only the rows whose index satisfies `keep`.
    pub fn retain_rows(&self, keep: impl Fn(usize) -> bool) -> Self {
        let idx: Vec<usize> = (0..self.len()).filter(|&i| keep(i)).collect();
        let pick = |col: &[f64]| idx.iter().map(|&i| col[i]).collect::<Vec<f64>>();
        Self::from_parts(
            idx.iter().map(|&i| self.dates[i]).collect(),
            self.instruments.clone(),
            self.columns.iter().map(|c| pick(c)).collect(),
            self.benchmark_id.clone(),
            pick(&self.benchmark),
        )
    }

    fn slice_rows(&self, start: usize, end: usize) -> Self {
        Self::from_parts(
            self.dates[start..end].to_vec(),
            self.instruments.clone(),
            self.columns.iter().map(|c| c[start..end].to_vec()).collect(),
            self.benchmark_id.clone(),
            self.benchmark[start..end].to_vec(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> AlignedTable {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let dates: Vec<NaiveDate> = (0..4).map(|i| base + chrono::Duration::days(i)).collect();
        DatedTable::from_parts(
            dates,
            vec!["A".into(), "B".into()],
            vec![vec![1.0, 2.0, 3.0, 4.0], vec![10.0, 20.0, 30.0, 40.0]],
            "^GSPC".into(),
            vec![100.0, 101.0, 102.0, 103.0],
        )
    }

    #[test]
    fn column_lookup_covers_benchmark() {
        let t = table();
        assert_eq!(t.column("B"), Some(&[10.0, 20.0, 30.0, 40.0][..]));
        assert_eq!(t.column("^GSPC").map(|c| c[0]), Some(100.0));
        assert!(t.column("Z").is_none());
    }

    #[test]
    fn head_and_tail_clamp() {
        let t = table();
        assert_eq!(t.head(2).len(), 2);
        assert_eq!(t.tail(3).column("A"), Some(&[2.0, 3.0, 4.0][..]));
        assert_eq!(t.head(10).len(), 4);
        assert_eq!(t.tail(10).len(), 4);
    }

    #[test]
    fn without_drops_one_column() {
        let t = table().without("A");
        assert_eq!(t.instruments(), &[InstrumentId::from("B")]);
        assert_eq!(t.len(), 4);
        assert_eq!(t.iter_columns().count(), 2);
    }

    #[test]
    fn retain_rows_keeps_columns_in_step() {
        let t = table().retain_rows(|i| i != 1);
        assert_eq!(t.len(), 3);
        assert_eq!(t.column("A"), Some(&[1.0, 3.0, 4.0][..]));
        assert_eq!(t.benchmark(), &[100.0, 102.0, 103.0]);
        assert_eq!(t.dates()[1], table().dates()[2]);
    }

    #[test]
    fn row_view() {
        let t = table();
        let row = t.row(1).unwrap();
        assert_eq!(row.values, vec![2.0, 20.0]);
        assert_eq!(row.benchmark, 101.0);
        assert!(t.row(4).is_none());
        assert_eq!(t.rows().count(), 4);
    }
}
