//! Domain types: instrument identifiers, raw price series, dated tables.

pub mod ids;
pub mod series;
pub mod table;

pub use ids::{DatasetHash, InstrumentId};
pub use series::{BenchmarkSeries, PricePoint, PriceSeries};
pub use table::{AlignedTable, DatedTable, Prices, ReturnTable, Returns};
