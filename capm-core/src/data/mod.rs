//! Price loading boundary: provider trait, concrete providers, and date alignment.

pub mod align;
pub mod circuit_breaker;
pub mod csv_import;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use align::align;
pub use circuit_breaker::CircuitBreaker;
pub use csv_import::{write_series_csv, CsvProvider};
pub use provider::{
    DataError, DataProvider, DataSource, DownloadProgress, FetchResult, SilentProgress,
    StdoutProgress,
};
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;
