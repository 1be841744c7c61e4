//! CAPM Runner: configuration, data loading, run orchestration, reporting.
//!
//! This crate builds on `capm-core` to provide:
//! - TOML configuration with validation and a content-hash run id
//! - Analysis window derivation from a reference date
//! - Price loading with benchmark/instrument failure asymmetry and a dataset hash
//! - Display-ready report tables and CSV/JSON artifacts

pub mod config;
pub mod data_loader;
pub mod export;
pub mod report;
pub mod runner;
pub mod window;

pub use config::{AnalysisConfig, ConfigError, RunId};
pub use data_loader::{load_prices, LoadError, LoadFailure, LoadedPrices};
pub use export::{save_artifacts, write_table_csv, ArtifactPaths};
pub use report::{round2, AnalysisReport, BetaRow, ExpectedReturnRow, NOT_AVAILABLE};
pub use runner::{resolve, run_analysis, run_analysis_from_prices, RunError, SCHEMA_VERSION};
pub use window::AnalysisWindow;
