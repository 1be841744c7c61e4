//! CAPM Core: domain types, price providers, and the beta/expected-return pipeline.
//!
//! This crate contains the quantitative heart of the workspace:
//! - Domain types (instrument ids, price series, dated column tables)
//! - Data providers (Yahoo Finance, CSV import, synthetic) behind one trait
//! - Strict inner-join alignment on date
//! - Normalization, daily returns, OLS beta/alpha, CAPM projection
//! - A pure [`pipeline::analyze`] entry point tying the stages together

pub mod analytics;
pub mod data;
pub mod domain;
pub mod pipeline;

pub use analytics::{AnalysisError, BetaAlpha, CapmParams, ExpectedReturn};
pub use domain::{AlignedTable, BenchmarkSeries, InstrumentId, PriceSeries, ReturnTable};
pub use pipeline::{analyze, CapmAnalysis, Diagnostic, DiagnosticKind};
