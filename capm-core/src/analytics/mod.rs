//! The quantitative pipeline stages after alignment.

pub mod capm;
pub mod error;
pub mod normalize;
pub mod regression;
pub mod returns;

pub use capm::{
    annualized_benchmark_return, expected_return, project, CapmParams, ExpectedReturn,
    TRADING_DAYS_PER_YEAR,
};
pub use error::AnalysisError;
pub use normalize::normalize;
pub use regression::{estimate_all, estimate_beta_alpha, BetaAlpha};
pub use returns::{daily_return, pct_change};
