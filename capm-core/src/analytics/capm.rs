//! CAPM expected-return projection: `E[R] = Rf + beta * (Rm - Rf)`.

use super::regression::BetaAlpha;
use crate::domain::ReturnTable;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Conventional number of trading days in a year.
pub const TRADING_DAYS_PER_YEAR: u32 = 252;

/// Scalar market assumptions fed to the projector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapmParams {
    pub risk_free_rate: f64,
    pub trading_days_per_year: u32,
}

impl Default for CapmParams {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.0,
            trading_days_per_year: TRADING_DAYS_PER_YEAR,
        }
    }
}

/// Per-instrument projection result. Unavailability is explicit, never a zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExpectedReturn {
    Available { value: f64 },
    Unavailable { reason: String },
}

impl ExpectedReturn {
    pub fn value(&self) -> Option<f64> {
        match self {
            ExpectedReturn::Available { value } => Some(*value),
            ExpectedReturn::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, ExpectedReturn::Available { .. })
    }
}

impl fmt::Display for ExpectedReturn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedReturn::Available { value } => write!(f, "{value}"),
            ExpectedReturn::Unavailable { .. } => write!(f, "N/A"),
        }
    }
}

/// `Rf + beta * (Rm - Rf)`.
pub fn expected_return(beta: f64, risk_free_rate: f64, annualized_benchmark_return: f64) -> f64 {
    risk_free_rate + beta * (annualized_benchmark_return - risk_free_rate)
}

/// Project one instrument, or mark it unavailable when it has no estimate.
pub fn project(
    estimate: Option<&BetaAlpha>,
    risk_free_rate: f64,
    annualized_benchmark_return: f64,
    unavailable_reason: impl FnOnce() -> String,
) -> ExpectedReturn {
    match estimate {
        Some(est) => ExpectedReturn::Available {
            value: expected_return(est.beta, risk_free_rate, annualized_benchmark_return),
        },
        None => ExpectedReturn::Unavailable {
            reason: unavailable_reason(),
        },
    }
}

/// Mean daily benchmark return scaled to a year. `None` for an empty table.
pub fn annualized_benchmark_return(
    returns: &ReturnTable,
    trading_days_per_year: u32,
) -> Option<f64> {
    let bench = returns.benchmark();
    if bench.is_empty() {
        return None;
    }
    let mean = bench.iter().sum::<f64>() / bench.len() as f64;
    Some(mean * f64::from(trading_days_per_year))
}
