//! Beta/alpha estimation by closed-form ordinary least squares.
//!
//! Model: `instrument_return ≈ beta * benchmark_return + alpha`, fitted over every row
//! of a [`ReturnTable`]. Beta is the systematic-risk slope; alpha the intercept.

use super::AnalysisError;
use crate::domain::{InstrumentId, ReturnTable};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Regression coefficients of one instrument against the benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetaAlpha {
    pub beta: f64,
    pub alpha: f64,
}

/// Fit beta/alpha for a single instrument column.
pub fn estimate_beta_alpha(
    returns: &ReturnTable,
    instrument: &str,
) -> Result<BetaAlpha, AnalysisError> {
    let id = InstrumentId::from(instrument);
    let y = returns
        .instrument_columns()
        .find(|(i, _)| i.as_str() == instrument)
        .map(|(_, col)| col)
        .ok_or_else(|| AnalysisError::UnknownInstrument {
            instrument: id.clone(),
        })?;
    let x = returns.benchmark();

    if returns.len() < 2 {
        return Err(AnalysisError::InsufficientData {
            instrument: id,
            rows: returns.len(),
        });
    }

    let (beta, alpha) =
        least_squares(x, y).ok_or(AnalysisError::DegenerateRegression { instrument: id })?;
    Ok(BetaAlpha { beta, alpha })
}

/// Estimate every instrument in the table independently.
///
/// Instruments run in parallel; the ordered map makes the result independent of
/// scheduling.
pub fn estimate_all(
    returns: &ReturnTable,
) -> BTreeMap<InstrumentId, Result<BetaAlpha, AnalysisError>> {
    returns
        .instruments()
        .par_iter()
        .map(|id| (id.clone(), estimate_beta_alpha(returns, id.as_str())))
        .collect()
}

/// Degree-1 least squares on centered data. `None` when `x` has no variance.
fn least_squares(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let (sxx, sxy) = x.iter().zip(y).fold((0.0, 0.0), |(sxx, sxy), (&xi, &yi)| {
        let dx = xi - mean_x;
        (sxx + dx * dx, sxy + dx * (yi - mean_y))
    });

    // A return is `p[t]/p[t-1] - 1`: the division rounds at the scale of the price
    // ratio, so a constant-growth benchmark leaves about `EPS * (1 + |r|)` of spread.
    let scale = x.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    let noise = 8.0 * f64::EPSILON * (1.0 + scale);
    if sxx <= n * noise * noise {
        return None;
    }

    let slope = sxy / sxx;
    Some((slope, mean_y - slope * mean_x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::daily_return;
    use crate::data::align::align;
    use crate::domain::PriceSeries;
    use chrono::NaiveDate;

    fn returns(cols: &[(&str, &[f64])], bench: &[f64]) -> ReturnTable {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let dates = (0..).map(|i| base + chrono::Duration::days(i));
        let series: Vec<PriceSeries> = cols
            .iter()
            .map(|(s, p)| PriceSeries::from_closes(*s, dates.clone().zip(p.iter().copied())))
            .collect();
        let b = PriceSeries::from_closes("^GSPC", dates.zip(bench.iter().copied()));
        daily_return(&align(&series, &b).unwrap()).unwrap()
    }

    #[test]
    fn proportional_series_has_unit_beta() {
        let bench = [100.0, 103.0, 99.0, 104.0, 108.0];
        let half: Vec<f64> = bench.iter().map(|p| p / 2.0).collect();
        let r = returns(&[("A", &half)], &bench);
        let est = estimate_beta_alpha(&r, "A").unwrap();
        assert!((est.beta - 1.0).abs() < 1e-9);
        assert!(est.alpha.abs() < 1e-12);
    }

    #[test]
    fn known_line_is_recovered() {
        let x = [0.01, -0.02, 0.03, 0.005];
        let y: Vec<f64> = x.iter().map(|v| 1.5 * v + 0.001).collect();
        let (slope, intercept) = least_squares(&x, &y).unwrap();
        assert!((slope - 1.5).abs() < 1e-12);
        assert!((intercept - 0.001).abs() < 1e-12);
    }

    #[test]
    fn constant_benchmark_is_degenerate() {
        let r = returns(&[("A", &[50.0, 55.0, 60.5])], &[100.0, 110.0, 121.0]);
        assert_eq!(
            estimate_beta_alpha(&r, "A"),
            Err(AnalysisError::DegenerateRegression {
                instrument: "A".into()
            })
        );
    }

    #[test]
    fn constant_growth_benchmark_is_degenerate() {
        // 100 → 110 → 121 → 133.1 gives returns a few ulps apart, not bit-identical.
        let r = returns(&[("A", &[50.0, 51.0, 53.0, 52.0])], &[100.0, 110.0, 121.0, 133.1]);
        assert!(r.benchmark().iter().any(|v| *v != r.benchmark()[0]));
        assert_eq!(
            estimate_beta_alpha(&r, "A"),
            Err(AnalysisError::DegenerateRegression {
                instrument: "A".into()
            })
        );
    }

    #[test]
    fn returns_one_ulp_apart_are_degenerate() {
        let x = [0.10000000000000009, 0.10000000000000009, 0.09999999999999987];
        assert_eq!(least_squares(&x, &[0.02, -0.01, 0.03]), None);

        let big = [2.0, 2.0 + 4.0 * f64::EPSILON, 2.0 - 4.0 * f64::EPSILON];
        assert_eq!(least_squares(&big, &[0.02, -0.01, 0.03]), None);
    }

    #[test]
    fn low_variance_benchmark_still_fits() {
        let x = [0.001, 0.0010001, 0.0009999, 0.00100005];
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v - 0.0005).collect();
        let (slope, intercept) = least_squares(&x, &y).unwrap();
        assert!((slope - 2.0).abs() < 1e-6);
        assert!((intercept + 0.0005).abs() < 1e-9);

        let r = returns(
            &[("A", &[50.0, 50.05, 50.1, 50.16])],
            &[1000.0, 1000.5, 1001.01, 1001.5],
        );
        assert!(estimate_beta_alpha(&r, "A").is_ok());
    }

    #[test]
    fn one_return_row_is_insufficient() {
        let r = returns(&[("A", &[50.0, 51.0])], &[100.0, 101.0]);
        assert_eq!(
            estimate_beta_alpha(&r, "A"),
            Err(AnalysisError::InsufficientData {
                instrument: "A".into(),
                rows: 1
            })
        );
    }

    #[test]
    fn benchmark_id_is_not_an_instrument() {
        let r = returns(&[("A", &[1.0, 2.0, 3.0])], &[1.0, 2.0, 4.0]);
        assert!(matches!(
            estimate_beta_alpha(&r, "^GSPC"),
            Err(AnalysisError::UnknownInstrument { .. })
        ));
    }

    #[test]
    fn estimate_all_covers_every_instrument() {
        let bench = [100.0, 101.0, 99.5, 102.0];
        let r = returns(
            &[("B", &[10.0, 10.2, 9.9, 10.5]), ("A", &[5.0, 5.1, 5.0, 5.2])],
            &bench,
        );
        let all = estimate_all(&r);
        assert_eq!(all.keys().map(|k| k.as_str()).collect::<Vec<_>>(), vec!["A", "B"]);
        assert!(all.values().all(|v| v.is_ok()));
    }
}
