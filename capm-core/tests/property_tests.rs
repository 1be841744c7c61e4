//! Property tests for pipeline invariants.
//!
//! Uses proptest to verify:
//! 1. Alignment is an exact inner join
//! 2. Normalization starts every column at 1.0
//! 3. Prices rebuilt from daily returns match the originals
//! 4. A series regressed on itself has beta 1 and alpha 0
//! 5. Expected return is strictly increasing in beta when Rm > Rf

use capm_core::analytics::{daily_return, estimate_beta_alpha, expected_return, normalize};
use capm_core::data::align;
use capm_core::domain::{PricePoint, PriceSeries};
use chrono::NaiveDate;
use proptest::prelude::*;
use std::collections::BTreeSet;

// ── Strategies (proptest) ────────────────────────────────────────────

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
}

fn arb_price() -> impl Strategy<Value = f64> {
    (1.0..1000.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_prices(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(arb_price(), len)
}

/// A series over a 40-day calendar where each day is independently present or missing.
fn arb_sparse_series(symbol: &'static str) -> impl Strategy<Value = PriceSeries> {
    prop::collection::vec(prop::option::weighted(0.8, arb_price()), 40).prop_map(move |days| {
        let points = days
            .into_iter()
            .enumerate()
            .filter_map(|(i, p)| {
                let date = base_date() + chrono::Duration::days(i as i64);
                p.map(|close| PricePoint::new(date, close))
            })
            .collect();
        PriceSeries::new(symbol, points)
    })
}

fn dense(symbol: &str, prices: &[f64]) -> PriceSeries {
    PriceSeries::from_closes(
        symbol,
        prices
            .iter()
            .enumerate()
            .map(|(i, p)| (base_date() + chrono::Duration::days(i as i64), *p)),
    )
}

fn dates_of(s: &PriceSeries) -> BTreeSet<NaiveDate> {
    s.points()
        .iter()
        .filter(|p| p.usable_close().is_some())
        .map(|p| p.date)
        .collect()
}

// ── 1. Alignment ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn alignment_is_exact_inner_join(
        a in arb_sparse_series("A"),
        b in arb_sparse_series("B"),
        bench in arb_sparse_series("^GSPC"),
    ) {
        let expected: BTreeSet<NaiveDate> = dates_of(&a)
            .intersection(&dates_of(&b))
            .copied()
            .collect::<BTreeSet<_>>()
            .intersection(&dates_of(&bench))
            .copied()
            .collect();

        match align(&[a.clone(), b.clone()], &bench) {
            Ok(table) => {
                let got: BTreeSet<NaiveDate> = table.dates().iter().copied().collect();
                prop_assert_eq!(got, expected);
                prop_assert!(table.dates().windows(2).all(|w| w[0] < w[1]));
                for (i, date) in table.dates().iter().enumerate() {
                    let src = a.points().iter().find(|p| p.date == *date).unwrap();
                    prop_assert_eq!(src.close, Some(table.column("A").unwrap()[i]));
                }
            }
            Err(_) => prop_assert!(expected.is_empty()),
        }
    }
}

// ── 2. Normalization ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn normalized_first_row_is_one(
        a in arb_prices(2..30),
        bench in arb_prices(2..30),
    ) {
        let table = align(&[dense("A", &a)], &dense("^GSPC", &bench)).unwrap();
        let n = normalize(&table).unwrap();
        for (_, col) in n.iter_columns() {
            prop_assert_eq!(col[0], 1.0);
        }
    }
}

// ── 3. Return/price round trip ───────────────────────────────────────

proptest! {
    #[test]
    fn prices_rebuild_from_returns(a in arb_prices(2..60)) {
        let table = align(&[dense("A", &a)], &dense("^GSPC", &a)).unwrap();
        let returns = daily_return(&table).unwrap();
        prop_assert_eq!(returns.len(), table.len() - 1);

        let r = returns.column("A").unwrap();
        let mut price = a[0];
        for (t, ret) in r.iter().enumerate() {
            price *= 1.0 + ret;
            prop_assert!((price - a[t + 1]).abs() <= 1e-9 * a[t + 1].max(1.0));
        }
    }
}

// ── 4. Regression self-consistency ───────────────────────────────────

proptest! {
    #[test]
    fn self_regression_is_identity(prices in arb_prices(3..60)) {
        let table = align(&[dense("SELF", &prices)], &dense("^GSPC", &prices)).unwrap();
        let returns = daily_return(&table).unwrap();
        let bench = returns.benchmark();
        prop_assume!(bench.iter().any(|r| (r - bench[0]).abs() > 1e-9));

        let est = estimate_beta_alpha(&returns, "SELF").unwrap();
        prop_assert!((est.beta - 1.0).abs() < 1e-9);
        prop_assert!(est.alpha.abs() < 1e-12);
    }
}

// ── 5. Monotonic expected return ─────────────────────────────────────

proptest! {
    #[test]
    fn expected_return_increasing_in_beta(
        rf in -0.05..0.10_f64,
        premium in 0.001..0.5_f64,
        b1 in -3.0..3.0_f64,
        step in 0.001..3.0_f64,
    ) {
        let rm = rf + premium;
        prop_assert!(expected_return(b1 + step, rf, rm) > expected_return(b1, rf, rm));
    }
}
