//! Criterion benchmarks for the CAPM pipeline hot paths.
//!
//! Benchmarks:
//! 1. Alignment of N instruments against the benchmark
//! 2. Full `analyze` run (align, returns, regression, projection)

use capm_core::data::{align, SyntheticProvider};
use capm_core::domain::PriceSeries;
use capm_core::{analyze, CapmParams};
use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const TICKERS: [&str; 8] = ["TSLA", "AAPL", "NFLX", "MSFT", "MGM", "AMZN", "NVDA", "GOOGL"];

fn universe(years: i32) -> (Vec<PriceSeries>, PriceSeries) {
    let provider = SyntheticProvider::new("^GSPC");
    let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
    let start = NaiveDate::from_ymd_opt(2024 - years, 12, 31).unwrap();
    let instruments = TICKERS
        .iter()
        .map(|t| provider.generate(t, start, end))
        .collect();
    (instruments, provider.generate("^GSPC", start, end))
}

fn bench_align(c: &mut Criterion) {
    let mut group = c.benchmark_group("align");
    for years in [1, 5, 10] {
        let (instruments, bench) = universe(years);
        group.bench_with_input(BenchmarkId::from_parameter(years), &years, |b, _| {
            b.iter(|| align(black_box(&instruments), black_box(&bench)))
        });
    }
    group.finish();
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");
    let params = CapmParams::default();
    for years in [1, 5, 10] {
        let (instruments, bench) = universe(years);
        group.bench_with_input(BenchmarkId::from_parameter(years), &years, |b, _| {
            b.iter(|| analyze(black_box(&instruments), black_box(&bench), &params))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_align, bench_analyze);
criterion_main!(benches);
