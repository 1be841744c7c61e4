//! CAPM CLI: analyze instruments against a benchmark, download price files.
//!
//! Commands:
//! - `analyze`: estimate beta and CAPM expected return for each ticker
//! - `download`: fetch closes from Yahoo Finance into CSV files for offline runs

use anyhow::{Context, Result};
use capm_core::data::{
    write_series_csv, CircuitBreaker, CsvProvider, DataProvider, DownloadProgress, StdoutProgress,
    SyntheticProvider, YahooProvider,
};
use capm_core::AlignedTable;
use capm_runner::{
    run_analysis, save_artifacts, AnalysisConfig, AnalysisReport, AnalysisWindow,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "capm",
    about = "CAPM beta lab: beta and expected return against a market benchmark"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate beta/alpha and CAPM expected returns.
    Analyze {
        /// Tickers to analyze (e.g., TSLA AAPL). Defaults to the config file or the
        /// TSLA AAPL AMZN GOOGL set.
        tickers: Vec<String>,

        /// Path to a TOML config file. Flags override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of years of history.
        #[arg(long)]
        years: Option<u32>,

        /// Benchmark ticker. Defaults to ^GSPC.
        #[arg(long)]
        benchmark: Option<String>,

        /// Annual risk-free rate as a fraction (0.04 = 4%).
        #[arg(long)]
        risk_free_rate: Option<f64>,

        /// Trading days used to annualize the benchmark return.
        #[arg(long)]
        trading_days: Option<u32>,

        /// Reference date (YYYY-MM-DD), exclusive. Defaults to today.
        #[arg(long)]
        today: Option<String>,

        /// Where prices come from.
        #[arg(long, value_enum, default_value_t = Source::Yahoo)]
        source: Source,

        /// Directory of {SYMBOL}.csv files for `--source csv`.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Write CSV tables and report.json under this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Download closes from Yahoo Finance and write them as CSV import files.
    Download {
        /// Symbols to download (e.g., ^GSPC TSLA AAPL).
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Number of years of history.
        #[arg(long, default_value_t = 1)]
        years: u32,

        /// Reference date (YYYY-MM-DD), exclusive. Defaults to today.
        #[arg(long)]
        today: Option<String>,

        /// Output directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Source {
    Yahoo,
    Csv,
    Synthetic,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            tickers,
            config,
            years,
            benchmark,
            risk_free_rate,
            trading_days,
            today,
            source,
            data_dir,
            output_dir,
        } => {
            let mut cfg = match config {
                Some(path) => AnalysisConfig::from_file(&path)?,
                None => AnalysisConfig::default(),
            };
            if !tickers.is_empty() {
                cfg.instruments = tickers.into_iter().map(Into::into).collect();
            }
            if let Some(years) = years {
                cfg.window_years = years;
            }
            if let Some(benchmark) = benchmark {
                cfg.benchmark = benchmark.into();
            }
            if let Some(rate) = risk_free_rate {
                cfg.risk_free_rate = rate;
            }
            if let Some(days) = trading_days {
                cfg.trading_days_per_year = days;
            }
            if let Some(today) = today.as_deref() {
                cfg.today = Some(parse_date(today)?);
            }
            run_analyze_cmd(&cfg, source, data_dir, output_dir)
        }
        Commands::Download {
            symbols,
            years,
            today,
            data_dir,
        } => run_download(symbols, years, today, data_dir),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
}

fn build_provider(
    source: Source,
    cfg: &AnalysisConfig,
    data_dir: PathBuf,
) -> Result<Box<dyn DataProvider>> {
    Ok(match source {
        Source::Yahoo => {
            let circuit_breaker = Arc::new(CircuitBreaker::default_provider());
            Box::new(YahooProvider::new(circuit_breaker)?)
        }
        Source::Csv => Box::new(CsvProvider::new(data_dir)),
        Source::Synthetic => Box::new(SyntheticProvider::new(cfg.benchmark.clone())),
    })
}

fn run_analyze_cmd(
    cfg: &AnalysisConfig,
    source: Source,
    data_dir: PathBuf,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let provider = build_provider(source, cfg, data_dir)?;
    let progress = StdoutProgress;

    let report = run_analysis(cfg, provider.as_ref(), Some(&progress as &dyn DownloadProgress))?;
    print_report(&report);

    if let Some(dir) = output_dir {
        let paths = save_artifacts(&dir, &report)?;
        println!("Artifacts saved to: {}", paths.run_dir.display());
    }

    Ok(())
}

fn run_download(
    symbols: Vec<String>,
    years: u32,
    today: Option<String>,
    data_dir: PathBuf,
) -> Result<()> {
    let today = match today.as_deref() {
        Some(s) => parse_date(s)?,
        None => chrono::Local::now().date_naive(),
    };
    let window = AnalysisWindow::ending(today, years);

    let circuit_breaker = Arc::new(CircuitBreaker::default_provider());
    let provider = YahooProvider::new(circuit_breaker)?;
    let writer = CsvProvider::new(&data_dir);
    let progress = StdoutProgress;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;

    let total = symbols.len();
    tracing::info!(symbols = total, start = %window.start, end = %window.end, "downloading closes");
    let mut errors = Vec::new();
    for (i, symbol) in symbols.iter().enumerate() {
        progress.on_start(symbol, i, total);
        let result = provider
            .fetch(symbol, window.start, window.end)
            .and_then(|fetched| write_series_csv(&writer.path_for(symbol), &fetched.series));
        progress.on_complete(symbol, i, total, &result);
        if let Err(e) = result {
            errors.push((symbol.clone(), e));
        }
    }
    progress.on_batch_complete(total - errors.len(), errors.len(), total);

    if !errors.is_empty() {
        for (sym, err) in &errors {
            eprintln!("Error for {sym}: {err}");
        }
        std::process::exit(1);
    }

    Ok(())
}

fn print_report(report: &AnalysisReport) {
    let analysis = &report.analysis;
    println!();
    println!("=== CAPM Analysis ===");
    println!(
        "Period:         {} to {} (exclusive)",
        report.window.start, report.window.end
    );
    println!("Benchmark:      {}", report.config.benchmark);
    println!(
        "Rows:           {} aligned, {} returns",
        analysis.aligned.len(),
        analysis.returns.len()
    );
    match analysis.annualized_benchmark_return {
        Some(rm) => println!("Market Return:  {:.2}% (annualized)", rm * 100.0),
        None => println!("Market Return:  N/A"),
    }
    println!(
        "Risk-free Rate: {:.2}%",
        report.config.risk_free_rate * 100.0
    );
    println!("Run ID:         {}", &report.run_id[..12.min(report.run_id.len())]);

    print_table("--- Dataframe head ---", &report.head());
    print_table("--- Dataframe tail ---", &report.tail());

    println!();
    println!("--- Calculated beta value ---");
    println!("{:<10} {:>10}", "Stock", "Beta Value");
    for row in report.beta_table() {
        println!("{:<10} {:>10.2}", row.stock, row.beta_value);
    }

    println!();
    println!("--- Calculated return using CAPM ---");
    println!("{:<10} {:>16}", "Stock", "Expected Return");
    for row in report.expected_return_table() {
        println!("{:<10} {:>16}", row.stock, row.expected_return);
    }

    if report.has_synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    for warn in report.warnings() {
        println!("WARNING: {warn}");
    }
    println!();
}

fn print_table(title: &str, table: &AlignedTable) {
    println!();
    println!("{title}");
    let mut header = format!("{:<12}", "Date");
    for id in table.instruments().iter().chain(std::iter::once(table.benchmark_id())) {
        header.push_str(&format!(" {:>10}", id.as_str()));
    }
    println!("{header}");
    for row in table.rows() {
        let mut line = format!("{:<12}", row.date.to_string());
        for v in row.values.iter().chain(std::iter::once(&row.benchmark)) {
            line.push_str(&format!(" {v:>10.2}"));
        }
        println!("{line}");
    }
}
