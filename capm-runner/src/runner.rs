//! Run orchestration: config → window → load → analyze → report.

use capm_core::data::{DataProvider, DownloadProgress};
use capm_core::{analyze, AnalysisError};
use chrono::Local;
use thiserror::Error;

use crate::config::{AnalysisConfig, ConfigError};
use crate::data_loader::{load_prices, LoadError, LoadedPrices};
use crate::report::AnalysisReport;
use crate::window::AnalysisWindow;

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Errors that stop a run. Instrument-scoped problems never surface here.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("analysis error: {0}")]
    Analysis(#[from] AnalysisError),
}

/// Pin `today` (from the local clock when the config leaves it open) and derive the window.
pub fn resolve(config: &AnalysisConfig) -> (AnalysisConfig, AnalysisWindow) {
    let mut resolved = config.clone();
    let today = *resolved.today.get_or_insert_with(|| Local::now().date_naive());
    let window = AnalysisWindow::ending(today, resolved.window_years);
    (resolved, window)
}

/// Load prices through `provider` and run the analysis.
pub fn run_analysis(
    config: &AnalysisConfig,
    provider: &dyn DataProvider,
    progress: Option<&dyn DownloadProgress>,
) -> Result<AnalysisReport, RunError> {
    config.validate()?;
    let (config, window) = resolve(config);

    tracing::info!(
        provider = provider.name(),
        start = %window.start,
        end = %window.end,
        instruments = config.instruments.len(),
        "loading prices"
    );
    let loaded = load_prices(
        &config.instruments,
        &config.benchmark,
        provider,
        progress,
        &window,
    )?;

    run_analysis_from_prices(&config, loaded)
}

/// Analyze prices that were already loaded over `config`'s window.
pub fn run_analysis_from_prices(
    config: &AnalysisConfig,
    loaded: LoadedPrices,
) -> Result<AnalysisReport, RunError> {
    config.validate()?;
    let (config, window) = resolve(config);

    let analysis = analyze(&loaded.instruments, &loaded.benchmark, &config.capm_params())?;

    Ok(AnalysisReport {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id()?,
        window,
        dataset_hash: loaded.dataset_hash,
        has_synthetic: loaded.has_synthetic,
        sources: loaded.sources,
        load_failures: loaded.failures,
        analysis,
        config,
    })
}
