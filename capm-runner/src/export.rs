//! Artifact export: the three tables as CSV plus the full report as JSON.

use anyhow::{Context, Result};
use capm_core::domain::DatedTable;
use std::path::{Path, PathBuf};

use crate::report::AnalysisReport;

/// Artifact paths returned after export.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub run_dir: PathBuf,
    pub aligned_csv: PathBuf,
    pub normalized_csv: PathBuf,
    pub returns_csv: PathBuf,
    pub report_json: PathBuf,
}

/// Write every artifact of `report` under `output_dir/<artifact_key>/`.
pub fn save_artifacts(
    output_dir: impl AsRef<Path>,
    report: &AnalysisReport,
) -> Result<ArtifactPaths> {
    let run_dir = output_dir.as_ref().join(report.artifact_key());
    std::fs::create_dir_all(&run_dir).context("Failed to create run artifact directory")?;

    let aligned_csv = run_dir.join("aligned.csv");
    write_table_csv(&aligned_csv, &report.analysis.aligned)?;

    let normalized_csv = run_dir.join("normalized.csv");
    write_table_csv(&normalized_csv, &report.analysis.normalized)?;

    let returns_csv = run_dir.join("returns.csv");
    write_table_csv(&returns_csv, &report.analysis.returns)?;

    let report_json = run_dir.join("report.json");
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    std::fs::write(&report_json, json)
        .with_context(|| format!("Failed to write {}", report_json.display()))?;

    tracing::info!(dir = %run_dir.display(), "artifacts written");

    Ok(ArtifactPaths {
        run_dir,
        aligned_csv,
        normalized_csv,
        returns_csv,
        report_json,
    })
}

/// `Date`, one column per instrument, then the benchmark column. Full precision.
pub fn write_table_csv<K>(path: &Path, table: &DatedTable<K>) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    let mut header = vec!["Date".to_string()];
    header.extend(table.instruments().iter().map(|id| id.to_string()));
    header.push(table.benchmark_id().to_string());
    writer.write_record(&header)?;

    for row in table.rows() {
        let mut record = Vec::with_capacity(row.values.len() + 2);
        record.push(row.date.to_string());
        record.extend(row.values.iter().map(|v| v.to_string()));
        record.push(row.benchmark.to_string());
        writer.write_record(&record)?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
