//! Files a sweep leaves behind
//!
//! - `<sweep>__<executable>.json`: snapshot per executable
//! - `<sweep>.series.json`: renderer hand-off, one entry per metric

use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use wellbench_core::SweepOutcome;

pub fn series_file_name(sweep: &str) -> String {
    format!("{}.series.json", sweep)
}

/// Write the renderer hand-off for `outcome` into `dir`
pub fn write_series(dir: &Path, outcome: &SweepOutcome, commit_id: Option<&str>) -> Result<PathBuf> {
    let data = outcome
        .render(commit_id)
        .with_context(|| format!("failed to build series for sweep '{}'", outcome.sweep))?;
    let json = serde_json::to_string_pretty(&data)?;

    let path = dir.join(series_file_name(&outcome.sweep));
    fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    info!("Wrote {}", path.display());
    Ok(path)
}

/// Snapshots for every executable, then the series file
pub fn write_outcome(dir: &Path, outcome: &SweepOutcome, commit_id: &str) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let mut written = Vec::new();
    for snapshot in outcome.snapshots(commit_id, Utc::now()) {
        let path = snapshot.save(dir)?;
        info!("Wrote {}", path.display());
        written.push(path);
    }
    written.push(write_series(dir, outcome, Some(commit_id))?);
    Ok(written)
}
