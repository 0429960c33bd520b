use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use wellbench_core::{Snapshot, SweepOutcome};

use crate::{artifacts, summary};

/// Regenerate series files from snapshots, grouped by sweep
pub fn execute(output_dir: &Path, paths: &[PathBuf], commit: Option<&str>) -> Result<()> {
    let mut groups: Vec<(String, Vec<Snapshot>)> = Vec::new();
    for path in paths {
        let snapshot = Snapshot::load(path)?;
        match groups.iter_mut().find(|(sweep, _)| *sweep == snapshot.sweep) {
            Some((_, snapshots)) => snapshots.push(snapshot),
            None => groups.push((snapshot.sweep.clone(), vec![snapshot])),
        }
    }

    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    for (sweep, snapshots) in groups {
        let label = commit
            .map(str::to_string)
            .or_else(|| snapshots.first().map(|s| s.commit_id.clone()));
        let outcome = SweepOutcome::from_snapshots(snapshots)
            .with_context(|| format!("cannot rebuild sweep '{}'", sweep))?;

        let path = artifacts::write_series(output_dir, &outcome, label.as_deref())?;
        print!("{}", summary::render(&outcome));
        println!("{} {}", "Wrote".green(), path.display());
    }

    Ok(())
}
