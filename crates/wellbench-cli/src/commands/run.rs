use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::time::Duration;
use tracing::info;
use wellbench_config::BenchConfig;
use wellbench_core::{git, SweepPlan, SystemRunner};

use crate::{artifacts, summary};

/// Runner honouring the configured watchdog
pub fn system_runner(config: &BenchConfig) -> SystemRunner {
    match config.runner.watchdog_secs {
        Some(secs) => SystemRunner::with_watchdog(Duration::from_secs(secs)),
        None => SystemRunner::new(),
    }
}

/// Execute every configured sweep in order
pub fn execute(config: &BenchConfig, commit: Option<&str>) -> Result<()> {
    if config.sweeps.is_empty() {
        bail!("no sweeps configured");
    }

    // Expand every grid up front so a bad axis fails before the first run
    let plans = config
        .sweeps
        .iter()
        .map(|profile| {
            SweepPlan::from_profile(profile, config.runs)
                .with_context(|| format!("invalid sweep '{}'", profile.name))
        })
        .collect::<Result<Vec<_>>>()?;

    let runner = system_runner(config);
    let commit = match commit {
        Some(label) => label.to_string(),
        None => git::current_commit(&runner, None)
            .context("failed to determine the commit label (pass --commit to set one)")?,
    };
    info!("Commit label: {}", commit);

    for plan in &plans {
        let outcome = plan
            .execute(&runner)
            .with_context(|| format!("sweep '{}' aborted", plan.profile().name))?;
        let written = artifacts::write_outcome(&config.output_dir, &outcome, &commit)?;

        print!("{}", summary::render(&outcome));
        for path in written {
            println!("{} {}", "Wrote".green(), path.display());
        }
    }

    Ok(())
}
