use anyhow::Result;
use colored::Colorize;
use wellbench_config::{BenchConfig, SweepProfile};
use wellbench_core::SweepPlan;

/// Print configured sweeps with their expanded grids
pub fn execute(config: &BenchConfig) -> Result<()> {
    if config.sweeps.is_empty() {
        println!("No sweeps configured");
        return Ok(());
    }

    for profile in &config.sweeps {
        print!("{}", describe(profile, config.runs));
    }
    Ok(())
}

fn describe(profile: &SweepProfile, runs: u32) -> String {
    let mut out = format!("{}  {}\n", profile.name.bold(), profile.display_title().dimmed());

    let plan = match SweepPlan::from_profile(profile, runs) {
        Ok(plan) => plan,
        Err(e) => {
            out.push_str(&format!("  {} {}\n", "invalid:".red(), e));
            return out;
        }
    };

    for axis in plan.grid().axes() {
        let flag = profile
            .axes
            .iter()
            .find(|a| a.name == axis.name)
            .map(|a| a.flag.as_str())
            .unwrap_or_default();
        out.push_str(&format!("  axis {} {} {:?}\n", axis.name, flag, axis.values));
    }
    for exe in &profile.executables {
        let mut command = vec![exe.path.display().to_string()];
        command.extend(exe.args.iter().cloned());
        out.push_str(&format!("  exe  {}\n", command.join(" ")));
    }
    out.push_str(&format!(
        "  {} point(s), {} invocation(s) at {} run(s)\n",
        plan.grid().len(),
        plan.invocation_count(),
        runs
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_builtin_mesh() {
        let config = BenchConfig::default();
        let mesh = config.sweep("nbuf-mesh").unwrap();
        let text = describe(mesh, 5);
        assert!(text.contains("axis block_count -c [4, 8, 16, 32, 64, 128]"));
        assert!(text.contains("axis block_size -s [8, 16, 32, 64, 128]"));
        assert!(text.contains("30 point(s), 150 invocation(s) at 5 run(s)"));
    }
}
