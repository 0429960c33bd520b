use anyhow::Result;
use wellbench_config::BenchConfig;

/// Print the effective configuration as TOML
pub fn execute(config: &BenchConfig) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}
