use anyhow::Result;
use clap::Parser;
use tracing::debug;

use wellbench_cli::{
    cli::{Cli, Commands},
    commands,
    config::{self, Overrides},
    logging,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.level_filter());

    let overrides = Overrides::from(&cli);
    let config = config::load(cli.config.as_deref(), &overrides)?;

    let command = cli.command.clone().unwrap_or(Commands::Run);
    debug!("Command: {:?}", command);

    match command {
        Commands::Run => commands::run::execute(&config, cli.commit.as_deref()),
        Commands::List => commands::list::execute(&config),
        Commands::Export { snapshots } => {
            commands::export::execute(&config.output_dir, &snapshots, cli.commit.as_deref())
        }
        Commands::Config => commands::config::execute(&config),
    }
}
