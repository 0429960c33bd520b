use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Progress per sweep and executable (default)
    Info,
    /// Every invocation
    Debug,
    /// Skipped report lines too
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "wellbench")]
#[command(about = "wellbench - sweep, run and aggregate MemoryWell concurrency benchmarks")]
#[command(version)]
pub struct Cli {
    /// Subcommand to execute (defaults to run)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Runs per configuration point (overrides config file, default 5)
    #[arg(short = 'r', long, global = true)]
    pub runs: Option<u32>,

    /// Config file path (defaults to ~/.config/wellbench/config.toml)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for snapshots and series files (overrides config file)
    #[arg(short = 'o', long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Only use the named sweep; repeat for several
    #[arg(short = 's', long = "sweep", global = true, value_name = "NAME")]
    pub sweeps: Vec<String>,

    /// Commit label for snapshots instead of `git rev-parse --short HEAD`
    #[arg(long, global = true, value_name = "LABEL")]
    pub commit: Option<String>,

    /// Set log level (off, error, warn, info, debug, trace)
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Effective log level; `--log-level` beats `--verbose`
    pub fn level_filter(&self) -> LevelFilter {
        match (self.log_level, self.verbose) {
            (Some(level), _) => level.into(),
            (None, true) => LevelFilter::DEBUG,
            (None, false) => LevelFilter::INFO,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the configured sweeps and write snapshots and series
    Run,

    /// List configured sweeps with their grids
    List,

    /// Rebuild series files from saved snapshots without running anything
    Export {
        /// Snapshot files written by an earlier run
        #[arg(required = true)]
        snapshots: Vec<PathBuf>,
    },

    /// Print the effective configuration as TOML
    Config,
}
