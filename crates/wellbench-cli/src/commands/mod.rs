//! Subcommand implementations

pub mod config;
pub mod export;
pub mod list;
pub mod run;
