//! `wellbench` command line driver
//!
//! Loads the sweep configuration, runs each sweep through
//! [`wellbench_core`], prints a summary table and writes snapshots plus the
//! renderer hand-off files.

pub mod artifacts;
pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod summary;
