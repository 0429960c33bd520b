//! # wellbench configuration
//!
//! Sweep profiles for the MemoryWell benchmark driver: which executables to
//! run, which parameter axes to sweep, how to key the results, and where to
//! put the artifacts.
//!
//! The driver ships with built-in profiles ([`BenchConfig::default`]). A TOML
//! file can replace them; axis bounds are plain values so they can be tuned
//! without recompiling.
//!
//! ```rust,no_run
//! use wellbench_config::ConfigLoader;
//!
//! # fn main() -> Result<(), wellbench_config::ConfigError> {
//! let config = ConfigLoader::load(None)?;
//! for sweep in &config.sweeps {
//!     println!("{} ({} executables)", sweep.name, sweep.executables.len());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod loader;
mod profile;

pub use config::*;
pub use loader::*;
pub use profile::*;
