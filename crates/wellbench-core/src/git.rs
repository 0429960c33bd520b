//! Commit label for snapshots

use crate::runner::{Invocation, ProcessRunner, Result};
use std::path::Path;

/// `git rev-parse --short HEAD`, run through the benchmark runner
///
/// Fails like any other invocation when `dir` is not inside a repository.
pub fn current_commit(runner: &dyn ProcessRunner, dir: Option<&Path>) -> Result<String> {
    let mut invocation = Invocation::new("git").args(["rev-parse", "--short", "HEAD"]);
    if let Some(dir) = dir {
        invocation = invocation.current_dir(dir);
    }

    let output = runner.run(&invocation)?;
    Ok(output.stdout_utf8(&invocation)?.trim().to_string())
}
