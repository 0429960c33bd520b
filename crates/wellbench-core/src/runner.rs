//! Benchmark process execution
//!
//! One invocation, one child process, blocking until it exits. Output is
//! captured byte for byte; the parser depends on the exact layout.

use crate::grid::ConfigurationPoint;
use std::borrow::Cow;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};
use wellbench_config::{AxisConfig, ExecutableConfig};

const WATCHDOG_POLL: Duration = Duration::from_millis(50);

/// How long a killed run's pipes may stay open before their output is dropped
const DRAIN_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while running `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed with {status}\n--- stdout ---\n{stdout}\n--- stderr ---\n{stderr}")]
    ProcessFailure {
        command: String,
        status: String,
        stdout: String,
        stderr: String,
    },

    #[error("`{command}` killed by watchdog after {limit:?}\n--- stdout ---\n{stdout}\n--- stderr ---\n{stderr}")]
    Watchdog {
        command: String,
        limit: Duration,
        stdout: String,
        stderr: String,
    },

    #[error("`{command}` wrote non-UTF-8 output: {source}\n--- stdout ---\n{stdout}")]
    InvalidUtf8 {
        command: String,
        #[source]
        source: std::str::Utf8Error,
        stdout: String,
    },
}

pub type Result<T> = std::result::Result<T, RunnerError>;

/// A program and its argument list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// `exe [fixed args] [flag value]...`, flags in axis order
    pub fn for_point(
        exe: &ExecutableConfig,
        axes: &[AxisConfig],
        point: &ConfigurationPoint,
    ) -> Self {
        let mut invocation = Self::new(&exe.path).args(exe.args.iter().cloned());
        for axis in axes {
            if let Some(value) = point.get(&axis.name) {
                invocation = invocation.arg(axis.flag.clone()).arg(value.to_string());
            }
        }
        invocation
    }

    /// Shell-like rendering for logs and error reports
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

/// Captured result of one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    /// `None` when terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl RunOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Stdout as text; valid UTF-8 passes through untouched
    pub fn stdout_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    /// Stdout for parsing; invalid bytes are an error rather than replaced
    pub fn stdout_utf8(&self, invocation: &Invocation) -> Result<&str> {
        std::str::from_utf8(&self.stdout).map_err(|source| RunnerError::InvalidUtf8 {
            command: invocation.display(),
            source,
            stdout: self.stdout_text().into_owned(),
        })
    }

    pub fn stderr_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }

    /// Turn a non-zero exit into [`RunnerError::ProcessFailure`]
    pub fn check(self, invocation: &Invocation) -> Result<Self> {
        if self.success() {
            return Ok(self);
        }
        let status = match self.exit_code {
            Some(code) => format!("exit code {}", code),
            None => "termination by signal".to_string(),
        };
        Err(RunnerError::ProcessFailure {
            command: invocation.display(),
            status,
            stdout: self.stdout_text().into_owned(),
            stderr: self.stderr_text().into_owned(),
        })
    }
}

/// Runs benchmark processes
pub trait ProcessRunner {
    /// Run to completion and capture output, whatever the exit status
    fn execute(&self, invocation: &Invocation) -> Result<RunOutput>;

    /// Run and require exit status 0
    fn run(&self, invocation: &Invocation) -> Result<RunOutput> {
        self.execute(invocation)?.check(invocation)
    }
}

/// Runs real child processes
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    watchdog: Option<Duration>,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill children that outlive `limit`
    pub fn with_watchdog(limit: Duration) -> Self {
        Self {
            watchdog: Some(limit),
        }
    }

    fn execute_with_watchdog(&self, invocation: &Invocation, limit: Duration) -> Result<RunOutput> {
        let command = invocation.display();
        let io_err = |source| RunnerError::Io {
            command: command.clone(),
            source,
        };

        let mut cmd = invocation.command();
        // Own process group so the watchdog reaches wrapper scripts' children
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let mut child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RunnerError::Spawn {
                command: command.clone(),
                source,
            })?;

        // Drain both pipes so a chatty child cannot block on a full pipe
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let deadline = Instant::now() + limit;
        let status = loop {
            if let Some(status) = child.try_wait().map_err(io_err)? {
                break Some(status);
            }
            if Instant::now() >= deadline {
                kill_group(&mut child);
                child.wait().map_err(io_err)?;
                break None;
            }
            thread::sleep(WATCHDOG_POLL);
        };

        match status {
            Some(status) => Ok(RunOutput {
                exit_code: status.code(),
                stdout: join_drain(stdout).map_err(io_err)?,
                stderr: join_drain(stderr).map_err(io_err)?,
            }),
            None => {
                // A descendant that left the group can still hold the pipes
                let grace = Instant::now() + DRAIN_GRACE;
                let stdout = join_drain_until(stdout, grace).map_err(io_err)?;
                let stderr = join_drain_until(stderr, grace).map_err(io_err)?;
                warn!("Watchdog killed `{}` after {:?}", command, limit);
                Err(RunnerError::Watchdog {
                    command,
                    limit,
                    stdout: String::from_utf8_lossy(&stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&stderr).into_owned(),
                })
            }
        }
    }
}

impl ProcessRunner for SystemRunner {
    fn execute(&self, invocation: &Invocation) -> Result<RunOutput> {
        debug!("Running: {}", invocation.display());

        if let Some(limit) = self.watchdog {
            return self.execute_with_watchdog(invocation, limit);
        }

        let output = invocation
            .command()
            .stdin(Stdio::null())
            .output()
            .map_err(|source| RunnerError::Spawn {
                command: invocation.display(),
                source,
            })?;

        Ok(RunOutput {
            exit_code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

type Drain = thread::JoinHandle<std::io::Result<Vec<u8>>>;

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<Drain> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            pipe.read_to_end(&mut buf)?;
            Ok(buf)
        })
    })
}

/// Kill the child's whole process group, falling back to the child alone
fn kill_group(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Ok(pgid) = libc::pid_t::try_from(child.id()) {
            if unsafe { libc::killpg(pgid, libc::SIGKILL) } == 0 {
                return;
            }
        }
    }
    // The child may have exited between try_wait and kill
    let _ = child.kill();
}

/// Like [`join_drain`], but gives up with empty output at `deadline`
fn join_drain_until(handle: Option<Drain>, deadline: Instant) -> std::io::Result<Vec<u8>> {
    let Some(handle) = handle else {
        return Ok(Vec::new());
    };
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            return Ok(Vec::new());
        }
        thread::sleep(WATCHDOG_POLL);
    }
    join_drain(Some(handle))
}

fn join_drain(handle: Option<Drain>) -> std::io::Result<Vec<u8>> {
    match handle {
        Some(handle) => handle
            .join()
            .map_err(|_| std::io::Error::other("pipe reader panicked"))?,
        None => Ok(Vec::new()),
    }
}
