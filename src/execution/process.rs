//! Supervised interpreter processes

use crate::errors::{PlaygroundError, Result};
use crate::resources::ResourceLimits;
use log::{debug, warn};
use nix::errno::Errno;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use std::fmt;
use std::io;
use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;

/// Parent variables a child may see. Everything else is dropped.
const INHERITED_ENV: &[&str] = &["PATH", "HOME", "LANG", "LC_ALL", "TZ"];

/// Process execution configuration
#[derive(Debug, Clone, Default)]
pub struct ProcessConfig {
    /// Program to execute
    pub program: PathBuf,
    /// Program arguments
    pub args: Vec<String>,
    /// Extra environment variables, on top of the inherited allow-list
    pub env: Vec<(String, String)>,
    /// Working directory
    pub cwd: Option<PathBuf>,
}

/// How a supervised process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Exited on its own with this status code
    Exited(i32),
    /// Killed by a signal it did not ask for (e.g. an rlimit)
    Signaled(i32),
    /// Deadline expired; the process group was killed
    TimedOut,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Exited(code) => write!(f, "exit {}", code),
            Termination::Signaled(signal) => write!(f, "signal {}", signal),
            Termination::TimedOut => f.write_str("timed out"),
        }
    }
}

/// Result of process execution
#[derive(Debug, Clone)]
pub struct ProcessResult {
    pub termination: Termination,
    /// Captured stdout (empty on timeout)
    pub stdout: Vec<u8>,
    /// Captured stderr (empty on timeout)
    pub stderr: Vec<u8>,
    /// Wall clock time in milliseconds
    pub wall_time_ms: u64,
}

/// Runs one child per call under a wall-clock deadline
#[derive(Debug, Clone)]
pub struct ProcessSupervisor {
    deadline: Duration,
    limits: ResourceLimits,
}

impl ProcessSupervisor {
    pub fn new(deadline: Duration) -> Self {
        Self {
            deadline,
            limits: ResourceLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Spawn `config`, capture its output and wait for it.
    ///
    /// Only spawn failures and I/O errors on the pipes are returned as `Err`;
    /// a timeout is a [`Termination::TimedOut`] result.
    pub async fn run(&self, config: &ProcessConfig) -> Result<ProcessResult> {
        let mut command = Command::new(&config.program);
        command
            .args(&config.args)
            .env_clear()
            .envs(inherited_env())
            .envs(config.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0)
            .kill_on_drop(true);

        if let Some(cwd) = &config.cwd {
            command.current_dir(cwd);
        }

        if !self.limits.is_empty() {
            let limits = self.limits;
            // SAFETY: the closure only issues setrlimit syscalls and does not
            // allocate or take locks.
            unsafe {
                command.pre_exec(move || limits.apply());
            }
        }

        let start = Instant::now();
        let mut child = command.spawn().map_err(|source| PlaygroundError::Spawn {
            program: config.program.display().to_string(),
            source,
        })?;
        let mut group = ProcessGroupGuard::new(child.id());
        debug!(
            "Spawned {} (pid {:?})",
            config.program.display(),
            child.id()
        );

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("stdout not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("stderr not captured"))?;

        // Readers run alongside the wait so a full pipe never stalls the child.
        let mut stdout = drain(stdout);
        let mut stderr = drain(stderr);
        let until = tokio::time::Instant::from_std(start + self.deadline);

        let waited = tokio::time::timeout_at(until, child.wait()).await;

        // Descendants still holding the pipes die with the group, which lets
        // the readers reach EOF.
        group.kill();

        let (termination, stdout, stderr) = match waited {
            Ok(Ok(status)) => {
                let out = collect(&mut stdout, until).await?;
                let err = collect(&mut stderr, until).await?;
                (termination_of(status), out, err)
            }
            Ok(Err(e)) => {
                stdout.abort();
                stderr.abort();
                return Err(PlaygroundError::Io(e));
            }
            Err(_) => {
                warn!(
                    "{} exceeded deadline of {:?}; killed",
                    config.program.display(),
                    self.deadline
                );
                stdout.abort();
                stderr.abort();
                if let Err(e) = child.start_kill() {
                    debug!("start_kill after deadline: {}", e);
                }
                if let Err(e) = child.wait().await {
                    warn!("Failed to reap timed out child: {}", e);
                }
                (Termination::TimedOut, Vec::new(), Vec::new())
            }
        };

        let wall_time_ms = start.elapsed().as_millis() as u64;
        debug!(
            "{} finished: {:?} in {}ms",
            config.program.display(),
            termination,
            wall_time_ms
        );

        Ok(ProcessResult {
            termination,
            stdout,
            stderr,
            wall_time_ms,
        })
    }
}

fn drain<R>(mut pipe: R) -> JoinHandle<io::Result<Vec<u8>>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf).await?;
        Ok(buf)
    })
}

/// Wait for a reader until `until`. A pipe still open past it belongs to a
/// process that left the group; what it holds is dropped.
async fn collect(
    reader: &mut JoinHandle<io::Result<Vec<u8>>>,
    until: tokio::time::Instant,
) -> io::Result<Vec<u8>> {
    match tokio::time::timeout_at(until, &mut *reader).await {
        Ok(joined) => joined.map_err(io::Error::other)?,
        Err(_) => {
            reader.abort();
            warn!("Output pipe still open at deadline; discarding it");
            Ok(Vec::new())
        }
    }
}

fn inherited_env() -> Vec<(&'static str, std::ffi::OsString)> {
    INHERITED_ENV
        .iter()
        .filter_map(|key| std::env::var_os(key).map(|value| (*key, value)))
        .collect()
}

fn termination_of(status: ExitStatus) -> Termination {
    match (status.code(), status.signal()) {
        (Some(code), _) => Termination::Exited(code),
        (None, Some(signal)) => Termination::Signaled(signal),
        (None, None) => Termination::Exited(-1),
    }
}

/// SIGKILLs the child's process group once, at the latest on drop.
struct ProcessGroupGuard {
    pgid: Option<Pid>,
}

impl ProcessGroupGuard {
    fn new(pid: Option<u32>) -> Self {
        Self {
            pgid: pid.map(|pid| Pid::from_raw(pid as i32)),
        }
    }

    fn kill(&mut self) {
        if let Some(pgid) = self.pgid.take() {
            match killpg(pgid, Signal::SIGKILL) {
                Ok(()) | Err(Errno::ESRCH) => {}
                Err(e) => warn!("Failed to kill process group {}: {}", pgid, e),
            }
        }
    }
}

impl Drop for ProcessGroupGuard {
    fn drop(&mut self) {
        self.kill();
    }
}
