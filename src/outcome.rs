//! Uniform execution outcomes
//!
//! Every way an execution can end (exit, signal, deadline, setup or spawn
//! failure) collapses into one [`ExecutionOutcome`]. Nothing here returns an
//! error.

use crate::errors::{PlaygroundError, Result};
use crate::execution::{ProcessResult, Termination};
use nix::sys::signal::Signal;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub stdout: String,
    pub stderr: String,
    pub succeeded: bool,
}

impl ExecutionOutcome {
    /// Map a supervised run, or the error that prevented it, to an outcome.
    pub fn normalize(result: Result<ProcessResult>, deadline: Duration) -> Self {
        match result {
            Ok(process) => Self::from_process(process, deadline),
            Err(e) => Self::from_error(&e),
        }
    }

    pub fn from_process(process: ProcessResult, deadline: Duration) -> Self {
        let stdout = String::from_utf8_lossy(&process.stdout).into_owned();
        let mut stderr = String::from_utf8_lossy(&process.stderr).into_owned();

        match process.termination {
            Termination::Exited(code) => Self {
                stdout,
                stderr,
                succeeded: code == 0,
            },
            Termination::Signaled(signal) => {
                if !stderr.is_empty() && !stderr.ends_with('\n') {
                    stderr.push('\n');
                }
                stderr.push_str(&format!(
                    "Process terminated by signal {}",
                    signal_name(signal)
                ));
                Self {
                    stdout,
                    stderr,
                    succeeded: false,
                }
            }
            Termination::TimedOut => Self::from_error(&PlaygroundError::Timeout { deadline }),
        }
    }

    pub fn from_error(error: &PlaygroundError) -> Self {
        let stderr = match error {
            PlaygroundError::Timeout { .. } => error.to_string(),
            _ => error.diagnostic(),
        };
        Self {
            stdout: String::new(),
            stderr,
            succeeded: false,
        }
    }
}

fn signal_name(signal: i32) -> String {
    Signal::try_from(signal)
        .map(|s| s.as_str().to_string())
        .unwrap_or_else(|_| signal.to_string())
}
