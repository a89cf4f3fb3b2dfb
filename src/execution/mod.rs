//! Execution layer: supervised child processes
//!
//! This module spawns one interpreter per execution and owns it until it is
//! reaped.
//!
//! # Features
//!
//! - **Batch capture**: stdout and stderr collected in full
//! - **Deadline**: wall-clock limit, enforced with SIGKILL
//! - **Process groups**: every descendant is killed when the run ends
//! - **Environment hygiene**: cleared environment, allow-listed passthrough
//!
//! # Examples
//!
//! ```ignore
//! use playground_exec::execution::{ProcessConfig, ProcessSupervisor};
//! use std::time::Duration;
//!
//! let supervisor = ProcessSupervisor::new(Duration::from_secs(30));
//! let result = supervisor.run(&ProcessConfig {
//!     program: "/bin/echo".into(),
//!     args: vec!["hello".to_string()],
//!     ..Default::default()
//! }).await?;
//! ```

pub mod process;
pub use process::{ProcessConfig, ProcessResult, ProcessSupervisor, Termination};
