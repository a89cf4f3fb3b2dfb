//! playground-exec: run untrusted playground snippets
//!
//! Accepts a snippet plus a language identifier, runs it on the matching
//! interpreter under a hard wall-clock deadline, and reports captured output
//! in one uniform shape whatever happened to the process.
//!
//! # Modules
//!
//! - **language**: identifier → runtime resolution
//! - **runtime**: per-language wrapping and invocation
//! - **environment**: ephemeral per-execution workspaces
//! - **execution**: supervised child processes
//! - **resources**: rlimit quotas
//! - **outcome**: result normalization
//! - **controller**: configuration and orchestration
//!
//! # Example
//!
//! ```ignore
//! use playground_exec::{ExecutionRequest, PlaygroundBuilder};
//! use std::time::Duration;
//!
//! let playground = PlaygroundBuilder::new()
//!     .deadline(Duration::from_secs(30))
//!     .build()?;
//!
//! let outcome = playground
//!     .execute(&ExecutionRequest::new("print(1 + 1)", "python"))
//!     .await?;
//! println!("success: {}", outcome.succeeded);
//! ```
//!
//! The process boundary is the only isolation: no namespaces, seccomp or
//! privilege drop are applied. Run the service as an unprivileged user.

// Core modules
pub mod errors;
pub mod utils;

// Layered modules
pub mod environment;
pub mod execution;
pub mod language;
pub mod outcome;
pub mod resources;
pub mod runtime;

// Main controller
pub mod cli;
pub mod controller;

// Public API
pub use controller::{ExecutionRequest, Playground, PlaygroundBuilder, PlaygroundConfig};
pub use errors::{PlaygroundError, Result};
pub use execution::{ProcessConfig, ProcessResult, ProcessSupervisor, Termination};
pub use language::Language;
pub use outcome::ExecutionOutcome;
pub use resources::ResourceLimits;
pub use runtime::{RuntimeAdapter, WrappedProgram, COMPLETION_SENTINEL};


#[cfg(test)]
pub mod test_support {
    use std::path::Path;

    /// True when `program` can be found, so interpreter-backed tests can
    /// skip on hosts without it.
    pub fn has_interpreter(program: &str) -> bool {
        crate::utils::find_executable(Path::new(program)).is_some()
    }
}
