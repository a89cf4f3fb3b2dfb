//! Resource limits layer: POSIX rlimits for supervised children
//!
//! Limits are applied in the child between fork and exec, so they need no
//! privileges and bind only the snippet's process tree.
//!
//! # Examples
//!
//! ```ignore
//! use playground_exec::resources::ResourceLimits;
//!
//! let limits = ResourceLimits {
//!     max_cpu_seconds: Some(30),
//!     ..Default::default()
//! };
//! ```

pub mod rlimit;
pub use rlimit::ResourceLimits;
