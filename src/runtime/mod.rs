//! Runtime adapters: turning a raw snippet into a runnable program
//!
//! Each adapter owns three things for its language:
//!
//! - **Wrapping**: a pure text transformation that nests the snippet inside a
//!   generated async entry point, behind a fixed preamble and ahead of the
//!   completion sentinel.
//! - **Delivery**: whether the program can be passed to the interpreter as an
//!   argument or needs an ephemeral workspace on disk.
//! - **Invocation**: the interpreter command line for a wrapped program.
//!
//! Adapters never inspect the snippet; containment is the supervisor's job.

pub mod javascript;
pub mod python;

pub use javascript::{JavaScriptAdapter, ModuleImport};
pub use python::PythonAdapter;

use crate::environment::ExecutionEnvironment;
use crate::errors::Result;
use crate::execution::ProcessConfig;
use crate::language::Language;
use std::fmt;
use std::path::PathBuf;

/// Marker line printed after the wrapped body returns normally.
pub const COMPLETION_SENTINEL: &str = "✅ Execution completed";

/// Placeholder signing key exposed to every snippet. Read-only test material,
/// not a real secret.
pub const PLACEHOLDER_PRIVATE_KEY: &str =
    "1e951be867cba332c76e83ca9f0e55fffcd858f574973a5feac3148b308ff8ae";

/// Program text synthesized from one snippet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedProgram {
    language: Language,
    source: String,
}

impl WrappedProgram {
    pub fn new(language: Language, source: String) -> Self {
        Self { language, source }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for WrappedProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// A file written into the workspace verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub file_name: &'static str,
    pub contents: &'static str,
}

/// Directory layout a runtime needs to resolve modules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    /// Shared, pre-provisioned dependency tree (never written to)
    pub dependency_root: PathBuf,
    /// Name of the symlink pointing at `dependency_root`
    pub dependency_link: &'static str,
    /// Module-mode declaration, if the runtime reads one
    pub manifest: Option<Manifest>,
    /// File name the wrapped program is written to
    pub entry_file: &'static str,
}

/// Language-specific wrapping and invocation
pub trait RuntimeAdapter: Send + Sync + fmt::Debug {
    fn language(&self) -> Language;

    /// Build the runnable program. Pure: no I/O, no process.
    fn wrap(&self, code: &str) -> WrappedProgram;

    /// `Some` when the program must be materialized on disk before running.
    fn workspace(&self) -> Option<WorkspaceLayout>;

    /// Command line that runs `program`, inside `environment` when one was built.
    fn command(
        &self,
        program: &WrappedProgram,
        environment: Option<&ExecutionEnvironment>,
    ) -> Result<ProcessConfig>;
}

/// Indent every line of `code` by `indent`, keeping blank lines blank.
pub(crate) fn indent_body(code: &str, indent: &str) -> String {
    code.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{indent}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One adapter per [`Language`] variant
#[derive(Debug, Clone)]
pub struct RuntimeRegistry {
    python: PythonAdapter,
    javascript: JavaScriptAdapter,
}

impl RuntimeRegistry {
    pub fn new(python: PythonAdapter, javascript: JavaScriptAdapter) -> Self {
        Self { python, javascript }
    }

    pub fn adapter(&self, language: Language) -> &dyn RuntimeAdapter {
        match language {
            Language::Python => &self.python,
            Language::JavaScript => &self.javascript,
        }
    }
}
