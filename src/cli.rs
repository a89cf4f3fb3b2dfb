//! Command-line and environment configuration shared by the binaries

use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

use crate::controller::{Playground, PlaygroundBuilder, DEFAULT_DEPENDENCY_ROOT};
use crate::errors::Result;
use crate::runtime::ModuleImport;

#[derive(Args, Debug, Clone)]
pub struct RuntimeArgs {
    /// Python interpreter
    #[arg(long, value_name = "PATH", env = "PLAYGROUND_PYTHON", default_value = "python3")]
    pub python: PathBuf,

    /// JavaScript interpreter
    #[arg(long, value_name = "PATH", env = "PLAYGROUND_NODE", default_value = "node")]
    pub node: PathBuf,

    /// Shared node_modules linked into every JavaScript workspace
    #[arg(
        long,
        value_name = "PATH",
        env = "PLAYGROUND_NODE_MODULES",
        default_value = DEFAULT_DEPENDENCY_ROOT
    )]
    pub node_modules: PathBuf,

    /// Parent directory for per-execution workspaces (system temp dir if unset)
    #[arg(long, value_name = "PATH", env = "PLAYGROUND_SCRATCH_DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Deadline for every execution, in seconds
    #[arg(long, value_name = "SECONDS", env = "PLAYGROUND_DEADLINE", default_value_t = 30)]
    pub deadline: u64,

    /// Address-space limit per execution (100M, 1G)
    #[arg(long, value_name = "SIZE", env = "PLAYGROUND_MEMORY_LIMIT")]
    pub memory_limit: Option<String>,

    /// CPU time limit per execution, in seconds
    #[arg(long, value_name = "SECONDS", env = "PLAYGROUND_CPU_LIMIT")]
    pub cpu_limit: Option<u64>,

    /// Largest file a snippet may write (10M)
    #[arg(long, value_name = "SIZE", env = "PLAYGROUND_MAX_FILE_SIZE")]
    pub max_file_size: Option<String>,

    /// Open file descriptor limit per execution
    #[arg(long, value_name = "COUNT", env = "PLAYGROUND_MAX_OPEN_FILES")]
    pub max_open_files: Option<u64>,

    /// Emit no `require` lines in the JavaScript preamble
    #[arg(long, env = "PLAYGROUND_NO_JS_IMPORTS")]
    pub no_js_imports: bool,
}

impl RuntimeArgs {
    pub fn to_builder(&self) -> Result<PlaygroundBuilder> {
        let mut builder = PlaygroundBuilder::new()
            .python(&self.python)
            .node(&self.node)
            .dependency_root(&self.node_modules)
            .deadline(Duration::from_secs(self.deadline));

        if let Some(dir) = &self.scratch_dir {
            builder = builder.scratch_dir(dir);
        }
        if let Some(m) = &self.memory_limit {
            builder = builder.memory_limit_str(m)?;
        }
        if let Some(c) = self.cpu_limit {
            builder = builder.cpu_time_limit(c);
        }
        if let Some(f) = &self.max_file_size {
            builder = builder.max_file_size_str(f)?;
        }
        if let Some(n) = self.max_open_files {
            builder = builder.max_open_files(n);
        }
        if self.no_js_imports {
            builder = builder.js_imports(Vec::<ModuleImport>::new());
        }

        Ok(builder)
    }

    pub fn build(&self) -> Result<Playground> {
        self.to_builder()?.build()
    }
}
