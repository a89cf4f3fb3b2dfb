//! Main playground controller

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serde::Deserialize;
use tokio::task;

use crate::environment::EnvironmentBuilder;
use crate::errors::{PlaygroundError, Result};
use crate::execution::{ProcessResult, ProcessSupervisor};
use crate::language::Language;
use crate::outcome::ExecutionOutcome;
use crate::resources::ResourceLimits;
use crate::runtime::{
    JavaScriptAdapter, ModuleImport, PythonAdapter, RuntimeAdapter, RuntimeRegistry,
    WrappedProgram,
};
use crate::utils;

/// Wall-clock limit applied to every execution
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

/// Where the shared JavaScript dependencies are provisioned
pub const DEFAULT_DEPENDENCY_ROOT: &str = "/app/js_workspace/node_modules";

/// A snippet and the language it is written in
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionRequest {
    pub code: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    Language::default().as_str().to_string()
}

impl ExecutionRequest {
    pub fn new(code: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            language: language.into(),
        }
    }
}

/// Playground configuration
#[derive(Debug, Clone)]
pub struct PlaygroundConfig {
    /// Python interpreter (bare names are looked up on PATH)
    pub python: PathBuf,
    /// JavaScript interpreter
    pub node: PathBuf,
    /// Shared, read-only `node_modules` linked into every JavaScript workspace
    pub dependency_root: PathBuf,
    /// Parent of per-execution workspaces; system temp dir when `None`
    pub scratch_dir: Option<PathBuf>,
    /// Deadline for every execution
    pub deadline: Duration,
    /// rlimits applied to every child
    pub limits: ResourceLimits,
    /// `require` lines in the JavaScript preamble
    pub js_imports: Vec<ModuleImport>,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            python: PathBuf::from("python3"),
            node: PathBuf::from("node"),
            dependency_root: PathBuf::from(DEFAULT_DEPENDENCY_ROOT),
            scratch_dir: None,
            deadline: DEFAULT_DEADLINE,
            limits: ResourceLimits::default(),
            js_imports: ModuleImport::defaults(),
        }
    }
}

impl PlaygroundConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.deadline.is_zero() {
            return Err(PlaygroundError::InvalidConfig(
                "Deadline must be greater than zero".to_string(),
            ));
        }

        if self.python.as_os_str().is_empty() || self.node.as_os_str().is_empty() {
            return Err(PlaygroundError::InvalidConfig(
                "Interpreter paths cannot be empty".to_string(),
            ));
        }

        if let Some(dir) = &self.scratch_dir {
            if !dir.is_dir() {
                return Err(PlaygroundError::InvalidConfig(format!(
                    "Scratch directory {} does not exist",
                    dir.display()
                )));
            }
        }

        Ok(())
    }
}

/// Builder pattern for playground creation
#[derive(Debug, Default)]
pub struct PlaygroundBuilder {
    config: PlaygroundConfig,
}

impl PlaygroundBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set Python interpreter
    pub fn python(mut self, path: impl AsRef<Path>) -> Self {
        self.config.python = path.as_ref().to_path_buf();
        self
    }

    /// Set JavaScript interpreter
    pub fn node(mut self, path: impl AsRef<Path>) -> Self {
        self.config.node = path.as_ref().to_path_buf();
        self
    }

    /// Set shared dependency root
    pub fn dependency_root(mut self, path: impl AsRef<Path>) -> Self {
        self.config.dependency_root = path.as_ref().to_path_buf();
        self
    }

    /// Set workspace parent directory
    pub fn scratch_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.config.scratch_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set deadline
    pub fn deadline(mut self, duration: Duration) -> Self {
        self.config.deadline = duration;
        self
    }

    /// Set address-space limit
    pub fn memory_limit(mut self, bytes: u64) -> Self {
        self.config.limits.max_memory = Some(bytes);
        self
    }

    /// Set address-space limit from string (e.g., "512M")
    pub fn memory_limit_str(self, s: &str) -> Result<Self> {
        let bytes = utils::parse_memory_size(s)?;
        Ok(self.memory_limit(bytes))
    }

    /// Set CPU time limit in seconds
    pub fn cpu_time_limit(mut self, seconds: u64) -> Self {
        self.config.limits.max_cpu_seconds = Some(seconds);
        self
    }

    /// Set maximum size of files a snippet may write
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.config.limits.max_file_size = Some(bytes);
        self
    }

    /// Set maximum file size from string (e.g., "10M")
    pub fn max_file_size_str(self, s: &str) -> Result<Self> {
        let bytes = utils::parse_memory_size(s)?;
        Ok(self.max_file_size(bytes))
    }

    /// Set maximum open file descriptors
    pub fn max_open_files(mut self, count: u64) -> Self {
        self.config.limits.max_open_files = Some(count);
        self
    }

    /// Replace the JavaScript preamble imports
    pub fn js_imports(mut self, imports: Vec<ModuleImport>) -> Self {
        self.config.js_imports = imports;
        self
    }

    /// Build playground
    pub fn build(self) -> Result<Playground> {
        self.config.validate()?;
        Ok(Playground::new(self.config))
    }
}

/// Executes snippets; cheap to share across concurrent requests
#[derive(Debug, Clone)]
pub struct Playground {
    config: PlaygroundConfig,
    registry: RuntimeRegistry,
    environments: EnvironmentBuilder,
    supervisor: ProcessSupervisor,
}

impl Playground {
    fn new(config: PlaygroundConfig) -> Self {
        let registry = RuntimeRegistry::new(
            PythonAdapter::new(&config.python),
            JavaScriptAdapter::new(&config.node, &config.dependency_root)
                .with_imports(config.js_imports.clone()),
        );
        let environments = EnvironmentBuilder::new(config.scratch_dir.clone());
        let supervisor = ProcessSupervisor::new(config.deadline).with_limits(config.limits);

        Self {
            config,
            registry,
            environments,
            supervisor,
        }
    }

    pub fn config(&self) -> &PlaygroundConfig {
        &self.config
    }

    /// Resolve the request's language, then run it.
    ///
    /// The only error is [`PlaygroundError::UnsupportedLanguage`], raised
    /// before any file or process is created. Every other failure is
    /// reported through the returned outcome.
    pub async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionOutcome> {
        let language = Language::resolve(&request.language)?;
        if request.language != language.as_str() {
            debug!(
                "Running '{}' snippet on the {} runtime as-is",
                request.language, language
            );
        }
        Ok(self.run(language, &request.code).await)
    }

    /// Run `code` on `language`'s runtime.
    pub async fn run(&self, language: Language, code: &str) -> ExecutionOutcome {
        let start = Instant::now();
        let adapter = self.registry.adapter(language);
        let program = adapter.wrap(code);

        let result = self.supervise(adapter, &program).await;
        let status = match &result {
            Ok(process) => process.termination.to_string(),
            Err(e) => e.kind().to_string(),
        };
        let outcome = ExecutionOutcome::normalize(result, self.config.deadline);

        info!(
            "{} execution finished: status={} success={} in {}ms",
            language,
            status,
            outcome.succeeded,
            start.elapsed().as_millis()
        );
        outcome
    }

    async fn supervise(
        &self,
        adapter: &dyn RuntimeAdapter,
        program: &WrappedProgram,
    ) -> Result<ProcessResult> {
        let environment = match adapter.workspace() {
            Some(layout) => {
                let builder = self.environments.clone();
                let program = program.clone();
                let built = task::spawn_blocking(move || builder.build(&layout, &program))
                    .await
                    .map_err(|e| PlaygroundError::Io(io::Error::other(e)))?;
                Some(built?)
            }
            None => None,
        };

        let result = match adapter.command(program, environment.as_ref()) {
            Ok(command) => self.supervisor.run(&command).await,
            Err(e) => Err(e),
        };

        if let Some(environment) = environment {
            if let Err(e) = task::spawn_blocking(move || environment.cleanup()).await {
                warn!("Workspace cleanup task failed: {}", e);
            }
        }
        result
    }
}
