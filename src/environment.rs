//! Ephemeral per-execution workspaces
//!
//! A workspace is a fresh temporary directory holding a symlink to the shared
//! dependency root, an optional manifest, and the wrapped program. It is owned
//! by exactly one execution and removed when dropped, whichever way the
//! execution ends. Removal deletes the symlink, never the tree it points to.

use crate::errors::{PlaygroundError, Result};
use crate::runtime::{WorkspaceLayout, WrappedProgram};
use log::{debug, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const WORKSPACE_PREFIX: &str = "playground-";

/// Creates workspaces under a scratch directory
#[derive(Debug, Clone, Default)]
pub struct EnvironmentBuilder {
    scratch_dir: Option<PathBuf>,
}

impl EnvironmentBuilder {
    /// `None` places workspaces in the system temporary directory
    pub fn new(scratch_dir: Option<PathBuf>) -> Self {
        Self { scratch_dir }
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }

    /// Materialize `program` according to `layout`.
    ///
    /// Any failure removes what was created so far; no partial workspace is
    /// ever handed out.
    pub fn build(
        &self,
        layout: &WorkspaceLayout,
        program: &WrappedProgram,
    ) -> Result<ExecutionEnvironment> {
        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(self.scratch_dir())
            .map_err(|source| setup_error("create workspace directory", source))?;

        if !layout.dependency_root.exists() {
            warn!(
                "Dependency root {} does not exist; imports will fail",
                layout.dependency_root.display()
            );
        }
        link(
            &layout.dependency_root,
            &dir.path().join(layout.dependency_link),
        )
        .map_err(|source| setup_error("link dependency root", source))?;

        if let Some(manifest) = &layout.manifest {
            fs::write(dir.path().join(manifest.file_name), manifest.contents)
                .map_err(|source| setup_error("write manifest", source))?;
        }

        let entry = dir.path().join(layout.entry_file);
        fs::write(&entry, program.source())
            .map_err(|source| setup_error("write entry file", source))?;

        debug!("Prepared workspace {}", dir.path().display());

        Ok(ExecutionEnvironment { dir, entry })
    }
}

fn setup_error(stage: &'static str, source: io::Error) -> PlaygroundError {
    PlaygroundError::EnvironmentSetup { stage, source }
}

fn link(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

/// A live workspace; removed on drop
#[derive(Debug)]
pub struct ExecutionEnvironment {
    dir: TempDir,
    entry: PathBuf,
}

impl ExecutionEnvironment {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn entry_path(&self) -> &Path {
        &self.entry
    }

    /// Remove the workspace now, logging rather than returning failures.
    pub fn cleanup(self) {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => debug!("Removed workspace {}", path.display()),
            Err(e) => warn!("Failed to remove workspace {}: {}", path.display(), e),
        }
    }
}
