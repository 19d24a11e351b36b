//! Per-invocation scratch directories.
//!
//! Each compiler invocation gets its own randomly named directory under a
//! shared temp root. The schema is written there under a fixed file name and
//! the compiler runs with the directory as its working directory, so the
//! schema can be referenced by a relative path.
//!
//! The directory is owned by a [`Workspace`] value: [`Workspace::dispose`]
//! removes it and reports failures, and dropping the value without disposing
//! removes it on a best-effort basis. Either way a created workspace never
//! outlives the scope that created it.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use crate::error::{CompilerError, CompilerResult};

/// File name of the schema inside every workspace.
pub const SCHEMA_FILE_NAME: &str = "MessageDefinition.proto";

const DIR_PREFIX: &str = "protobench-";

/// Returns the default temp root shared by all workspaces of this process.
pub fn default_temp_root() -> PathBuf {
    std::env::temp_dir().join("protobench")
}

/// An isolated, disposable directory holding one invocation's schema file.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    schema_path: PathBuf,
}

impl Workspace {
    /// Creates a fresh, uniquely named workspace under `root`.
    ///
    /// `root` is created if it does not exist yet.
    pub fn create(root: &Path) -> CompilerResult<Self> {
        let create_failed = |source| CompilerError::WorkspaceCreateFailed {
            root: root.to_path_buf(),
            source,
        };

        std::fs::create_dir_all(root).map_err(create_failed)?;
        let dir = tempfile::Builder::new()
            .prefix(DIR_PREFIX)
            .tempdir_in(root)
            .map_err(create_failed)?;

        let schema_path = dir.path().join(SCHEMA_FILE_NAME);
        debug!(workspace = %dir.path().display(), "created workspace");

        Ok(Self { dir, schema_path })
    }

    /// Returns the workspace directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Returns the absolute path of the schema file.
    pub fn schema_path(&self) -> &Path {
        &self.schema_path
    }

    /// Returns the schema file name relative to the workspace directory.
    pub fn schema_file_name(&self) -> &'static str {
        SCHEMA_FILE_NAME
    }

    /// Writes the schema text to the workspace's schema file.
    pub fn write_schema(&self, schema: &str) -> CompilerResult<()> {
        std::fs::write(&self.schema_path, schema).map_err(|source| {
            CompilerError::WriteSchemaFailed {
                path: self.schema_path.clone(),
                source,
            }
        })
    }

    /// Recursively deletes the workspace directory.
    pub fn dispose(self) -> CompilerResult<()> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .map_err(|source| CompilerError::WorkspaceCleanupFailed {
                path: path.clone(),
                source,
            })?;
        debug!(workspace = %path.display(), "disposed workspace");
        Ok(())
    }
}
