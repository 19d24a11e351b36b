//! Error types for the compiler backend.

use protobench_spec::BackendError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type for compiler backend operations.
pub type CompilerResult<T> = Result<T, CompilerError>;

/// Broad failure classes of an invocation.
///
/// Problems with the schema or message are not errors at all; they come back
/// as diagnostics inside a successful result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompilerErrorKind {
    /// The per-invocation directory could not be created, written or removed.
    Workspace,
    /// The compiler executable could not be found or started.
    Launch,
    /// The process could not be waited on or one of its streams failed.
    Process,
    /// The process outlived its deadline and was killed.
    Timeout,
    /// The caller cancelled the invocation and the process was killed.
    Cancelled,
}

/// Errors that can occur while invoking the compiler.
#[derive(Debug, Error)]
pub enum CompilerError {
    /// protoc executable not found.
    #[error("protoc executable not found. Ensure protoc is installed and in PATH, or set the PROTOC environment variable")]
    CompilerNotFound,

    /// Failed to spawn the compiler process.
    #[error("Failed to spawn '{}': {source}", .executable.display())]
    SpawnFailed {
        executable: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create the invocation workspace.
    #[error("Failed to create workspace under {}: {source}", .root.display())]
    WorkspaceCreateFailed {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the schema file into the workspace.
    #[error("Failed to write schema file {}: {source}", .path.display())]
    WriteSchemaFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to remove the workspace directory.
    #[error("Failed to remove workspace {}: {source}", .path.display())]
    WorkspaceCleanupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to one of the process streams failed.
    #[error("Failed to exchange data over compiler {stream}: {source}")]
    StreamFailed {
        stream: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Failed to wait for the process.
    #[error("Failed to wait for compiler process: {0}")]
    WaitFailed(#[source] std::io::Error),

    /// Compiler process timed out.
    #[error("protoc process timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// Invocation was cancelled by the caller.
    #[error("protoc invocation was cancelled")]
    Cancelled,
}

impl CompilerError {
    /// Creates a new stream failure error.
    pub fn stream_failed(stream: &'static str, source: std::io::Error) -> Self {
        Self::StreamFailed { stream, source }
    }

    /// Returns the failure class of this error.
    pub fn kind(&self) -> CompilerErrorKind {
        match self {
            CompilerError::CompilerNotFound | CompilerError::SpawnFailed { .. } => {
                CompilerErrorKind::Launch
            }
            CompilerError::WorkspaceCreateFailed { .. }
            | CompilerError::WriteSchemaFailed { .. }
            | CompilerError::WorkspaceCleanupFailed { .. } => CompilerErrorKind::Workspace,
            CompilerError::StreamFailed { .. } | CompilerError::WaitFailed(_) => {
                CompilerErrorKind::Process
            }
            CompilerError::Timeout { .. } => CompilerErrorKind::Timeout,
            CompilerError::Cancelled => CompilerErrorKind::Cancelled,
        }
    }
}

impl BackendError for CompilerError {
    fn code(&self) -> &'static str {
        match self {
            CompilerError::CompilerNotFound => "PROTOC_001",
            CompilerError::SpawnFailed { .. } => "PROTOC_002",
            CompilerError::WorkspaceCreateFailed { .. } => "PROTOC_003",
            CompilerError::WriteSchemaFailed { .. } => "PROTOC_004",
            CompilerError::WorkspaceCleanupFailed { .. } => "PROTOC_005",
            CompilerError::StreamFailed { .. } => "PROTOC_006",
            CompilerError::WaitFailed(_) => "PROTOC_007",
            CompilerError::Timeout { .. } => "PROTOC_008",
            CompilerError::Cancelled => "PROTOC_009",
        }
    }

    fn category(&self) -> &'static str {
        "protoc"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display() {
        let err = CompilerError::CompilerNotFound;
        assert!(err.to_string().contains("protoc executable not found"));

        let err = CompilerError::Timeout {
            timeout: Duration::from_secs(60),
        };
        assert!(err.to_string().contains("60s"));

        let err = CompilerError::SpawnFailed {
            executable: PathBuf::from("/opt/protoc/bin/protoc"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("/opt/protoc/bin/protoc"));
    }

    #[test]
    fn test_error_kinds() {
        let io_err = || io::Error::new(io::ErrorKind::Other, "x");

        assert_eq!(CompilerError::CompilerNotFound.kind(), CompilerErrorKind::Launch);
        assert_eq!(
            CompilerError::WorkspaceCleanupFailed {
                path: PathBuf::from("ws"),
                source: io_err(),
            }
            .kind(),
            CompilerErrorKind::Workspace
        );
        assert_eq!(
            CompilerError::stream_failed("stdout", io_err()).kind(),
            CompilerErrorKind::Process
        );
        assert_eq!(CompilerError::WaitFailed(io_err()).kind(), CompilerErrorKind::Process);
        assert_eq!(CompilerError::Cancelled.kind(), CompilerErrorKind::Cancelled);
    }

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(CompilerError::CompilerNotFound.code(), "PROTOC_001");
        assert_eq!(
            CompilerError::Timeout {
                timeout: Duration::from_millis(10)
            }
            .code(),
            "PROTOC_008"
        );
        assert_eq!(CompilerError::Cancelled.category(), "protoc");
    }
}
