//! protobench Compiler Backend
//!
//! This crate converts messages between their text and wire forms by running
//! `protoc --encode` / `protoc --decode` as a subprocess.
//!
//! # Architecture
//!
//! Each call is isolated and self-cleaning:
//!
//! 1. **Workspace** - a uniquely named temp directory holds the schema file
//! 2. **Process** - protoc runs with the workspace as working directory
//! 3. **Exchange** - the payload goes in on stdin while stdout and stderr are
//!    drained concurrently, under a deadline and an optional cancel token
//! 4. **Orchestrator** - composes the above and always removes the workspace
//!
//! Problems with the schema or the message are not errors: protoc reports
//! them on stderr and they come back as the result's diagnostics. Only
//! infrastructure failures (workspace, launch, process, timeout,
//! cancellation) are returned as [`CompilerError`].
//!
//! # Example
//!
//! ```ignore
//! use protobench_compiler::{Orchestrator, OrchestratorConfig};
//! use protobench_spec::EncodeTask;
//!
//! let orchestrator = Orchestrator::with_config(OrchestratorConfig::with_compiler("/usr/bin/protoc"));
//! let schema = "message Point { required int32 x = 1; required int32 y = 2; }";
//! let result = orchestrator.encode(&EncodeTask::new(schema, "x: 3 y: 4", "Point"))?;
//!
//! assert_eq!(result.encoded, vec![0x08, 0x03, 0x10, 0x04]);
//! ```
//!
//! # protoc Requirements
//!
//! The orchestrator is given an explicit compiler path. [`locate::find_protoc`]
//! resolves one from:
//!
//! 1. An explicitly configured path
//! 2. `PROTOC` environment variable
//! 3. System PATH
//! 4. Common installation locations (platform-specific)
//!
//! # Crate Structure
//!
//! - [`orchestrator`] - Encode/decode entry points
//! - [`workspace`] - Per-invocation temp directories
//! - [`process`] - protoc subprocess handle
//! - [`exchange`] - Concurrent stream exchange, timeouts and cancellation
//! - [`locate`] - protoc discovery
//! - [`error`] - Error types

pub mod error;
pub mod exchange;
pub mod locate;
pub mod orchestrator;
pub mod process;
pub mod workspace;

// Re-export main types at crate root
pub use error::{CompilerError, CompilerErrorKind, CompilerResult};
pub use exchange::{CancelToken, ExchangeOutput, StreamExchange};
pub use locate::find_protoc;
pub use orchestrator::{CompileMode, Orchestrator, OrchestratorConfig, DEFAULT_TIMEOUT_SECS};
pub use process::CompilerProcess;
pub use workspace::{default_temp_root, Workspace, SCHEMA_FILE_NAME};

/// Encodes a message with a default-configured orchestrator using `compiler_path`.
///
/// Convenience for one-off calls; long-lived callers should keep an
/// [`Orchestrator`] instead.
pub fn encode(
    compiler_path: impl Into<std::path::PathBuf>,
    task: &protobench_spec::EncodeTask,
) -> CompilerResult<protobench_spec::EncodeResult> {
    Orchestrator::with_config(OrchestratorConfig::with_compiler(compiler_path)).encode(task)
}

/// Decodes a message with a default-configured orchestrator using `compiler_path`.
pub fn decode(
    compiler_path: impl Into<std::path::PathBuf>,
    task: &protobench_spec::DecodeTask,
) -> CompilerResult<protobench_spec::DecodeResult> {
    Orchestrator::with_config(OrchestratorConfig::with_compiler(compiler_path)).decode(task)
}
