//! protobench Data Model
//!
//! This crate provides the types shared by every protobench crate: the
//! encode/decode tasks handed to the compiler orchestrator, the results it
//! returns, and a handful of helpers for working with schemas, compiler
//! diagnostics and binary payloads.
//!
//! # Overview
//!
//! protobench delegates the actual encoding and decoding of messages to the
//! external `protoc` executable. The types here describe the boundary of that
//! delegation:
//!
//! - **Tasks** (`EncodeTask`, `DecodeTask`): immutable requests carrying the
//!   schema text, the message payload and the root type name
//! - **Results** (`EncodeResult`, `DecodeResult`): the converted payload plus
//!   whatever the compiler printed on its error stream
//!
//! Compiler-reported problems (an unknown root type, a malformed message) are
//! *data*, not errors: they arrive in a result's diagnostics.
//!
//! # Example
//!
//! ```
//! use protobench_spec::{schema, EncodeTask};
//!
//! let schema = "message Point { required int32 x = 1; required int32 y = 2; }";
//! let root = schema::select_root_type(schema, None).unwrap();
//! assert_eq!(root, "Point");
//!
//! let task = EncodeTask::new(schema, "x: 3 y: 4", root);
//! assert_eq!(task.root_type, "Point");
//! ```
//!
//! # Modules
//!
//! - [`task`]: Encode/decode tasks and results
//! - [`schema`]: Message type discovery and root type selection
//! - [`diagnostics`]: Structured parsing of compiler diagnostics
//! - [`bytes`]: Byte literal rendering and hex parsing
//! - [`error`]: The shared `BackendError` trait and hex parse errors

pub mod bytes;
pub mod diagnostics;
pub mod error;
pub mod schema;
pub mod task;

// Re-export commonly used types at the crate root
pub use bytes::{parse_hex, render_bytes, ByteLiteral};
pub use diagnostics::{parse_diagnostics, Diagnostic, ErrorFormat, Severity};
pub use error::{BackendError, HexError};
pub use schema::{message_types, select_root_type};
pub use task::{DecodeResult, DecodeTask, EncodeResult, EncodeTask};
