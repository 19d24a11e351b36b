//! protobench End-to-End Test Infrastructure
//!
//! This crate exercises the full invocation path (workspace, process,
//! stream exchange, cleanup) against two kinds of compiler:
//!
//! - **Stand-ins**: small `sh` scripts that play protoc's part, so the
//!   lifecycle, isolation and deadlock properties can be checked anywhere
//! - **Real protoc**: end-to-end encode/decode of actual schemas
//!
//! ## Running Tests
//!
//! ```bash
//! # Run stand-in tests (no protoc required)
//! cargo test -p protobench-tests
//!
//! # Run real protoc tests
//! PROTOBENCH_RUN_PROTOC_TESTS=1 cargo test -p protobench-tests --ignored
//! ```

pub mod harness;

// Re-export commonly used items
pub use harness::{
    is_protoc_available, should_run_protoc_tests, stand_in, TestHarness, POINT_SCHEMA,
};
