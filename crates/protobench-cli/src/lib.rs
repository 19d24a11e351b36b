//! protobench CLI library.
//!
//! This crate provides the command-line front end for the protobench
//! compiler backend: settings resolution, input loading, logging, and the
//! `encode`, `decode`, `types`, and `doctor` commands.

pub mod commands;
pub mod config;
pub mod input;
pub mod logging;
