//! CLI command implementations

pub mod decode;
pub mod doctor;
pub mod encode;
pub mod json_output;
pub mod types;

mod reporting;
