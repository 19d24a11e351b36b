//! Encode command implementation
//!
//! Converts a text-format message into its wire form.

use anyhow::{Context, Result};
use colored::Colorize;
use protobench_compiler::Orchestrator;
use protobench_spec::{render_bytes, ByteLiteral, EncodeTask};
use std::path::Path;
use std::process::ExitCode;

use super::json_output::{error_codes, print_json, EncodeOutput, JsonError};
use super::reporting::print_diagnostics;
use crate::input;

/// Arguments of the encode command.
#[derive(Debug, Clone)]
pub struct EncodeArgs<'a> {
    /// Schema file
    pub schema: &'a Path,
    /// Root message type (defaults to the last declared message)
    pub root: Option<&'a str>,
    /// Text message file (stdin when `None` or `-`)
    pub message: Option<&'a Path>,
    /// File to write the raw wire bytes to
    pub output: Option<&'a Path>,
    /// Literal style for bytes printed to stdout
    pub format: ByteLiteral,
}

/// Run the encode command
///
/// # Arguments
/// * `orchestrator` - Configured compiler orchestrator
/// * `args` - Command arguments
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 on success, 1 if the compiler rejected the input
pub fn run(orchestrator: &Orchestrator, args: &EncodeArgs<'_>, json_output: bool) -> Result<ExitCode> {
    if json_output {
        return run_json(orchestrator, args);
    }

    let schema = input::read_schema(args.schema)?;
    let root_type = input::resolve_root_type(args.schema, &schema, args.root)?;
    let message_text = input::read_message_text(args.message)?;

    let task = EncodeTask::new(schema, message_text, root_type.as_str());
    let result = orchestrator.encode(&task)?;

    print_diagnostics(&result.diagnostics());
    if result.is_failure() {
        eprintln!(
            "{} {} could not be encoded",
            "FAILED".red().bold(),
            root_type
        );
        return Ok(ExitCode::from(1));
    }

    match args.output {
        Some(path) => {
            std::fs::write(path, &result.encoded)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            eprintln!(
                "{} {} bytes of {} written to {}",
                "ok".green(),
                result.encoded.len(),
                root_type,
                path.display()
            );
        }
        None => println!("{}", render_bytes(&result.encoded, args.format)),
    }

    Ok(ExitCode::SUCCESS)
}

fn run_json(orchestrator: &Orchestrator, args: &EncodeArgs<'_>) -> Result<ExitCode> {
    let output = encode_json(orchestrator, args).unwrap_or_else(EncodeOutput::failure);
    print_json(&output)?;

    Ok(if output.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn encode_json(orchestrator: &Orchestrator, args: &EncodeArgs<'_>) -> Result<EncodeOutput, JsonError> {
    let schema = input::read_schema(args.schema).map_err(|e| JsonError::from(&e))?;
    let root_type =
        input::resolve_root_type(args.schema, &schema, args.root).map_err(|e| JsonError::from(&e))?;
    let message_text = input::read_message_text(args.message).map_err(|e| JsonError::from(&e))?;

    let task = EncodeTask::new(schema, message_text, root_type.as_str());
    let result = orchestrator.encode(&task).map_err(|e| JsonError::from(&e))?;
    let success = !result.is_failure();

    let output_file = match args.output {
        Some(path) if success => {
            std::fs::write(path, &result.encoded).map_err(|e| {
                JsonError::new(
                    error_codes::FILE_WRITE,
                    format!("Failed to write output file '{}': {}", path.display(), e),
                )
            })?;
            Some(path.display().to_string())
        }
        _ => None,
    };

    Ok(EncodeOutput {
        success,
        root_type: Some(root_type),
        encoded_hex: success.then(|| render_bytes(&result.encoded, ByteLiteral::Hex)),
        size: result.encoded.len(),
        output_file,
        diagnostics: result.diagnostics(),
        raw_diagnostics: result.diagnostics,
        errors: Vec::new(),
    })
}
