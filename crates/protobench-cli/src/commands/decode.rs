//! Decode command implementation
//!
//! Converts a wire-form message back into text format.

use anyhow::{Context, Result};
use colored::Colorize;
use protobench_compiler::Orchestrator;
use protobench_spec::DecodeTask;
use std::path::Path;
use std::process::ExitCode;

use super::json_output::{error_codes, print_json, DecodeOutput, JsonError};
use super::reporting::print_diagnostics;
use crate::input;

/// Arguments of the decode command.
#[derive(Debug, Clone)]
pub struct DecodeArgs<'a> {
    /// Schema file
    pub schema: &'a Path,
    /// Root message type (defaults to the last declared message)
    pub root: Option<&'a str>,
    /// Binary message file (stdin when `None` or `-`)
    pub input: Option<&'a Path>,
    /// Binary message given as hex text; wins over `input`
    pub hex: Option<&'a str>,
    /// File to write the decoded text to
    pub output: Option<&'a Path>,
}

/// Run the decode command
///
/// # Returns
/// Exit code: 0 on success, 1 if the compiler rejected the input
pub fn run(orchestrator: &Orchestrator, args: &DecodeArgs<'_>, json_output: bool) -> Result<ExitCode> {
    if json_output {
        return run_json(orchestrator, args);
    }

    let schema = input::read_schema(args.schema)?;
    let root_type = input::resolve_root_type(args.schema, &schema, args.root)?;
    let binary = input::read_message_binary(args.input, args.hex)?;

    let task = DecodeTask::new(schema, binary, root_type.as_str());
    let result = orchestrator.decode(&task)?;

    print_diagnostics(&result.diagnostics());
    if result.is_failure() {
        eprintln!(
            "{} {} could not be decoded",
            "FAILED".red().bold(),
            root_type
        );
        return Ok(ExitCode::from(1));
    }

    match args.output {
        Some(path) => {
            std::fs::write(path, &result.decoded)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            eprintln!(
                "{} {} decoded to {}",
                "ok".green(),
                root_type,
                path.display()
            );
        }
        None => print!("{}", result.decoded),
    }

    Ok(ExitCode::SUCCESS)
}

fn run_json(orchestrator: &Orchestrator, args: &DecodeArgs<'_>) -> Result<ExitCode> {
    let output = decode_json(orchestrator, args).unwrap_or_else(DecodeOutput::failure);
    print_json(&output)?;

    Ok(if output.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn decode_json(orchestrator: &Orchestrator, args: &DecodeArgs<'_>) -> Result<DecodeOutput, JsonError> {
    let schema = input::read_schema(args.schema).map_err(|e| JsonError::from(&e))?;
    let root_type =
        input::resolve_root_type(args.schema, &schema, args.root).map_err(|e| JsonError::from(&e))?;
    let binary =
        input::read_message_binary(args.input, args.hex).map_err(|e| JsonError::from(&e))?;

    let task = DecodeTask::new(schema, binary, root_type.as_str());
    let result = orchestrator.decode(&task).map_err(|e| JsonError::from(&e))?;
    let success = !result.is_failure();

    let output_file = match args.output {
        Some(path) if success => {
            std::fs::write(path, &result.decoded).map_err(|e| {
                JsonError::new(
                    error_codes::FILE_WRITE,
                    format!("Failed to write output file '{}': {}", path.display(), e),
                )
            })?;
            Some(path.display().to_string())
        }
        _ => None,
    };

    Ok(DecodeOutput {
        success,
        root_type: Some(root_type),
        decoded: (success && output_file.is_none()).then(|| result.decoded.clone()),
        output_file,
        diagnostics: result.diagnostics(),
        raw_diagnostics: result.diagnostics,
        errors: Vec::new(),
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::commands::test_support::{scripted, write_file};
    use pretty_assertions::assert_eq;

    const SCHEMA: &str = "message Point { required int32 x = 1; required int32 y = 2; }";

    fn hex_args<'a>(schema: &'a Path, hex: &'a str) -> DecodeArgs<'a> {
        DecodeArgs {
            schema,
            root: None,
            input: None,
            hex: Some(hex),
            output: None,
        }
    }

    #[test]
    fn test_decode_hex_to_output_file() {
        let tmp = tempfile::tempdir().unwrap();
        let schema = write_file(tmp.path(), "point.proto", SCHEMA.as_bytes());
        let out = tmp.path().join("point.txt");
        // Echo the payload back as hex so the test sees exactly what was sent.
        let orchestrator = scripted(
            r#"[ "$1" = --decode ] || exit 2; od -An -tx1 | tr -s ' \n' ' '"#,
            &tmp.path().join("work"),
        );

        let mut decode_args = hex_args(&schema, "08 03 10 04");
        decode_args.output = Some(&out);
        let code = run(&orchestrator, &decode_args, false).unwrap();

        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(std::fs::read_to_string(&out).unwrap().trim(), "08 03 10 04");
    }

    #[test]
    fn test_decode_binary_file_input() {
        let tmp = tempfile::tempdir().unwrap();
        let schema = write_file(tmp.path(), "point.proto", SCHEMA.as_bytes());
        let binary = write_file(tmp.path(), "point.bin", &[0x08, 0x03, 0x10, 0x04]);
        let orchestrator = scripted(
            "od -An -tx1 | tr -s ' \\n' ' '",
            &tmp.path().join("work"),
        );

        let args = DecodeArgs {
            schema: &schema,
            root: Some("Point"),
            input: Some(&binary),
            hex: None,
            output: None,
        };
        let output = decode_json(&orchestrator, &args).unwrap();

        assert!(output.success);
        assert_eq!(output.decoded.unwrap().trim(), "08 03 10 04");
    }

    #[test]
    fn test_decode_failure_reports_diagnostics() {
        let tmp = tempfile::tempdir().unwrap();
        let schema = write_file(tmp.path(), "point.proto", SCHEMA.as_bytes());
        let orchestrator = scripted(
            "cat > /dev/null; echo 'Failed to parse input.' 1>&2; exit 1",
            &tmp.path().join("work"),
        );

        let output = decode_json(&orchestrator, &hex_args(&schema, "ff ff")).unwrap();
        assert!(!output.success);
        assert_eq!(output.decoded, None);
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.raw_diagnostics.trim(), "Failed to parse input.");

        let code = run(&orchestrator, &hex_args(&schema, "ff ff"), false).unwrap();
        assert_eq!(code, ExitCode::from(1));
    }

    #[test]
    fn test_decode_invalid_hex() {
        let tmp = tempfile::tempdir().unwrap();
        let schema = write_file(tmp.path(), "point.proto", SCHEMA.as_bytes());
        let orchestrator = scripted("cat", &tmp.path().join("work"));

        let err = decode_json(&orchestrator, &hex_args(&schema, "0g")).unwrap_err();
        assert_eq!(err.code, error_codes::INVALID_HEX);
    }
}
