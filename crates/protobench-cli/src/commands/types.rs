//! Types command implementation
//!
//! Lists the message types a schema declares. Runs without protoc.

use anyhow::Result;
use colored::Colorize;
use protobench_spec::{message_types, select_root_type};
use std::path::Path;
use std::process::ExitCode;

use super::json_output::{print_json, JsonError, TypesOutput};
use crate::input;

/// Run the types command
///
/// # Returns
/// Exit code: 0 if the schema declares at least one message, 1 otherwise
pub fn run(schema_path: &Path, json_output: bool) -> Result<ExitCode> {
    let output = collect(schema_path);

    if json_output {
        print_json(&output)?;
    } else {
        if let Some(error) = output.errors.first() {
            anyhow::bail!("{}", error.message);
        }
        if output.types.is_empty() {
            println!(
                "{} no message types declared in {}",
                "!!".yellow(),
                schema_path.display()
            );
        }
        for name in &output.types {
            if output.default_root.as_deref() == Some(name.as_str()) {
                println!("{} {}", name.bold(), "(default root)".dimmed());
            } else {
                println!("{}", name);
            }
        }
    }

    Ok(if output.errors.is_empty() && !output.types.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn collect(schema_path: &Path) -> TypesOutput {
    let mut output = TypesOutput {
        schema: schema_path.display().to_string(),
        types: Vec::new(),
        default_root: None,
        errors: Vec::new(),
    };

    match input::read_schema(schema_path) {
        Ok(schema) => {
            output.types = message_types(&schema);
            output.default_root = select_root_type(&schema, None);
        }
        Err(e) => output.errors.push(JsonError::from(&e)),
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_collect_types() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("shapes.proto");
        std::fs::write(
            &path,
            "message Point { int32 x = 1; }\nmessage Polygon { repeated Point points = 1; }\n",
        )
        .unwrap();

        let output = collect(&path);
        assert_eq!(output.types, vec!["Point", "Polygon"]);
        assert_eq!(output.default_root.as_deref(), Some("Polygon"));
        assert!(output.errors.is_empty());
        assert_eq!(run(&path, true).unwrap(), ExitCode::SUCCESS);
    }

    #[test]
    fn test_missing_schema() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("missing.proto");

        let output = collect(&path);
        assert_eq!(output.errors.len(), 1);
        assert_eq!(run(&path, true).unwrap(), ExitCode::from(1));
        assert!(run(&path, false).is_err());
    }

    #[test]
    fn test_schema_without_messages() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("enum.proto");
        std::fs::write(&path, "enum Color { RED = 0; }").unwrap();

        assert_eq!(run(&path, false).unwrap(), ExitCode::from(1));
    }
}
