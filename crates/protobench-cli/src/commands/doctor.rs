//! Doctor command implementation
//!
//! Checks the protoc installation and the workspace directory.

use anyhow::Result;
use colored::Colorize;
use protobench_compiler::{find_protoc, Workspace};
use std::path::Path;
use std::process::{Command, ExitCode};

use crate::config::{self, Overrides, Settings};

/// Run the doctor command
///
/// Checks:
/// - Version information and settings file
/// - protoc installation
/// - Workspace directory permissions
///
/// # Returns
/// Exit code: 0 if all checks pass, 1 if any fail
pub fn run(settings: &Settings, overrides: &Overrides, config_path: Option<&Path>) -> Result<ExitCode> {
    println!("{}", "protobench Doctor".cyan().bold());
    println!("{}", "=================".cyan());
    println!();

    let mut all_ok = true;

    // Check 1: versions and settings
    println!("{}", "Versions:".bold());
    println!(
        "  {} protobench-cli v{}",
        "->".green(),
        env!("CARGO_PKG_VERSION")
    );
    match config_path
        .map(Path::to_path_buf)
        .or_else(Settings::default_path)
    {
        Some(path) if path.exists() => {
            println!("  {} settings: {}", "->".green(), path.display());
        }
        Some(path) => {
            println!(
                "  {} settings: {} {}",
                "->".green(),
                path.display(),
                "(not present, using defaults)".dimmed()
            );
        }
        None => println!("  {} settings: defaults", "->".green()),
    }

    println!();

    // Check 2: protoc
    println!("{}", "Dependencies:".bold());
    let configured = overrides
        .protoc
        .as_deref()
        .or(settings.protoc_path.as_deref());
    match find_protoc(configured) {
        Ok(path) => match check_protoc(&path) {
            ProtocStatus::Found(version) => {
                println!("  {} protoc {} ({})", "ok".green(), version, path.display());
            }
            ProtocStatus::Error(e) => {
                println!("  {} protoc at {} failed: {}", "!!".red(), path.display(), e);
                all_ok = false;
            }
        },
        Err(e) => {
            println!("  {} {}", "!!".red(), e);
            println!(
                "     {}",
                "protoc is required for encode and decode.".dimmed()
            );
            println!(
                "     {}",
                "Install from https://github.com/protocolbuffers/protobuf/releases".dimmed()
            );
            all_ok = false;
        }
    }

    println!();

    // Check 3: workspace root permissions
    println!("{}", "Permissions:".bold());
    let temp_root = config::temp_root(settings, overrides);
    match check_workspace(&temp_root) {
        Ok(()) => println!(
            "  {} Workspace root is writable ({})",
            "ok".green(),
            temp_root.display()
        ),
        Err(e) => {
            println!("  {} Cannot use workspace root: {}", "!!".red(), e);
            all_ok = false;
        }
    }

    println!();

    // Summary
    if all_ok {
        println!("{} All checks passed!", "SUCCESS".green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "{} Some checks failed. See above for details.",
            "WARNING".yellow().bold()
        );
        Ok(ExitCode::from(1))
    }
}

/// Status of the protoc version check
enum ProtocStatus {
    Found(String),
    Error(String),
}

fn parse_protoc_version(output: &str) -> Option<String> {
    // Parse "libprotoc 3.21.12"
    output
        .lines()
        .next()
        .and_then(|line| line.strip_prefix("libprotoc "))
        .map(|v| v.trim().to_string())
}

/// Runs `protoc --version` and extracts the version
fn check_protoc(path: &Path) -> ProtocStatus {
    match Command::new(path).arg("--version").output() {
        Ok(output) => {
            if output.status.success() {
                let stdout = String::from_utf8_lossy(&output.stdout);
                let version =
                    parse_protoc_version(&stdout).unwrap_or_else(|| "unknown".to_string());
                ProtocStatus::Found(version)
            } else {
                ProtocStatus::Error(format!("protoc exited with status: {}", output.status))
            }
        }
        Err(e) => ProtocStatus::Error(e.to_string()),
    }
}

/// Creates, writes and removes one workspace under `root`
fn check_workspace(root: &Path) -> Result<()> {
    let workspace = Workspace::create(root)?;
    let written = workspace.write_schema("message DoctorCheck {}\n");
    workspace.dispose()?;
    written?;
    Ok(())
}
