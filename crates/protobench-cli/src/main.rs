//! protobench CLI - Encode and decode protocol buffer messages with protoc
//!
//! This binary wraps `protoc --encode` / `protoc --decode` so that a schema
//! file and a message can be converted in either direction from the shell.

use clap::{Args, Parser, Subcommand};
use protobench_compiler::Orchestrator;
use protobench_spec::{ByteLiteral, ErrorFormat};
use std::path::PathBuf;
use std::process::ExitCode;

// Use modules from the library crate
use protobench_cli::commands;
use protobench_cli::config::{self, Overrides, Settings};
use protobench_cli::logging;

/// protobench - protocol buffer message workbench
#[derive(Parser)]
#[command(name = "protobench")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Path to the protoc executable
    #[arg(long, global = true, env = "PROTOBENCH_PROTOC")]
    protoc: Option<PathBuf>,

    /// Settings file (default: <config dir>/protobench/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory under which per-call workspaces are created
    #[arg(long, global = true)]
    temp_root: Option<PathBuf>,

    /// Kill protoc after this many seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Diagnostic format requested from protoc (msvs, gcc)
    #[arg(long, global = true)]
    error_format: Option<ErrorFormat>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a text-format message into its binary wire form
    Encode {
        /// Path to the .proto schema file
        #[arg(short, long)]
        schema: PathBuf,

        /// Root message type (default: last message declared in the schema)
        #[arg(short, long)]
        root: Option<String>,

        /// Text-format message file (default: stdin)
        #[arg(short, long)]
        message: Option<PathBuf>,

        /// Write raw bytes to this file instead of printing them
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Literal style for printed bytes (hex, csharp, rust)
        #[arg(long, default_value = "hex")]
        format: ByteLiteral,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Decode a binary wire-form message into text format
    Decode {
        /// Path to the .proto schema file
        #[arg(short, long)]
        schema: PathBuf,

        /// Root message type (default: last message declared in the schema)
        #[arg(short, long)]
        root: Option<String>,

        /// Binary message file (default: stdin)
        #[arg(short, long, conflicts_with = "hex")]
        input: Option<PathBuf>,

        /// Binary message as hex text, e.g. "08 03 10 04"
        #[arg(long)]
        hex: Option<String>,

        /// Write decoded text to this file instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// List the message types declared in a schema
    Types {
        /// Path to the .proto schema file
        #[arg(short, long)]
        schema: PathBuf,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Check protoc installation and workspace permissions
    Doctor,
}

impl GlobalArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            protoc: self.protoc.clone(),
            temp_root: self.temp_root.clone(),
            timeout_secs: self.timeout_secs,
            error_format: self.error_format,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.global.verbose);

    let result = run(cli);

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let settings = Settings::load_or_default(cli.global.config.as_deref())?;
    let overrides = cli.global.overrides();
    let orchestrator =
        || config::resolve(&settings, &overrides).map(Orchestrator::with_config);

    match cli.command {
        Commands::Encode {
            schema,
            root,
            message,
            output,
            format,
            json,
        } => commands::encode::run(
            &orchestrator()?,
            &commands::encode::EncodeArgs {
                schema: &schema,
                root: root.as_deref(),
                message: message.as_deref(),
                output: output.as_deref(),
                format,
            },
            json,
        ),
        Commands::Decode {
            schema,
            root,
            input,
            hex,
            output,
            json,
        } => commands::decode::run(
            &orchestrator()?,
            &commands::decode::DecodeArgs {
                schema: &schema,
                root: root.as_deref(),
                input: input.as_deref(),
                hex: hex.as_deref(),
                output: output.as_deref(),
            },
            json,
        ),
        Commands::Types { schema, json } => commands::types::run(&schema, json),
        Commands::Doctor => {
            commands::doctor::run(&settings, &overrides, cli.global.config.as_deref())
        }
    }
}
