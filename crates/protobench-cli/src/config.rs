//! Configuration layer.
//!
//! Settings come from an optional JSON file and are overridden by
//! command-line flags. The result is resolved once at startup into an
//! [`OrchestratorConfig`] that is handed to the orchestrator; nothing below
//! this layer reads the environment or the settings file.
//!
//! Example `config.json`:
//!
//! ```json
//! {
//!   "protoc_path": "/opt/protobuf/bin/protoc",
//!   "timeout_secs": 30,
//!   "error_format": "msvs"
//! }
//! ```

use anyhow::{Context, Result};
use protobench_compiler::{default_temp_root, find_protoc, OrchestratorConfig, DEFAULT_TIMEOUT_SECS};
use protobench_spec::ErrorFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Persistent settings read from `config.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Path to the protoc executable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protoc_path: Option<PathBuf>,
    /// Directory under which invocation workspaces are created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_root: Option<PathBuf>,
    /// Timeout for one protoc run, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Diagnostic format requested from protoc.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_format: Option<ErrorFormat>,
}

impl Settings {
    /// Returns the default settings file location
    /// (`<config dir>/protobench/config.json`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("protobench").join("config.json"))
    }

    /// Reads settings from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Reads settings from an explicit path, or from the default location.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }
}

/// Values given on the command line, which take precedence over [`Settings`].
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub protoc: Option<PathBuf>,
    pub temp_root: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub error_format: Option<ErrorFormat>,
}

/// Merges settings and overrides into an orchestrator configuration.
///
/// The compiler path is resolved here, once; see
/// [`protobench_compiler::find_protoc`] for the fallback search order.
pub fn resolve(settings: &Settings, overrides: &Overrides) -> Result<OrchestratorConfig> {
    let configured = overrides
        .protoc
        .as_deref()
        .or(settings.protoc_path.as_deref());
    let compiler_path = find_protoc(configured)?;

    Ok(merge(settings, overrides, compiler_path))
}

/// Returns the workspace root: override, then settings, then the default.
pub fn temp_root(settings: &Settings, overrides: &Overrides) -> PathBuf {
    overrides
        .temp_root
        .clone()
        .or_else(|| settings.temp_root.clone())
        .unwrap_or_else(default_temp_root)
}

fn merge(settings: &Settings, overrides: &Overrides, compiler_path: PathBuf) -> OrchestratorConfig {
    let temp_root = temp_root(settings, overrides);
    let timeout_secs = overrides
        .timeout_secs
        .or(settings.timeout_secs)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    let error_format = overrides
        .error_format
        .or(settings.error_format)
        .unwrap_or_default();

    OrchestratorConfig::with_compiler(compiler_path)
        .temp_root(temp_root)
        .timeout(Duration::from_secs(timeout_secs))
        .error_format(error_format)
}
