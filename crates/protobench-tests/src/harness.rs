//! Test harness utilities for running invocations and checking cleanup.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tempfile::TempDir;

use protobench_compiler::{find_protoc, Orchestrator, OrchestratorConfig};

/// The two-field schema used throughout the end-to-end tests.
pub const POINT_SCHEMA: &str = r#"syntax = "proto2";

message Point {
  required int32 x = 1;
  required int32 y = 2;
}
"#;

/// Shell scripts that stand in for protoc.
///
/// Each runs as `sh -c <script> protoc <mode> <root> <error format> <schema>`,
/// so the generated arguments are `$1..$4`.
pub mod stand_in {
    /// Copies stdin to stdout.
    pub const ECHO: &str = "cat";

    /// Ignores stdin and emits the wire bytes of `Point { x: 3, y: 4 }`.
    pub const POINT_ENCODER: &str = r"cat > /dev/null; printf '\010\003\020\004'";

    /// Dumps stdin as hex text, one byte per group.
    pub const HEX_DUMP: &str = "od -An -v -tx1";

    /// Rejects every root type except `Point`, the way protoc does.
    pub const POINT_ONLY: &str = r#"if [ "$2" != Point ]; then echo "Type not defined: $2" 1>&2; exit 1; fi; cat"#;

    /// Reports its working directory on stderr and echoes stdin.
    pub const REPORT_CWD: &str = "pwd 1>&2; cat";

    /// Prints its arguments, one per line, and the schema it was handed.
    pub const REPORT_ARGS: &str = r#"cat > /dev/null; for a in "$@"; do echo "$a"; done; cat "$4" 1>&2"#;

    /// Floods stderr past any pipe buffer before echoing stdin.
    pub const STDERR_FLOOD: &str = r"head -c 1048576 /dev/zero | tr '\000' w 1>&2; cat";

    /// Never finishes on its own.
    pub const HANG: &str = "exec sleep 30";
}

/// A test harness owning a private workspace root.
pub struct TestHarness {
    /// Scratch directory for test inputs and workspaces.
    pub work_dir: TempDir,
}

impl TestHarness {
    /// Create a new test harness.
    pub fn new() -> Self {
        Self {
            work_dir: TempDir::new().expect("Failed to create work dir"),
        }
    }

    /// Get the working directory path.
    pub fn path(&self) -> &Path {
        self.work_dir.path()
    }

    /// Directory under which the orchestrator creates workspaces.
    pub fn temp_root(&self) -> PathBuf {
        self.path().join("workspaces")
    }

    /// Orchestrator configuration for a stand-in script.
    pub fn stand_in_config(&self, script: &str) -> OrchestratorConfig {
        OrchestratorConfig::with_compiler("sh")
            .prefix_arg("-c")
            .prefix_arg(script)
            .prefix_arg("protoc")
            .temp_root(self.temp_root())
            .timeout(Duration::from_secs(60))
    }

    /// Orchestrator running a stand-in script.
    pub fn stand_in(&self, script: &str) -> Orchestrator {
        Orchestrator::with_config(self.stand_in_config(script))
    }

    /// Orchestrator running the real protoc.
    pub fn protoc(&self) -> Orchestrator {
        let path = find_protoc(None).expect("protoc not found");
        Orchestrator::with_config(
            OrchestratorConfig::with_compiler(path).temp_root(self.temp_root()),
        )
    }

    /// Lists whatever is left under the workspace root.
    pub fn leftover_workspaces(&self) -> Vec<PathBuf> {
        match fs::read_dir(self.temp_root()) {
            Ok(entries) => entries.filter_map(|e| e.ok().map(|e| e.path())).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Assert that every workspace was removed.
    pub fn assert_no_leftover_workspaces(&self) {
        let leftovers = self.leftover_workspaces();
        assert!(
            leftovers.is_empty(),
            "Workspaces were not cleaned up: {:?}",
            leftovers
        );
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if protoc is available in the environment.
pub fn is_protoc_available() -> bool {
    let Ok(path) = find_protoc(None) else {
        return false;
    };
    Command::new(path)
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Check if protoc tests should run based on environment variable.
pub fn should_run_protoc_tests() -> bool {
    std::env::var("PROTOBENCH_RUN_PROTOC_TESTS")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
