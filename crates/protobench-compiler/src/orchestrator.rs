//! protoc invocation orchestrator.
//!
//! This module composes the workspace, process and exchange layers into the
//! two public operations, [`Orchestrator::encode`] and
//! [`Orchestrator::decode`]. Every call runs the same linear sequence:
//!
//! 1. Create a workspace and write the schema into it
//! 2. Launch protoc with the workspace as working directory
//! 3. Exchange the payload over the standard streams
//! 4. Dispose the workspace, on success and on every failure path
//!
//! Nothing is shared between calls, so one orchestrator can serve any number
//! of concurrent invocations.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use protobench_spec::{DecodeResult, DecodeTask, EncodeResult, EncodeTask, ErrorFormat};
use tracing::{debug, warn};

use crate::error::CompilerResult;
use crate::exchange::{CancelToken, ExchangeOutput, StreamExchange};
use crate::process::CompilerProcess;
use crate::workspace::{default_temp_root, Workspace};

/// Default timeout for protoc execution (1 minute).
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Conversion direction requested from protoc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileMode {
    /// Text format in, wire format out.
    Encode,
    /// Wire format in, text format out.
    Decode,
}

impl CompileMode {
    /// Returns the string identifier for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompileMode::Encode => "encode",
            CompileMode::Decode => "decode",
        }
    }

    /// Returns the protoc flag selecting this mode.
    pub fn flag(&self) -> &'static str {
        match self {
            CompileMode::Encode => "--encode",
            CompileMode::Decode => "--decode",
        }
    }
}

/// Configuration for the protoc orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Path to the protoc executable.
    pub compiler_path: PathBuf,
    /// Arguments placed before the generated ones, for wrapper launchers.
    pub prefix_args: Vec<OsString>,
    /// Directory under which per-invocation workspaces are created.
    pub temp_root: PathBuf,
    /// Timeout for a single protoc execution.
    pub timeout: Duration,
    /// Diagnostic format requested from protoc.
    pub error_format: ErrorFormat,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            compiler_path: PathBuf::from("protoc"),
            prefix_args: Vec::new(),
            temp_root: default_temp_root(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            error_format: ErrorFormat::default(),
        }
    }
}

impl OrchestratorConfig {
    /// Creates a new config with the given compiler path.
    pub fn with_compiler(compiler_path: impl Into<PathBuf>) -> Self {
        Self {
            compiler_path: compiler_path.into(),
            ..Default::default()
        }
    }

    /// Appends an argument placed before the generated protoc arguments.
    pub fn prefix_arg(mut self, arg: impl Into<OsString>) -> Self {
        self.prefix_args.push(arg.into());
        self
    }

    /// Sets the workspace temp root.
    pub fn temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = root.into();
        self
    }

    /// Sets the timeout duration.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Sets the diagnostic format.
    pub fn error_format(mut self, format: ErrorFormat) -> Self {
        self.error_format = format;
        self
    }
}

/// The protoc subprocess orchestrator.
#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Creates a new orchestrator with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new orchestrator with the given configuration.
    pub fn with_config(config: OrchestratorConfig) -> Self {
        Self { config }
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Builds the protoc argument list for one invocation.
    ///
    /// `[prefix args…] <mode flag> <root type> <error format flag> <schema file>`,
    /// where the schema file is relative to the workspace.
    pub fn build_args(&self, mode: CompileMode, root_type: &str) -> Vec<OsString> {
        let mut args = self.config.prefix_args.clone();
        args.push(mode.flag().into());
        args.push(root_type.into());
        args.push(self.config.error_format.flag().into());
        args.push(crate::workspace::SCHEMA_FILE_NAME.into());
        args
    }

    /// Encodes a textual message into its wire form.
    ///
    /// Schema or message problems are reported in the result's diagnostics;
    /// only infrastructure failures are returned as errors.
    pub fn encode(&self, task: &EncodeTask) -> CompilerResult<EncodeResult> {
        self.encode_with_cancel(task, &CancelToken::new())
    }

    /// Like [`Orchestrator::encode`], abandoning the call once `cancel` is set.
    pub fn encode_with_cancel(
        &self,
        task: &EncodeTask,
        cancel: &CancelToken,
    ) -> CompilerResult<EncodeResult> {
        let exchanged = self.invoke(
            CompileMode::Encode,
            &task.schema,
            &task.root_type,
            task.message_text.as_bytes().to_vec(),
            cancel,
        )?;

        Ok(EncodeResult {
            diagnostics: exchanged.error_text(),
            encoded: exchanged.output,
        })
    }

    /// Decodes a wire-form message into text.
    pub fn decode(&self, task: &DecodeTask) -> CompilerResult<DecodeResult> {
        self.decode_with_cancel(task, &CancelToken::new())
    }

    /// Like [`Orchestrator::decode`], abandoning the call once `cancel` is set.
    pub fn decode_with_cancel(
        &self,
        task: &DecodeTask,
        cancel: &CancelToken,
    ) -> CompilerResult<DecodeResult> {
        let exchanged = self.invoke(
            CompileMode::Decode,
            &task.schema,
            &task.root_type,
            task.message_binary.clone(),
            cancel,
        )?;

        Ok(DecodeResult {
            decoded: exchanged.output_text(),
            diagnostics: exchanged.error_text(),
        })
    }

    fn invoke(
        &self,
        mode: CompileMode,
        schema: &str,
        root_type: &str,
        input: Vec<u8>,
        cancel: &CancelToken,
    ) -> CompilerResult<ExchangeOutput> {
        let workspace = Workspace::create(&self.config.temp_root)?;
        debug!(
            mode = mode.as_str(),
            root_type,
            workspace = %workspace.path().display(),
            input_bytes = input.len(),
            "invoking protoc"
        );

        let outcome = self.run_in(&workspace, mode, schema, root_type, input, cancel);

        match outcome {
            Ok(exchanged) => {
                workspace.dispose()?;
                Ok(exchanged)
            }
            Err(err) => {
                // The invocation error is what the caller needs to see.
                if let Err(cleanup) = workspace.dispose() {
                    warn!(error = %cleanup, "workspace cleanup failed after {}", err);
                }
                Err(err)
            }
        }
    }

    fn run_in(
        &self,
        workspace: &Workspace,
        mode: CompileMode,
        schema: &str,
        root_type: &str,
        input: Vec<u8>,
        cancel: &CancelToken,
    ) -> CompilerResult<ExchangeOutput> {
        workspace.write_schema(schema)?;

        let args = self.build_args(mode, root_type);
        let mut process =
            CompilerProcess::launch(&self.config.compiler_path, workspace.path(), &args)?;

        StreamExchange::new(self.config.timeout)
            .with_cancel(cancel.clone())
            .run(&mut process, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CompilerError, CompilerErrorKind};
    use pretty_assertions::assert_eq;
    use std::path::Path;

    const POINT: &str = "message Point { required int32 x = 1; required int32 y = 2; }";

    fn is_empty_dir(path: &Path) -> bool {
        std::fs::read_dir(path).unwrap().next().is_none()
    }

    /// Orchestrator whose "compiler" is an inline shell script.
    ///
    /// With `sh -c <script> protoc <args…>` the generated arguments land in
    /// `$1..$4`, as they would for a real protoc.
    #[cfg(unix)]
    fn scripted(script: &str, temp_root: &Path) -> Orchestrator {
        Orchestrator::with_config(
            OrchestratorConfig::with_compiler("sh")
                .prefix_arg("-c")
                .prefix_arg(script)
                .prefix_arg("protoc")
                .temp_root(temp_root)
                .timeout_secs(30),
        )
    }

    #[test]
    fn test_compile_mode_flags() {
        assert_eq!(CompileMode::Encode.flag(), "--encode");
        assert_eq!(CompileMode::Decode.flag(), "--decode");
        assert_eq!(CompileMode::Encode.as_str(), "encode");
        assert_eq!(CompileMode::Decode.as_str(), "decode");
    }

    #[test]
    fn test_config_builder() {
        let config = OrchestratorConfig::with_compiler("/usr/bin/protoc")
            .temp_root("/tmp/pb")
            .timeout_secs(5)
            .error_format(ErrorFormat::Gcc);

        assert_eq!(config.compiler_path, PathBuf::from("/usr/bin/protoc"));
        assert_eq!(config.temp_root, PathBuf::from("/tmp/pb"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.error_format, ErrorFormat::Gcc);
        assert!(config.prefix_args.is_empty());
    }

    #[test]
    fn test_default_config() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.compiler_path, PathBuf::from("protoc"));
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.error_format, ErrorFormat::Msvs);
    }

    #[test]
    fn test_build_args_order() {
        let orchestrator = Orchestrator::with_config(
            OrchestratorConfig::default()
                .prefix_arg("run")
                .prefix_arg("--rm"),
        );

        let args = orchestrator.build_args(CompileMode::Decode, "Point");
        assert_eq!(
            args,
            vec![
                OsString::from("run"),
                OsString::from("--rm"),
                OsString::from("--decode"),
                OsString::from("Point"),
                OsString::from("--error_format=msvs"),
                OsString::from("MessageDefinition.proto"),
            ]
        );
    }

    #[test]
    fn test_missing_compiler_is_launch_error_and_cleans_up() {
        let tmp = tempfile::tempdir().unwrap();
        let orchestrator = Orchestrator::with_config(
            OrchestratorConfig::with_compiler(tmp.path().join("no-such-protoc"))
                .temp_root(tmp.path().join("root")),
        );

        let err = orchestrator
            .encode(&EncodeTask::new(POINT, "x: 3 y: 4", "Point"))
            .unwrap_err();

        assert!(matches!(err, CompilerError::SpawnFailed { .. }));
        assert_eq!(err.kind(), CompilerErrorKind::Launch);
        assert!(is_empty_dir(&tmp.path().join("root")));
    }

    #[cfg(unix)]
    #[test]
    fn test_arguments_reach_compiler() {
        let tmp = tempfile::tempdir().unwrap();
        let orchestrator = scripted("printf '%s\\n' \"$@\" 1>&2", tmp.path());

        let result = orchestrator
            .encode(&EncodeTask::new(POINT, "x: 3 y: 4", "Point"))
            .unwrap();

        let args: Vec<&str> = result.diagnostics.lines().collect();
        assert_eq!(
            args,
            vec!["--encode", "Point", "--error_format=msvs", "MessageDefinition.proto"]
        );
        assert!(result.encoded.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_schema_is_readable_from_working_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let orchestrator = scripted("cat \"$4\"", tmp.path());

        let result = orchestrator
            .decode(&DecodeTask::new(POINT, Vec::new(), "Point"))
            .unwrap();

        assert_eq!(result.decoded, POINT);
        assert!(result.diagnostics.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_encode_output_is_byte_exact() {
        let tmp = tempfile::tempdir().unwrap();
        // Emit bytes that are not valid UTF-8 regardless of the input.
        let orchestrator = scripted("cat >/dev/null; printf '\\010\\003\\377\\200'", tmp.path());

        let result = orchestrator
            .encode(&EncodeTask::new(POINT, "x: 3", "Point"))
            .unwrap();

        assert_eq!(result.encoded, vec![0x08, 0x03, 0xff, 0x80]);
    }

    #[cfg(unix)]
    #[test]
    fn test_decode_input_is_byte_exact() {
        let tmp = tempfile::tempdir().unwrap();
        let orchestrator = scripted("od -An -tx1 | tr -s ' \\n' ' '", tmp.path());

        let result = orchestrator
            .decode(&DecodeTask::new(POINT, vec![0x08, 0xff, 0x80, 0x00], "Point"))
            .unwrap();

        assert_eq!(result.decoded.trim(), "08 ff 80 00");
    }

    #[cfg(unix)]
    #[test]
    fn test_workspace_removed_after_success_and_timeout() {
        let tmp = tempfile::tempdir().unwrap();

        scripted("cat", tmp.path())
            .encode(&EncodeTask::new(POINT, "x: 3", "Point"))
            .unwrap();
        assert!(is_empty_dir(tmp.path()));

        let slow = Orchestrator::with_config(
            scripted("exec sleep 30", tmp.path())
                .config()
                .clone()
                .timeout(Duration::from_millis(200)),
        );
        let err = slow
            .encode(&EncodeTask::new(POINT, "x: 3", "Point"))
            .unwrap_err();
        assert_eq!(err.kind(), CompilerErrorKind::Timeout);
        assert!(is_empty_dir(tmp.path()));
    }

    #[cfg(unix)]
    #[test]
    fn test_cancelled_before_start() {
        let tmp = tempfile::tempdir().unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();

        let err = scripted("exec sleep 30", tmp.path())
            .decode_with_cancel(&DecodeTask::new(POINT, vec![0x08], "Point"), &cancel)
            .unwrap_err();

        assert!(matches!(err, CompilerError::Cancelled));
        assert!(is_empty_dir(tmp.path()));
    }
}
