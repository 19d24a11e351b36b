//! Compiler subprocess handle.
//!
//! Launches the compiler directly (no shell, arguments passed literally) with
//! all three standard streams piped, and hands out the stream ends so the
//! exchange can drive them from separate threads.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};

use tracing::{debug, warn};

use crate::error::{CompilerError, CompilerResult};

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// A running compiler process with piped standard streams.
///
/// Dropping a handle whose process is still running kills and reaps it.
#[derive(Debug)]
pub struct CompilerProcess {
    child: Child,
    executable: PathBuf,
    status: Option<ExitStatus>,
}

impl CompilerProcess {
    /// Starts `executable` in `working_dir` with the given arguments.
    ///
    /// Fails with [`CompilerError::SpawnFailed`] when the executable is
    /// missing or cannot be started.
    pub fn launch<I, S>(executable: &Path, working_dir: &Path, args: I) -> CompilerResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(executable);
        cmd.args(args)
            .current_dir(working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        debug!(command = ?cmd, cwd = %working_dir.display(), "launching compiler");

        let child = cmd.spawn().map_err(|source| CompilerError::SpawnFailed {
            executable: executable.to_path_buf(),
            source,
        })?;

        Ok(Self {
            child,
            executable: executable.to_path_buf(),
            status: None,
        })
    }

    /// Returns the OS process id.
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Returns the executable this process was started from.
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Takes the writable end of the process's standard input.
    pub fn take_stdin(&mut self) -> Option<ChildStdin> {
        self.child.stdin.take()
    }

    /// Takes the readable end of the process's standard output.
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    /// Takes the readable end of the process's standard error.
    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.child.stderr.take()
    }

    /// Returns the exit status if the process has exited, without blocking.
    pub fn try_wait(&mut self) -> CompilerResult<Option<ExitStatus>> {
        if self.status.is_none() {
            self.status = self.child.try_wait().map_err(CompilerError::WaitFailed)?;
        }
        Ok(self.status)
    }

    /// Blocks until the process exits.
    pub fn wait(&mut self) -> CompilerResult<ExitStatus> {
        if let Some(status) = self.status {
            return Ok(status);
        }
        let status = self.child.wait().map_err(CompilerError::WaitFailed)?;
        self.status = Some(status);
        Ok(status)
    }

    /// Forcibly terminates the process and reaps it.
    ///
    /// Killing a process that already exited is not an error.
    pub fn kill(&mut self) -> CompilerResult<ExitStatus> {
        if let Some(status) = self.try_wait()? {
            return Ok(status);
        }
        if let Err(e) = self.child.kill() {
            // InvalidInput means the process exited between try_wait and kill.
            if e.kind() != std::io::ErrorKind::InvalidInput {
                return Err(CompilerError::WaitFailed(e));
            }
        }
        self.wait()
    }
}

impl Drop for CompilerProcess {
    fn drop(&mut self) {
        if matches!(self.try_wait(), Ok(Some(_))) {
            return;
        }
        warn!(pid = self.child.id(), "compiler process still running on drop; killing it");
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
