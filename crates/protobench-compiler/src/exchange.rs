//! Concurrent standard stream exchange with a compiler process.
//!
//! The payload is written to stdin while stdout and stderr are drained, each
//! on its own thread. A compiler that fills one pipe while nobody reads it
//! blocks forever, so draining one stream after the other is not an option
//! once output exceeds the OS pipe buffer.
//!
//! The calling thread supervises: it collects stream results, polls for
//! process exit, and kills the process when the deadline passes or the
//! caller cancels.

use std::io::{self, Read, Write};
use std::process::ExitStatus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{CompilerError, CompilerResult};
use crate::process::CompilerProcess;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A shared flag a caller can set to abandon an in-flight invocation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a new, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Every clone of this token observes it.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Everything captured from a finished compiler process.
#[derive(Debug)]
pub struct ExchangeOutput {
    /// Raw bytes read from standard output.
    pub output: Vec<u8>,
    /// Raw bytes read from standard error.
    pub errors: Vec<u8>,
    /// Exit status of the process. Recorded, not interpreted.
    pub status: ExitStatus,
    /// Wall time from the start of the exchange until completion.
    pub elapsed: Duration,
}

impl ExchangeOutput {
    /// Returns standard error as text, replacing invalid UTF-8.
    pub fn error_text(&self) -> String {
        String::from_utf8_lossy(&self.errors).into_owned()
    }

    /// Returns standard output as text, replacing invalid UTF-8.
    pub fn output_text(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

enum Event {
    InputWritten(io::Result<()>),
    Output(io::Result<Vec<u8>>),
    Errors(io::Result<Vec<u8>>),
}

/// Drives one payload through a compiler process.
#[derive(Debug, Clone)]
pub struct StreamExchange {
    timeout: Duration,
    cancel: CancelToken,
}

impl StreamExchange {
    /// Creates an exchange that kills the process after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            cancel: CancelToken::new(),
        }
    }

    /// Observes `cancel` while the exchange runs.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Writes `input` to the process, closes its stdin, and captures stdout
    /// and stderr until both reach end-of-stream and the process has exited.
    ///
    /// On timeout or cancellation the process is killed before returning.
    pub fn run(
        &self,
        process: &mut CompilerProcess,
        input: Vec<u8>,
    ) -> CompilerResult<ExchangeOutput> {
        let start = Instant::now();
        let (tx, rx) = mpsc::channel();

        let mut input_done = true;
        let mut output = Some(Vec::new());
        let mut errors = Some(Vec::new());

        if let Some(stdin) = process.take_stdin() {
            input_done = false;
            spawn_stage("stdin", tx.clone(), move || {
                Event::InputWritten(write_input(stdin, &input))
            })
            .or_else(|e| abort(process, e))?;
        }
        if let Some(stdout) = process.take_stdout() {
            output = None;
            spawn_stage("stdout", tx.clone(), move || Event::Output(drain(stdout)))
                .or_else(|e| abort(process, e))?;
        }
        if let Some(stderr) = process.take_stderr() {
            errors = None;
            spawn_stage("stderr", tx.clone(), move || Event::Errors(drain(stderr)))
                .or_else(|e| abort(process, e))?;
        }
        drop(tx);

        loop {
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(Event::InputWritten(result)) => {
                    match result {
                        Ok(()) => {}
                        // The compiler exited without consuming all input,
                        // typically after rejecting the schema.
                        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                            debug!("compiler closed stdin before the payload was fully written");
                        }
                        Err(e) => return abort(process, CompilerError::stream_failed("stdin", e)),
                    }
                    input_done = true;
                }
                Ok(Event::Output(result)) => match result {
                    Ok(bytes) => output = Some(bytes),
                    Err(e) => return abort(process, CompilerError::stream_failed("stdout", e)),
                },
                Ok(Event::Errors(result)) => match result {
                    Ok(bytes) => errors = Some(bytes),
                    Err(e) => return abort(process, CompilerError::stream_failed("stderr", e)),
                },
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => thread::sleep(POLL_INTERVAL),
            }

            let status = match process.try_wait() {
                Ok(status) => status,
                Err(e) => return abort(process, e),
            };

            if let (Some(status), true) = (status, input_done) {
                if output.is_some() && errors.is_some() {
                    let exchanged = ExchangeOutput {
                        output: output.take().unwrap_or_default(),
                        errors: errors.take().unwrap_or_default(),
                        status,
                        elapsed: start.elapsed(),
                    };
                    debug!(
                        output_bytes = exchanged.output.len(),
                        error_bytes = exchanged.errors.len(),
                        status = %exchanged.status,
                        elapsed = ?exchanged.elapsed,
                        "exchange complete"
                    );
                    return Ok(exchanged);
                }
            }

            if self.cancel.is_cancelled() {
                return abort(process, CompilerError::Cancelled);
            }
            if start.elapsed() > self.timeout {
                return abort(
                    process,
                    CompilerError::Timeout {
                        timeout: self.timeout,
                    },
                );
            }
        }
    }
}

/// Kills the process and returns `err`.
///
/// Stream threads are left to finish on their own: once the process is gone
/// their pipes reach end-of-stream and their sends go nowhere.
fn abort<T>(process: &mut CompilerProcess, err: CompilerError) -> CompilerResult<T> {
    warn!(pid = process.id(), error = %err, "aborting compiler exchange");
    if let Err(kill_err) = process.kill() {
        warn!(pid = process.id(), error = %kill_err, "failed to kill compiler process");
    }
    Err(err)
}

fn spawn_stage<F>(stream: &'static str, tx: Sender<Event>, stage: F) -> CompilerResult<()>
where
    F: FnOnce() -> Event + Send + 'static,
{
    thread::Builder::new()
        .name(format!("protobench-{}", stream))
        .spawn(move || {
            let _ = tx.send(stage());
        })
        .map(|_| ())
        .map_err(|e| CompilerError::stream_failed(stream, e))
}

// Takes `stdin` by value: dropping it closes the pipe and signals end-of-input.
fn write_input<W: Write>(mut stdin: W, input: &[u8]) -> io::Result<()> {
    stdin.write_all(input)?;
    stdin.flush()
}

fn drain<R: Read>(mut stream: R) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf)?;
    Ok(buf)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::error::CompilerErrorKind;
    use std::path::Path;

    const MIB: usize = 1024 * 1024;

    fn sh(script: &str, cwd: &Path) -> CompilerProcess {
        CompilerProcess::launch(Path::new("sh"), cwd, ["-c", script]).unwrap()
    }

    #[test]
    fn test_cancel_token_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_echo_with_diagnostics() {
        let tmp = tempfile::tempdir().unwrap();
        let mut process = sh("cat; echo 'warning: careful' 1>&2", tmp.path());

        let out = StreamExchange::new(Duration::from_secs(10))
            .run(&mut process, b"x: 3 y: 4".to_vec())
            .unwrap();

        assert_eq!(out.output, b"x: 3 y: 4");
        assert_eq!(out.error_text().trim(), "warning: careful");
        assert!(out.status.success());
    }

    #[test]
    fn test_binary_payload_is_byte_exact() {
        let tmp = tempfile::tempdir().unwrap();
        let mut process = sh("cat", tmp.path());
        let payload: Vec<u8> = (0..=255u8).chain([0xff, 0xfe, 0x00, 0x80]).collect();

        let out = StreamExchange::new(Duration::from_secs(10))
            .run(&mut process, payload.clone())
            .unwrap();

        assert_eq!(out.output, payload);
    }

    #[test]
    fn test_large_payload_with_stderr_flood_does_not_deadlock() {
        let tmp = tempfile::tempdir().unwrap();
        // Fill stderr well past the pipe buffer before touching stdin.
        let mut process = sh(
            "head -c 524288 /dev/zero | tr '\\000' e 1>&2; cat",
            tmp.path(),
        );
        let payload = vec![b'a'; 2 * MIB];

        let out = StreamExchange::new(Duration::from_secs(60))
            .run(&mut process, payload)
            .unwrap();

        assert_eq!(out.output.len(), 2 * MIB);
        assert_eq!(out.errors.len(), 524288);
    }

    #[test]
    fn test_exit_without_reading_stdin() {
        let tmp = tempfile::tempdir().unwrap();
        let mut process = sh("echo 'Type not defined: Nope' 1>&2; exit 1", tmp.path());

        let out = StreamExchange::new(Duration::from_secs(10))
            .run(&mut process, vec![b'x'; MIB])
            .unwrap();

        assert!(out.output.is_empty());
        assert_eq!(out.error_text().trim(), "Type not defined: Nope");
        assert_eq!(out.status.code(), Some(1));
    }

    #[test]
    fn test_timeout_kills_process() {
        let tmp = tempfile::tempdir().unwrap();
        let mut process = sh("exec sleep 30", tmp.path());
        let start = Instant::now();

        let err = StreamExchange::new(Duration::from_millis(200))
            .run(&mut process, Vec::new())
            .unwrap_err();

        assert_eq!(err.kind(), CompilerErrorKind::Timeout);
        assert!(start.elapsed() < Duration::from_secs(10));
        assert!(process.try_wait().unwrap().is_some());
    }

    #[test]
    fn test_cancel_kills_process() {
        let tmp = tempfile::tempdir().unwrap();
        let mut process = sh("exec sleep 30", tmp.path());
        let token = CancelToken::new();
        let remote = token.clone();
        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            remote.cancel();
        });

        let err = StreamExchange::new(Duration::from_secs(30))
            .with_cancel(token)
            .run(&mut process, Vec::new())
            .unwrap_err();
        canceller.join().unwrap();

        assert!(matches!(err, CompilerError::Cancelled));
        assert!(process.try_wait().unwrap().is_some());
    }
}
