//! Process Runner
//!
//! The only place a scan tool is actually executed. Everything above this
//! seam works on `ProcessOutput` so it can be driven by a scripted runner.

use std::io::{ErrorKind, Read};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crate::logic::error::ScanError;

/// How often a running child is polled for exit
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Time allowed after exit (or kill) for the pipes to finish draining
const DRAIN_GRACE: Duration = Duration::from_millis(200);

/// Pipe read size
const CHUNK_SIZE: usize = 4096;

/// Result of one tool invocation
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    /// `None` when killed by a signal or on timeout
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub elapsed: Duration,
    /// Killed after exceeding its timeout; stdout holds partial output
    pub timed_out: bool,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }

    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[String], timeout: Duration)
        -> Result<ProcessOutput, ScanError>;
}

// ============================================================================
// SYSTEM RUNNER
// ============================================================================

/// Runs real processes with a hard timeout
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<ProcessOutput, ScanError> {
        let started = Instant::now();

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => ScanError::CommandNotFound {
                    program: program.to_string(),
                },
                _ => ScanError::Io {
                    program: program.to_string(),
                    message: e.to_string(),
                },
            })?;

        // Drain pipes on their own threads so a chatty tool cannot block on a full pipe.
        // A forked grandchild can keep them open after the child is gone, so
        // collection below is bounded by a deadline rather than by EOF.
        let stdout_reader = child.stdout.take().map(drain);
        let stderr_reader = child.stderr.take().map(drain);

        let mut timed_out = false;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break Some(status),
                Ok(None) if started.elapsed() >= timeout => {
                    log::warn!("{} exceeded {:?}, killing", program, timeout);
                    let _ = child.kill();
                    let _ = child.wait();
                    timed_out = true;
                    break None;
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    let _ = child.kill();
                    return Err(ScanError::Io {
                        program: program.to_string(),
                        message: e.to_string(),
                    });
                }
            }
        };

        let deadline = Instant::now() + DRAIN_GRACE;
        let stdout = collect(stdout_reader, deadline);
        let stderr = collect(stderr_reader, deadline);
        if timed_out && (stdout.1 || stderr.1) {
            log::debug!("{}: pipes still open after kill, keeping partial output", program);
        }

        Ok(ProcessOutput {
            exit_code: status.and_then(|s| s.code()),
            stdout: stdout.0,
            stderr: stderr.0,
            elapsed: started.elapsed(),
            timed_out,
        })
    }
}

/// Forward pipe contents chunk by chunk until EOF or the receiver is dropped
fn drain<R: Read + Send + 'static>(mut pipe: R) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut chunk = [0u8; CHUNK_SIZE];
        loop {
            match pipe.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => {
                    if tx.send(chunk[..n].to_vec()).is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
    });
    rx
}

/// Whatever arrived before `deadline`. The flag is true if the pipe was
/// still open when collection gave up.
fn collect(reader: Option<Receiver<Vec<u8>>>, deadline: Instant) -> (Vec<u8>, bool) {
    let mut buf = Vec::new();
    let Some(rx) = reader else {
        return (buf, false);
    };
    loop {
        let wait = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(wait) {
            Ok(chunk) => buf.extend_from_slice(&chunk),
            Err(RecvTimeoutError::Timeout) => return (buf, true),
            Err(RecvTimeoutError::Disconnected) => return (buf, false),
        }
    }
}

// ============================================================================
// SCRIPTED RUNNER (tests)
// ============================================================================

#[cfg(test)]
pub(crate) mod fake {
    use std::collections::HashMap;

    use parking_lot::Mutex;

    use super::*;

    /// Replays canned responses keyed by the full command line
    #[derive(Default)]
    pub struct ScriptedRunner {
        responses: Mutex<HashMap<String, Result<ProcessOutput, ScanError>>>,
        pub calls: Mutex<Vec<String>>,
    }

    impl ScriptedRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn ok(self, command: &str, stdout: &str) -> Self {
            self.respond(
                command,
                Ok(ProcessOutput {
                    exit_code: Some(0),
                    stdout: stdout.as_bytes().to_vec(),
                    ..Default::default()
                }),
            )
        }

        pub fn respond(self, command: &str, response: Result<ProcessOutput, ScanError>) -> Self {
            self.responses.lock().insert(command.to_string(), response);
            self
        }

        pub fn call_log(&self) -> Vec<String> {
            self.calls.lock().clone()
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(
            &self,
            program: &str,
            args: &[String],
            _timeout: Duration,
        ) -> Result<ProcessOutput, ScanError> {
            let mut line = program.to_string();
            for arg in args {
                line.push(' ');
                line.push_str(arg);
            }
            self.calls.lock().push(line.clone());

            self.responses
                .lock()
                .get(&line)
                .cloned()
                .unwrap_or(Err(ScanError::CommandNotFound { program: program.to_string() }))
        }
    }
}
