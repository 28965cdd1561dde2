//! Helpers for running child processes with timeouts and bounded output.

use std::io::{Read, Write};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, instrument, warn};
use wait_timeout::ChildExt;

use crate::cancel::CancelFlag;

/// How often a running child is checked for cancellation.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Captured child process output.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub stdout_truncated: usize,
    pub stderr_truncated: usize,
    pub timed_out: bool,
    pub cancelled: bool,
}

impl CommandOutput {
    pub fn stdout_truncated_notice(&self, label: &str) -> String {
        if self.stdout_truncated > 0 {
            format!(
                "\n[{label} stdout truncated {} bytes]\n",
                self.stdout_truncated
            )
        } else {
            String::new()
        }
    }

    pub fn stderr_truncated_notice(&self, label: &str) -> String {
        if self.stderr_truncated > 0 {
            format!(
                "\n[{label} stderr truncated {} bytes]\n",
                self.stderr_truncated
            )
        } else {
            String::new()
        }
    }
}

/// Run a command with a timeout and capture stdout/stderr without risking pipe deadlocks.
///
/// Output is read concurrently while the child runs. `output_limit_bytes` bounds the amount of
/// stdout/stderr stored in memory (bytes beyond this are discarded while still draining the pipe).
/// The child is killed when the timeout elapses or `cancel` is raised.
#[instrument(skip_all, fields(timeout_secs = timeout.as_secs(), output_limit_bytes))]
pub fn run_command_with_timeout(
    mut cmd: Command,
    stdin: Option<&[u8]>,
    timeout: Duration,
    output_limit_bytes: usize,
    cancel: &CancelFlag,
) -> Result<CommandOutput> {
    if stdin.is_some() {
        cmd.stdin(Stdio::piped());
    } else {
        cmd.stdin(Stdio::null());
    }
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

    debug!("spawning child process");
    let mut child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            error!(err = %e, "failed to spawn command");
            return Err(e).context("spawn command");
        }
    };

    let (stdout, stderr) = match (child.stdout.take(), child.stderr.take()) {
        (Some(stdout), Some(stderr)) => (stdout, stderr),
        _ => {
            kill_and_reap(&mut child, false, false)?;
            return Err(anyhow!("stdout/stderr were not piped"));
        }
    };

    // Readers must be draining before stdin is fed.
    let stdout_handle = thread::spawn(move || read_stream_limited(stdout, output_limit_bytes));
    let stderr_handle = thread::spawn(move || read_stream_limited(stderr, output_limit_bytes));

    let stdin_handle = match stdin {
        Some(input) => match child.stdin.take() {
            Some(child_stdin) => Some(spawn_stdin_writer(child_stdin, input.to_vec())),
            None => {
                kill_and_reap(&mut child, false, false)?;
                return Err(anyhow!("stdin was not piped"));
            }
        },
        None => None,
    };

    let waited = match wait_with_cancel(&mut child, timeout, cancel) {
        Ok(waited) => waited,
        Err(err) => {
            kill_and_reap(&mut child, false, false)?;
            return Err(err);
        }
    };

    if let Some(handle) = stdin_handle {
        match handle.join() {
            Ok(Ok(())) => {}
            // The child may exit or be killed before reading all of its input.
            Ok(Err(err)) => debug!(err = %err, "stdin not fully written"),
            Err(_) => return Err(anyhow!("stdin writer thread panicked")),
        }
    }

    let (stdout, stdout_truncated) = join_output(stdout_handle).context("join stdout")?;
    let (stderr, stderr_truncated) = join_output(stderr_handle).context("join stderr")?;

    if stdout_truncated > 0 || stderr_truncated > 0 {
        warn!(stdout_truncated, stderr_truncated, "output truncated");
    }

    debug!(
        exit_code = ?waited.status.code(),
        timed_out = waited.timed_out,
        cancelled = waited.cancelled,
        "command finished"
    );
    Ok(CommandOutput {
        status: waited.status,
        stdout,
        stderr,
        stdout_truncated,
        stderr_truncated,
        timed_out: waited.timed_out,
        cancelled: waited.cancelled,
    })
}

struct Waited {
    status: ExitStatus,
    timed_out: bool,
    cancelled: bool,
}

/// Wait in short slices so cancellation is noticed while the child runs.
fn wait_with_cancel(child: &mut Child, timeout: Duration, cancel: &CancelFlag) -> Result<Waited> {
    let started = Instant::now();
    loop {
        let remaining = timeout.saturating_sub(started.elapsed());
        if remaining.is_zero() {
            warn!(
                timeout_secs = timeout.as_secs(),
                "command timed out, killing"
            );
            return kill_and_reap(child, true, false);
        }
        if cancel.is_cancelled() {
            warn!("command cancelled, killing");
            return kill_and_reap(child, false, true);
        }
        let slice = remaining.min(CANCEL_POLL_INTERVAL);
        if let Some(status) = child.wait_timeout(slice).context("wait for command")? {
            return Ok(Waited {
                status,
                timed_out: false,
                cancelled: false,
            });
        }
    }
}

fn kill_and_reap(child: &mut Child, timed_out: bool, cancelled: bool) -> Result<Waited> {
    child.kill().context("kill command")?;
    let status = child.wait().context("wait command after kill")?;
    Ok(Waited {
        status,
        timed_out,
        cancelled,
    })
}

/// Feed stdin on its own thread; dropping the handle closes the pipe so the child sees EOF.
fn spawn_stdin_writer(
    mut child_stdin: ChildStdin,
    input: Vec<u8>,
) -> thread::JoinHandle<Result<()>> {
    thread::spawn(move || child_stdin.write_all(&input).context("write stdin"))
}

fn join_output(handle: thread::JoinHandle<Result<(Vec<u8>, usize)>>) -> Result<(Vec<u8>, usize)> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(anyhow!("output reader thread panicked")),
    }
}

fn read_stream_limited<R: Read>(mut reader: R, limit: usize) -> Result<(Vec<u8>, usize)> {
    let mut buf = Vec::new();
    let mut truncated = 0usize;
    let mut chunk = [0u8; 8192];

    loop {
        let n = reader.read(&mut chunk).context("read output")?;
        if n == 0 {
            break;
        }
        let remaining = limit.saturating_sub(buf.len());
        if remaining > 0 {
            let keep = n.min(remaining);
            buf.extend_from_slice(&chunk[..keep]);
            truncated += n.saturating_sub(keep);
        } else {
            truncated += n;
        }
    }

    Ok((buf, truncated))
}
