//! Worker Process Supervision
//!
//! Spawns one isolated worker per benchmark run, drains its combined
//! stdout/stderr stream on a dedicated thread, and enforces the wall-clock
//! time limit independent of the platform's own cooperation.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::os::unix::io::{FromRawFd, RawFd};
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use graphmark_runner::RUN_SPEC_ENV;
use thiserror::Error;

/// Poll granularity for exit-state checks.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Window between SIGTERM and SIGKILL during forced termination.
const SIGTERM_WINDOW: Duration = Duration::from_millis(500);

/// Error raised on the supervision side of a benchmark run.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The worker process could not be started. Fatal, never retried.
    #[error("Failed to spawn worker: {0}")]
    SpawnFailed(#[from] std::io::Error),

    /// Polling the worker's exit state failed.
    #[error("Failed to poll worker state: {0}")]
    WaitFailed(std::io::Error),
}

/// Builds the command that starts one worker process.
///
/// Supervision (spawn, drain, timeout, terminate) does not depend on how the
/// worker's entry point is structured; re-invoking the current executable is
/// merely the default implementation. Any stdout/stderr configuration on the
/// returned command is overridden: the supervisor owns the worker's output
/// plumbing.
pub trait WorkerEntry: Send + Sync {
    /// Command for a worker hosting the given platform and benchmark run.
    fn command(&self, platform_id: &str, benchmark_id: &str) -> std::io::Result<Command>;
}

/// Default entry point: re-enter the current executable through the hidden
/// `worker` subcommand, handing the run description over via [`RUN_SPEC_ENV`].
#[derive(Debug, Clone, Default)]
pub struct CurrentExeEntry {
    run_spec: Option<PathBuf>,
}

impl CurrentExeEntry {
    /// Entry that relies on the parent's environment for the run handoff.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry that sets [`RUN_SPEC_ENV`] to the given file for each worker.
    pub fn with_run_spec(run_spec: impl Into<PathBuf>) -> Self {
        Self {
            run_spec: Some(run_spec.into()),
        }
    }
}

impl WorkerEntry for CurrentExeEntry {
    fn command(&self, platform_id: &str, benchmark_id: &str) -> std::io::Result<Command> {
        let binary = std::env::current_exe()?;
        let mut command = Command::new(binary);
        command.arg("worker").arg(platform_id).arg(benchmark_id);
        if let Some(run_spec) = &self.run_spec {
            command.env(RUN_SPEC_ENV, run_spec);
        }
        Ok(command)
    }
}

/// Create a pipe pair, returning (read_fd, write_fd).
fn create_pipe() -> Result<(RawFd, RawFd), std::io::Error> {
    let mut fds = [0 as RawFd; 2];
    let ret = unsafe { libc::pipe(fds.as_mut_ptr()) };
    if ret != 0 {
        return Err(std::io::Error::last_os_error());
    }
    // Close-on-exec on both ends; the child's stdio copies are made by dup2,
    // which clears the flag on the new descriptors.
    for &fd in &fds {
        unsafe {
            let flags = libc::fcntl(fd, libc::F_GETFD);
            libc::fcntl(fd, libc::F_SETFD, flags | libc::FD_CLOEXEC);
        }
    }
    Ok((fds[0], fds[1]))
}

/// Closes a pipe descriptor the supervisor is done with.
fn close_fd(fd: RawFd) {
    unsafe {
        libc::close(fd);
    }
}

/// Delivers SIGTERM to a worker, failing when the kernel refuses delivery
/// (typically because the process is already gone).
fn send_sigterm(pid: u32) -> Result<(), std::io::Error> {
    let ret = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
    if ret == -1 {
        Err(std::io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// What the log-draining thread observed before reaching end-of-stream.
#[derive(Debug, Default)]
pub struct DrainReport {
    /// Lines forwarded to the log sink.
    pub lines: u64,
    /// Read fault that ended draining early, if any.
    pub read_error: Option<std::io::Error>,
}

/// Forward the worker's combined output to the log sink, line by line, until
/// end-of-stream. Runs on its own thread so the pipe can never fill up while
/// the supervisor blocks on the worker's exit.
fn drain_lines(benchmark_id: &str, stream: File) -> DrainReport {
    let mut reader = BufReader::new(stream);
    let mut report = DrainReport::default();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                while matches!(buf.last(), Some(b'\n' | b'\r')) {
                    buf.pop();
                }
                let line = String::from_utf8_lossy(&buf);
                tracing::debug!(benchmark_id, worker = %line, "Worker output");
                report.lines += 1;
            }
            Err(error) => {
                tracing::error!(
                    benchmark_id,
                    error = %error,
                    "Failed to read from the benchmark worker"
                );
                report.read_error = Some(error);
                break;
            }
        }
    }
    report
}

/// An owned worker process handle plus its log-draining thread.
///
/// Owned exclusively by the supervisor for the duration of one run. The
/// worker is never reported done while the drain has not reached
/// end-of-stream; joining the drain is that synchronization point.
pub struct WorkerProcess {
    child: Child,
    benchmark_id: String,
    drain: Option<JoinHandle<DrainReport>>,
}

impl WorkerProcess {
    /// Identifier of the run this worker hosts.
    pub fn benchmark_id(&self) -> &str {
        &self.benchmark_id
    }

    /// OS process id.
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Whether the worker process is still running.
    pub fn is_alive(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(Some(_)) => false,
            Ok(None) => true,
            Err(_) => false,
        }
    }

    fn try_wait(&mut self) -> std::io::Result<Option<ExitStatus>> {
        self.child.try_wait()
    }

    /// Block until the drain thread observes end-of-stream.
    fn join_drain(&mut self) -> DrainReport {
        match self.drain.take() {
            Some(handle) => match handle.join() {
                Ok(report) => report,
                Err(_) => {
                    tracing::error!(
                        benchmark_id = %self.benchmark_id,
                        "Log drain thread panicked"
                    );
                    DrainReport::default()
                }
            },
            None => DrainReport::default(),
        }
    }
}

impl Drop for WorkerProcess {
    fn drop(&mut self) {
        if self.is_alive() {
            // Graceful: SIGTERM first, brief wait, then SIGKILL
            let _ = send_sigterm(self.child.id());
            thread::sleep(Duration::from_millis(50));
            if self.is_alive() {
                let _ = self.child.kill();
            }
            let _ = self.child.wait();
        }
        if let Some(handle) = self.drain.take() {
            let _ = handle.join();
        }
    }
}

/// How a supervised worker finished.
#[derive(Debug)]
pub enum WorkerOutcome {
    /// The worker exited on its own within the time limit.
    Exited {
        /// The worker's exit status.
        status: ExitStatus,
        /// What the drain observed before end-of-stream.
        drain: DrainReport,
    },
    /// The worker was still running at the deadline and was forcibly
    /// terminated.
    TimedOut {
        /// What the drain observed before end-of-stream.
        drain: DrainReport,
    },
}

impl WorkerOutcome {
    /// Whether the worker exited on its own with a zero status.
    pub fn success(&self) -> bool {
        matches!(self, WorkerOutcome::Exited { status, .. } if status.success())
    }
}

/// Runs one benchmark as an isolated worker process.
///
/// Isolation contains memory/state leakage between runs and makes the
/// wall-clock limit enforceable regardless of what the platform integration
/// does inside the worker.
pub struct Supervisor {
    entry: Box<dyn WorkerEntry>,
    timeout: Duration,
    termination_grace: Duration,
}

impl Supervisor {
    /// Supervisor spawning workers through the given entry point.
    pub fn new(
        entry: Box<dyn WorkerEntry>,
        timeout: Duration,
        termination_grace: Duration,
    ) -> Self {
        Self {
            entry,
            timeout,
            termination_grace,
        }
    }

    /// Launch a worker and start draining its combined output immediately,
    /// before any blocking wait.
    ///
    /// Spawn failure is fatal for the benchmark and never retried; the caller
    /// receives no process handle.
    pub fn launch(
        &self,
        platform_id: &str,
        benchmark_id: &str,
    ) -> Result<WorkerProcess, SupervisorError> {
        let mut command = self.entry.command(platform_id, benchmark_id)?;

        // One pipe carries both output streams, so worker lines arrive in
        // write order regardless of which stream they were printed to.
        let (read_fd, write_fd) = create_pipe()?;
        command.stdin(Stdio::null());
        unsafe {
            command.pre_exec(move || {
                libc::dup2(write_fd, 1);
                libc::dup2(write_fd, 2);
                Ok(())
            });
        }

        let child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                close_fd(read_fd);
                close_fd(write_fd);
                return Err(SupervisorError::SpawnFailed(e));
            }
        };

        // Close the write end in the parent; end-of-stream on the read end now
        // tracks the worker's lifetime.
        close_fd(write_fd);
        let stream = unsafe { File::from_raw_fd(read_fd) };

        let drain_id = benchmark_id.to_string();
        let drain = thread::spawn(move || drain_lines(&drain_id, stream));

        tracing::info!(
            platform = platform_id,
            benchmark_id,
            pid = child.id(),
            "Launched benchmark worker"
        );
        Ok(WorkerProcess {
            child,
            benchmark_id: benchmark_id.to_string(),
            drain: Some(drain),
        })
    }

    /// Wait for the worker to exit or hit the time limit.
    ///
    /// On both paths the drain thread is joined before the outcome is
    /// reported, so every line the worker wrote has reached the log sink by
    /// the time this returns.
    pub fn supervise(&self, mut worker: WorkerProcess) -> Result<WorkerOutcome, SupervisorError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match worker.try_wait().map_err(SupervisorError::WaitFailed)? {
                Some(status) => {
                    let drain = worker.join_drain();
                    tracing::info!(
                        benchmark_id = %worker.benchmark_id(),
                        %status,
                        lines = drain.lines,
                        "Worker exited"
                    );
                    return Ok(WorkerOutcome::Exited { status, drain });
                }
                None => {
                    if Instant::now() >= deadline {
                        tracing::warn!(
                            benchmark_id = %worker.benchmark_id(),
                            timeout = ?self.timeout,
                            "Worker exceeded the time limit, terminating"
                        );
                        let drain = self.terminate(worker);
                        return Ok(WorkerOutcome::TimedOut { drain });
                    }
                    thread::sleep(WAIT_POLL_INTERVAL);
                }
            }
        }
    }

    /// Forcibly terminate a worker: SIGTERM, a short window to die, SIGKILL,
    /// reap, join the drain, then hold the configured grace period so the OS
    /// can reclaim process resources before the next run is launched.
    ///
    /// A kill failure is logged; it cannot change the run's classification.
    pub fn terminate(&self, mut worker: WorkerProcess) -> DrainReport {
        let _ = send_sigterm(worker.id());
        let sigterm_deadline = Instant::now() + SIGTERM_WINDOW;
        while worker.is_alive() && Instant::now() < sigterm_deadline {
            thread::sleep(WAIT_POLL_INTERVAL);
        }

        if worker.is_alive() {
            if let Err(error) = worker.child.kill() {
                tracing::error!(
                    benchmark_id = %worker.benchmark_id(),
                    error = %error,
                    "Failed to kill worker"
                );
            }
        }
        let _ = worker.child.wait();

        let drain = worker.join_drain();
        thread::sleep(self.termination_grace);
        drain
    }

    /// Launch and supervise one benchmark worker to completion.
    pub fn run(
        &self,
        platform_id: &str,
        benchmark_id: &str,
    ) -> Result<WorkerOutcome, SupervisorError> {
        let worker = self.launch(platform_id, benchmark_id)?;
        self.supervise(worker)
    }
}
