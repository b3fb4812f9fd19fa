//! Launching external programs: captured, attached to the session's streams,
//! or piped into a second program such as a pager.

use std::ffi::OsString;
use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;
#[cfg(test)]
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;

use anyhow::Result;
use tracing::{debug, error, instrument, warn};

use crate::core::style::{RED, RESET};

/// Result of a finished (or failed-to-start) external program.
pub type Outcome = std::result::Result<(), ProcessError>;

/// Why an external program did not complete successfully.
#[derive(Debug)]
pub enum ProcessError {
    /// The program could not be launched (missing executable, permissions).
    Spawn { program: String, source: io::Error },
    /// Waiting on a running child failed.
    Wait { program: String, source: io::Error },
    /// The program ran and exited unsuccessfully.
    Exit { program: String, status: ExitStatus },
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::Spawn { program, source } => write!(f, "start {program}: {source}"),
            ProcessError::Wait { program, source } => write!(f, "wait for {program}: {source}"),
            ProcessError::Exit { program, status } => write!(f, "{program}: {status}"),
        }
    }
}

impl std::error::Error for ProcessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProcessError::Spawn { source, .. } | ProcessError::Wait { source, .. } => Some(source),
            ProcessError::Exit { .. } => None,
        }
    }
}

/// Captured output of [`Invocation::capture`].
#[derive(Debug)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
    pub outcome: Outcome,
}

/// A program plus arguments, run in a fixed working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<OsString>,
    workdir: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            workdir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    #[cfg(test)]
    pub(crate) fn program(&self) -> &str {
        &self.program
    }

    #[cfg(test)]
    pub(crate) fn arguments(&self) -> &[OsString] {
        &self.args
    }

    #[cfg(test)]
    pub(crate) fn workdir(&self) -> Option<&Path> {
        self.workdir.as_deref()
    }

    /// Run to completion with stdout/stderr collected into strings.
    ///
    /// Stdin is `/dev/null`, so the session's own streams are never touched.
    #[instrument(skip_all, fields(program = %self.program))]
    pub fn capture(&self) -> CapturedOutput {
        debug!(args = ?self.args, "capturing child process");
        let output = self
            .command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output();
        match output {
            Ok(output) => CapturedOutput {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                outcome: self.check_status(output.status),
            },
            Err(source) => {
                error!(err = %source, "failed to spawn command");
                CapturedOutput {
                    stdout: String::new(),
                    stderr: String::new(),
                    outcome: Err(self.spawn_error(source)),
                }
            }
        }
    }

    /// Run to completion with stdin/stdout/stderr inherited from the session.
    #[instrument(skip_all, fields(program = %self.program))]
    pub fn attach(&self) -> Outcome {
        debug!(args = ?self.args, "running attached child process");
        let mut child = self.spawn(Stdio::inherit(), Stdio::inherit())?;
        self.finish(&mut child)
    }

    /// Run `self` with its stdout piped into `second`, whose stdout is the session's.
    ///
    /// Ordering: wait for `self`, close the pipe's write side, then wait for
    /// `second`. The reader only sees end-of-input once the writer has exited,
    /// and is never awaited while our copy of the write side is still open.
    /// When `self` fails, `second` is not awaited; it is reaped on a background
    /// thread once it drains the closed pipe. A writer killed by SIGPIPE means
    /// the reader quit early and counts as success.
    #[instrument(skip_all, fields(first = %self.program, second = %second.program))]
    pub fn attach_with_pipe(&self, second: &Invocation) -> Outcome {
        let (reader, writer) = io::pipe().map_err(|source| self.spawn_error(source))?;
        let feed = writer.try_clone().map_err(|source| self.spawn_error(source))?;

        let mut first = self.spawn(Stdio::inherit(), feed.into())?;
        let mut pager = match second.spawn(reader.into(), Stdio::inherit()) {
            Ok(child) => child,
            Err(err) => {
                drop(writer);
                if let Err(first_err) = self.finish(&mut first) {
                    debug!(err = %first_err, "writer failed after reader could not start");
                }
                return Err(err);
            }
        };
        debug!("pipe chain started");

        let written = self.wait(&mut first).and_then(|status| {
            if killed_by_broken_pipe(status) {
                debug!("pipe writer stopped by SIGPIPE");
                return Ok(());
            }
            self.check_status(status)
        });
        drop(writer);
        debug!("pipe write side closed");

        if let Err(err) = written {
            warn!(err = %err, "pipe writer failed, not waiting for reader");
            reap_in_background(second.program.clone(), pager);
            return Err(err);
        }
        second.finish(&mut pager)
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Spawn with the given stdin/stdout. The `Command` (and with it the
    /// parent's copies of the passed handles) is dropped before returning.
    fn spawn(&self, stdin: Stdio, stdout: Stdio) -> Result<Child, ProcessError> {
        let mut cmd = self.command();
        cmd.stdin(stdin).stdout(stdout).stderr(Stdio::inherit());
        cmd.spawn().map_err(|source| {
            error!(program = %self.program, err = %source, "failed to spawn command");
            self.spawn_error(source)
        })
    }

    fn wait(&self, child: &mut Child) -> Result<ExitStatus, ProcessError> {
        let status = child.wait().map_err(|source| ProcessError::Wait {
            program: self.program.clone(),
            source,
        })?;
        debug!(exit_code = ?status.code(), "command finished");
        Ok(status)
    }

    fn finish(&self, child: &mut Child) -> Outcome {
        self.wait(child).and_then(|status| self.check_status(status))
    }

    fn check_status(&self, status: ExitStatus) -> Outcome {
        if status.success() {
            return Ok(());
        }
        Err(ProcessError::Exit {
            program: self.program.clone(),
            status,
        })
    }

    fn spawn_error(&self, source: io::Error) -> ProcessError {
        ProcessError::Spawn {
            program: self.program.clone(),
            source,
        }
    }
}

#[cfg(unix)]
fn killed_by_broken_pipe(status: ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;
    const SIGPIPE: i32 = 13;
    status.signal() == Some(SIGPIPE)
}

#[cfg(not(unix))]
fn killed_by_broken_pipe(_status: ExitStatus) -> bool {
    false
}

fn reap_in_background(program: String, mut child: Child) {
    thread::spawn(move || match child.wait() {
        Ok(status) => debug!(program = %program, exit_code = ?status.code(), "reaped pipe reader"),
        Err(err) => warn!(program = %program, err = %err, "failed to reap pipe reader"),
    });
}

/// Print a failure as a red `ERROR:` line.
pub fn report_error(out: &mut dyn Write, err: &dyn fmt::Display) -> Result<()> {
    writeln!(out, "{RED}ERROR:{RESET} {err}")?;
    Ok(())
}

/// Print captured output, trimmed, after an `ERROR:` line on failure.
///
/// Returns the invocation's outcome so callers can chain on success.
pub fn report(out: &mut dyn Write, captured: CapturedOutput) -> Result<Outcome> {
    if let Err(err) = &captured.outcome {
        report_error(out, err)?;
    }
    for stream in [&captured.stdout, &captured.stderr] {
        let trimmed = stream.trim();
        if !trimmed.is_empty() {
            writeln!(out, "{trimmed}")?;
        }
    }
    out.flush()?;
    Ok(captured.outcome)
}
