//! The interactive session: prompt, read a line, dispatch, repeat.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{debug, info, instrument};

use crate::dispatch::{Flow, dispatch};
use crate::io::config::ShellConfig;
use crate::io::git::Git;
use crate::io::process::Invocation;
use crate::prompt;

/// Live session state. The working directory is the only thing that
/// persists between commands; every child process runs in it.
#[derive(Debug)]
pub struct Session {
    config: ShellConfig,
    cwd: PathBuf,
}

impl Session {
    pub fn new(config: ShellConfig, cwd: impl Into<PathBuf>) -> Self {
        Self {
            config,
            cwd: cwd.into(),
        }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Git bound to the current working directory.
    pub fn git(&self) -> Git {
        Git::new(self.config.git.clone(), self.cwd.clone())
    }

    /// Run `fragment` through the configured shell wrapper.
    pub fn shell(&self, fragment: impl Into<String>) -> Invocation {
        let (program, wrapper_args) = match self.config.shell.split_first() {
            Some((program, rest)) => (program.clone(), rest.to_vec()),
            None => ("sh".to_string(), vec!["-c".to_string()]),
        };
        Invocation::new(program)
            .args(wrapper_args)
            .arg(fragment.into())
            .current_dir(&self.cwd)
    }

    /// Change the working directory. `target` is resolved against the
    /// current one; on error nothing changes.
    #[instrument(skip(self))]
    pub fn change_dir(&mut self, target: &str) -> Result<()> {
        let joined = self.cwd.join(target);
        let resolved = joined
            .canonicalize()
            .with_context(|| target.to_string())?;
        if !resolved.is_dir() {
            bail!("{target}: not a directory");
        }
        debug!(cwd = %resolved.display(), "working directory changed");
        self.cwd = resolved;
        Ok(())
    }

    /// Read-eval loop until `exit`/`quit` or end of input.
    ///
    /// Returns `Err` only for fatal errors (unexpected draft file I/O or a
    /// broken output stream).
    pub fn run(&mut self, input: &mut dyn BufRead, out: &mut dyn Write) -> Result<()> {
        info!(cwd = %self.cwd.display(), "session started");
        prompt::render(out, &self.git(), self.config.show_status)?;

        let mut buf = Vec::new();
        loop {
            buf.clear();
            match input.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {}
                Err(err) => {
                    writeln!(out, "error reading stdin: {err}")?;
                    break;
                }
            }
            let line = String::from_utf8_lossy(&buf).into_owned();
            if dispatch(self, &line, input, out)? == Flow::Exit {
                break;
            }
            prompt::render(out, &self.git(), self.config.show_status)?;
        }

        writeln!(out)?;
        out.flush()?;
        info!("session ended");
        Ok(())
    }
}
