//! Repository context queries.
//!
//! Nothing is cached: branch, worktree root and config can change between two
//! commands (checkout, `config` edits), so every call re-runs `git`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument};

use crate::io::process::{CapturedOutput, Invocation};

const WORKTREE_PREFIX: &str = "worktree ";
const CURRENT_BRANCH_MARKER: &str = "* ";

/// Wrapper for running the git program in a working directory.
#[derive(Debug, Clone)]
pub struct Git {
    program: String,
    workdir: PathBuf,
}

impl Git {
    pub fn new(program: impl Into<String>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            workdir: workdir.into(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Build an invocation of git with `args` in the working directory.
    pub fn command<I, S>(&self, args: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Invocation::new(self.program.clone())
            .args(args)
            .current_dir(&self.workdir)
    }

    /// Root of the main worktree, from `git worktree list --porcelain`.
    #[instrument(skip_all)]
    pub fn work_tree_root(&self) -> Result<PathBuf> {
        let stdout = self.run_capture(&["worktree", "list", "--porcelain"])?;
        let root = parse_work_tree_root(&stdout)
            .ok_or_else(|| anyhow!("git worktree list printed no worktree"))?;
        debug!(root = %root, "worktree root");
        Ok(PathBuf::from(root))
    }

    /// Value of config `key`, trimmed. Unset keys are an error.
    pub fn config_value(&self, key: &str) -> Result<String> {
        let stdout = self
            .run_capture(&["config", key])
            .with_context(|| format!("read git config {key}"))?;
        Ok(stdout.trim().to_string())
    }

    /// Currently checked-out branch, or an empty string when unknown.
    pub fn current_branch(&self) -> String {
        match self.run_capture(&["branch"]) {
            Ok(stdout) => parse_current_branch(&stdout),
            Err(err) => {
                debug!(err = %err, "branch lookup failed");
                String::new()
            }
        }
    }

    fn run_capture(&self, args: &[&str]) -> Result<String> {
        let CapturedOutput {
            stdout,
            stderr,
            outcome,
        } = self.command(args.iter().copied()).capture();
        if let Err(err) = outcome {
            let stderr = stderr.trim();
            if stderr.is_empty() {
                return Err(anyhow!("git {} failed: {err}", args.join(" ")));
            }
            return Err(anyhow!("git {} failed: {stderr}", args.join(" ")));
        }
        Ok(stdout)
    }
}

/// First listed worktree path, with the `worktree ` prefix removed.
pub fn parse_work_tree_root(stdout: &str) -> Option<String> {
    let first = stdout.lines().next()?.trim();
    let root = first.strip_prefix(WORKTREE_PREFIX).unwrap_or(first);
    if root.is_empty() {
        return None;
    }
    Some(root.to_string())
}

/// Branch name from `git branch` output: the line marked with `* `.
pub fn parse_current_branch(stdout: &str) -> String {
    stdout
        .lines()
        .find_map(|line| line.strip_prefix(CURRENT_BRANCH_MARKER))
        .map(str::to_string)
        .unwrap_or_default()
}
