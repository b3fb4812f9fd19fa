//! Prompt rendering between commands.

use std::io::Write;

use anyhow::Result;
use tracing::debug;

use crate::core::prompt_line::{no_repo_hint, no_repo_prompt, repo_prompt};
use crate::io::git::Git;

/// Show the working tree status and write the prompt (no trailing newline).
///
/// Outside a repository only a hint and a marker prompt are written. Failed
/// git queries degrade the prompt; the only error is failing to write `out`.
pub fn render(out: &mut dyn Write, git: &Git, show_status: bool) -> Result<()> {
    let cwd = git.workdir().to_string_lossy().into_owned();
    let root = match git.work_tree_root() {
        Ok(root) => root,
        Err(err) => {
            debug!(err = %err, "not in a repository");
            writeln!(out, "{}", no_repo_hint())?;
            write!(out, "{}", no_repo_prompt(&cwd))?;
            out.flush()?;
            return Ok(());
        }
    };

    if show_status {
        out.flush()?;
        if let Err(err) = git.command(["status", "-s", "-uall"]).attach() {
            debug!(err = %err, "status display failed");
        }
    }

    let branch = git.current_branch();
    write!(
        out,
        "{}",
        repo_prompt(&branch, &root.to_string_lossy(), &cwd)
    )?;
    out.flush()?;
    Ok(())
}
