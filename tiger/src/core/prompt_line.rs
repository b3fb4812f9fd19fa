//! Prompt text layout.
//!
//! Paths arrive here as display strings. Git Bash on Windows reports a mix of
//! `/` and `\`, so everything is normalized to `/` before comparison.

use crate::core::style::{BLUE, CYAN, GREY, RED, RESET, YELLOW};

/// Rewrite every `\` as `/`.
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Last component of a `/`-separated path (`/` for the root itself).
pub fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return if path.is_empty() { "." } else { "/" };
    }
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Working directory shown relative to the worktree root.
///
/// Returns `cwd` unchanged when it is not under `root`.
pub fn relative_to_root<'a>(cwd: &'a str, root: &str) -> &'a str {
    cwd.strip_prefix(root).unwrap_or(cwd)
}

/// Prompt shown inside a repository: `git@<branch> <repo><subdir> % `.
pub fn repo_prompt(branch: &str, root: &str, cwd: &str) -> String {
    let root = normalize_separators(root);
    let cwd = normalize_separators(cwd);
    let repo = base_name(&root);
    let subdir = relative_to_root(&cwd, &root);
    format!("{GREY}git@{RESET}{YELLOW}{branch}{RESET} {CYAN}{repo}{subdir}{RESET} % ")
}

/// Hint line printed above the prompt outside a repository.
pub fn no_repo_hint() -> String {
    format!("\nType \"{BLUE}init{RESET}\" to get started with git!")
}

/// Prompt shown outside a repository.
pub fn no_repo_prompt(cwd: &str) -> String {
    let cwd = normalize_separators(cwd);
    format!(
        "{RED}(not a git repository){RESET} {} % ",
        base_name(&cwd)
    )
}
