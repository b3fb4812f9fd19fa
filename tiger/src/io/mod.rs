//! Side-effecting helpers: child processes, git queries, config, draft file.

pub mod config;
pub mod draft;
pub mod git;
pub mod process;
