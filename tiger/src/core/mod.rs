//! Deterministic, pure logic shared by the shell.
//!
//! Core modules must be free of I/O side effects. They turn input lines and
//! query results into plain values so the interesting rules (alias stripping,
//! greedy `-m`, prompt layout) are testable without spawning `git`.

pub mod command_line;
pub mod commit_flags;
pub mod prompt_line;
pub mod style;
