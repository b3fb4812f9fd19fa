//! Interactive shell layered over the `git` command line.
//!
//! The session keeps a working directory and shows the branch in its
//! prompt. Lines are forwarded to git, except for a few enhanced commands:
//! `draft`/`commit` for composing messages ahead of time, one-line `commit -m`,
//! `ci`/`checkin`, and `log`/`diff`/`show` piped through the configured pager.
//!
//! - **[`core`]**: Pure logic (tokenizing, commit flags, prompt layout).
//! - **[`io`]**: Side-effecting operations (child processes, git queries,
//!   config, the draft file).
//!
//! [`session`] drives the loop; [`dispatch`] and [`prompt`] coordinate core
//! logic with I/O for each line.

pub mod core;
pub mod dispatch;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod prompt;
pub mod session;
pub mod signal;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
