//! Stable exit codes for the `tiger` binary.

/// `exit`/`quit`, end of input, or an interrupt.
pub const OK: i32 = 0;
/// Invalid configuration or an unrecoverable I/O error.
pub const FATAL: i32 = 1;
