//! ANSI color escapes used in prompts and inline reports.

pub const RED: &str = "\x1b[31m";
pub const YELLOW: &str = "\x1b[33m";
pub const BLUE: &str = "\x1b[34m";
pub const CYAN: &str = "\x1b[36m";
pub const GREY: &str = "\x1b[37m";
pub const RESET: &str = "\x1b[0m";
