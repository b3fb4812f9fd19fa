//! Interrupt handling for the session.
//!
//! Ctrl-C ends the whole session immediately: a newline is printed so the
//! shell prompt that follows starts on a clean line, and the process exits.
//! Children still running are abandoned.

use std::io::{self, Write};
use std::thread;

use anyhow::{Context, Result};
use tokio::runtime::Builder;
use tracing::{debug, error};

use crate::exit_codes;

#[cfg(unix)]
type Listener = tokio::signal::unix::Signal;
#[cfg(windows)]
type Listener = tokio::signal::windows::CtrlC;

#[cfg(unix)]
fn register() -> io::Result<Listener> {
    use tokio::signal::unix::{SignalKind, signal};
    signal(SignalKind::interrupt())
}

#[cfg(windows)]
fn register() -> io::Result<Listener> {
    tokio::signal::windows::ctrl_c()
}

/// Listen for the first interrupt on a background thread and run `on_interrupt`.
///
/// The handler is registered before this returns; the default action never
/// applies once `install` succeeds.
pub fn install<F>(on_interrupt: F) -> Result<()>
where
    F: FnOnce() + Send + 'static,
{
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .context("build interrupt runtime")?;
    let mut interrupts = {
        let _entered = runtime.enter();
        register().context("register interrupt handler")?
    };
    thread::Builder::new()
        .name("interrupt".to_string())
        .spawn(move || match runtime.block_on(interrupts.recv()) {
            Some(()) => {
                debug!("interrupt received");
                on_interrupt();
            }
            None => error!("interrupt listener closed"),
        })
        .context("spawn interrupt listener")?;
    Ok(())
}

/// Default interrupt action: newline, then exit successfully.
pub fn exit_on_interrupt() {
    let mut stdout = io::stdout();
    let _ = stdout.write_all(b"\n");
    let _ = stdout.flush();
    std::process::exit(exit_codes::OK);
}
