//! `tiger`: an interactive git session.
//!
//! Reads commands from stdin until `exit`, `quit`, end of input, or Ctrl-C.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tiger::exit_codes;
use tiger::io::config::{ShellConfig, load_config};
use tiger::session::Session;
use tiger::{logging, signal};
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "tiger",
    version,
    about = "Interactive git shell with drafts, one-line commits and paged output"
)]
struct Cli {
    /// TOML config file (missing file means defaults).
    #[arg(long, env = "TIGER_CONFIG")]
    config: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit.
    #[arg(long)]
    print_config: bool,
}

fn main() {
    logging::init();
    if let Err(err) = run(Cli::parse()) {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::FATAL);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ShellConfig::default(),
    };
    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }
    debug!(?config, "configuration loaded");

    signal::install(signal::exit_on_interrupt)?;

    let cwd = std::env::current_dir().context("read working directory")?;
    let mut session = Session::new(config, cwd);
    // Stdout stays unlocked so the interrupt thread can still write to it.
    let mut out = io::stdout();
    let mut input = io::stdin().lock();
    session.run(&mut input, &mut out)
}
