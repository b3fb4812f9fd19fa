//! Turning one input line into git invocations.
//!
//! Most lines are forwarded to git verbatim. A handful are rewritten:
//! `commit` (drafts and greedy `-m`), `ci`/`checkin`, and the pager
//! commands, which get `--color` and are piped through `core.pager`.

use std::io::{BufRead, Write};
use std::iter;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use crate::core::command_line::{Command, CommandLine};
use crate::core::commit_flags::{ALLOW_EMPTY_MESSAGE, build_commit_flags};
use crate::core::style::{RED, RESET};
use crate::io::draft::{commit_from_draft, commit_with_template, draft_exists, draft_path};
use crate::io::process::{Outcome, report, report_error};
use crate::session::Session;

/// Whether the read loop keeps going after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Run one input line.
///
/// Command failures are printed to `out` and the session continues. `Err`
/// is reserved for fatal conditions: unexpected draft file I/O, reading the
/// interactive commit message, or writing to `out`.
#[instrument(skip_all)]
pub fn dispatch(
    session: &mut Session,
    line: &str,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<Flow> {
    let Some(parsed) = CommandLine::parse(line, &session.config().alias) else {
        return Ok(Flow::Continue);
    };
    let command = Command::classify(parsed, &session.config().pager_commands);
    debug!(?command, "dispatching");
    out.flush()?;

    match command {
        Command::ChangeDir(None) => {}
        Command::ChangeDir(Some(target)) => {
            if let Err(err) = session.change_dir(&target) {
                writeln!(out, "{RED}cd: {err:#}{RESET}")?;
            }
        }
        Command::Exit => return Ok(Flow::Exit),
        Command::Draft => edit_draft(session, out)?,
        Command::Commit(args) => commit(session, &args, input, out)?,
        Command::CheckIn(args) => check_in(session, &args, input, out)?,
        Command::Paged(args) => paged(session, args, out)?,
        Command::Forward(args) => {
            let outcome = session.git().command(args).attach();
            report_failure(out, outcome)?;
        }
    }
    Ok(Flow::Continue)
}

/// Open the draft message in `core.editor`.
fn edit_draft(session: &Session, out: &mut dyn Write) -> Result<()> {
    let git = session.git();
    let path = match draft_path(&git, &session.config().draft_file) {
        Ok(path) => path,
        Err(err) => return report_error(out, &format!("{err:#}")),
    };
    let editor = match git.config_value("core.editor") {
        Ok(editor) if !editor.is_empty() => editor,
        Ok(_) => return report_error(out, &"core.editor is empty"),
        Err(err) => return report_error(out, &format!("{err:#}")),
    };
    info!(editor = %editor, path = %path.display(), "editing draft");
    let outcome = session
        .shell(format!("{editor} \"$@\""))
        .arg("tiger-editor")
        .arg(path)
        .attach();
    report_failure(out, outcome)
}

/// `commit`: use the draft when there is one, otherwise the one-line form.
fn commit(
    session: &Session,
    args: &[String],
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<()> {
    let git = session.git();
    let draft = match draft_path(&git, &session.config().draft_file) {
        Ok(path) => Some(path),
        Err(err) => {
            debug!(err = %err, "no draft available");
            None
        }
    };
    if let Some(path) = draft
        && draft_exists(&path)?
    {
        if args.is_empty() {
            let _ = report(out, commit_from_draft(&git, &path)?)?;
        } else {
            let delay = session.config().draft_handoff_delay();
            let outcome = commit_with_template(&git, &path, delay)?;
            report_failure(out, outcome)?;
        }
        return Ok(());
    }

    if args.is_empty() {
        let outcome = git.command(["commit"]).attach();
        return report_failure(out, outcome);
    }
    let flags = build_commit_flags(args, || ask_message(&mut *input, &mut *out))?;
    let invocation = git.command(iter::once("commit".to_string()).chain(flags));
    let _ = report(out, invocation.capture())?;
    Ok(())
}

/// `ci`/`checkin`: stage everything, commit, push. Each step needs the
/// previous one to succeed.
fn check_in(
    session: &Session,
    args: &[String],
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<()> {
    let git = session.git();
    if report(out, git.command(["add", "."]).capture())?.is_err() {
        return Ok(());
    }
    let message = if args.is_empty() {
        ask_message(input, out)?
    } else {
        args.join(" ")
    };
    let commit = git
        .command(["commit", ALLOW_EMPTY_MESSAGE, "-m"])
        .arg(message);
    if report(out, commit.capture())?.is_ok() {
        let _ = report(out, git.command(["push"]).capture())?;
    }
    Ok(())
}

/// Pipe colored output through `core.pager` (or the fallback pager).
fn paged(session: &Session, args: Vec<String>, out: &mut dyn Write) -> Result<()> {
    let git = session.git();
    let pager = match git.config_value("core.pager") {
        Ok(pager) if !pager.is_empty() => pager,
        _ => session.config().fallback_pager.clone(),
    };
    debug!(pager = %pager, "paging output");
    // core.pager may be any shell pipeline, e.g. `diff-so-fancy | less`.
    let pager = session.shell(format!("cat - | {pager}"));
    let outcome = git.command(args).attach_with_pipe(&pager);
    report_failure(out, outcome)
}

fn report_failure(out: &mut dyn Write, outcome: Outcome) -> Result<()> {
    if let Err(err) = outcome {
        report_error(out, &err)?;
        out.flush()?;
    }
    Ok(())
}

/// Ask for a commit message on the next input line. End of input is an
/// empty message.
fn ask_message(input: &mut dyn BufRead, out: &mut dyn Write) -> Result<String> {
    writeln!(out, "enter commit message (optional):")?;
    out.flush()?;
    let mut buf = Vec::new();
    input
        .read_until(b'\n', &mut buf)
        .context("read commit message")?;
    let line = String::from_utf8_lossy(&buf);
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
