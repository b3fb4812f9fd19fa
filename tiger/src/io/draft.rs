//! Draft commit messages kept under `.git/` between `draft` and `commit`.
//!
//! The draft shares its path with whatever `git commit -t` is pointed at, so
//! handing it over to git's own editor session is a timed race: git gets a
//! short head start to read the template, then the file is removed. There is
//! no signal telling us git is done reading it.

use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, instrument};

use crate::io::git::Git;
use crate::io::process::{CapturedOutput, Outcome};

/// Path of the draft file for the repository containing `git`'s workdir.
pub fn draft_path(git: &Git, file_name: &str) -> Result<PathBuf> {
    let root = git
        .work_tree_root()
        .context("no repository for the draft file")?;
    Ok(root.join(".git").join(file_name))
}

/// True when the draft exists. Errors other than "not found" are fatal.
pub fn draft_exists(path: &Path) -> Result<bool> {
    match fs::metadata(path) {
        Ok(_) => Ok(true),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err).with_context(|| format!("check draft {}", path.display())),
    }
}

/// Remove the draft; a draft that is already gone is fine.
pub fn remove_draft(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "draft removed");
            Ok(())
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).with_context(|| format!("remove draft {}", path.display())),
    }
}

/// Commit with the whole draft as the literal message, then remove the draft.
///
/// The draft is removed whether or not the commit succeeds. Its bytes are
/// passed through as-is, whatever encoding the editor wrote.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn commit_from_draft(git: &Git, path: &Path) -> Result<CapturedOutput> {
    let message = fs::read(path).with_context(|| format!("read draft {}", path.display()))?;
    info!(bytes = message.len(), "committing with draft message");
    let captured = git
        .command(["commit", "-m"])
        .arg(message_arg(message))
        .capture();
    remove_draft(path)?;
    Ok(captured)
}

#[cfg(unix)]
fn message_arg(bytes: Vec<u8>) -> OsString {
    use std::os::unix::ffi::OsStringExt;
    OsString::from_vec(bytes)
}

#[cfg(not(unix))]
fn message_arg(bytes: Vec<u8>) -> OsString {
    OsString::from(String::from_utf8_lossy(&bytes).into_owned())
}

/// Open git's own commit editor seeded with the draft (`commit -t`).
///
/// The commit runs attached on a worker thread; the draft is removed after
/// `delay` while git's editor may still be open. Both are joined before
/// returning.
#[instrument(skip_all, fields(path = %path.display(), delay_ms = delay.as_millis()))]
pub fn commit_with_template(git: &Git, path: &Path, delay: Duration) -> Result<Outcome> {
    let commit = git
        .command(["commit", "-t"])
        .arg(path);
    let handle = thread::spawn(move || commit.attach());

    thread::sleep(delay);
    let removed = remove_draft(path);

    let outcome = handle
        .join()
        .map_err(|_| anyhow!("commit thread panicked"))?;
    removed?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TestRepo, fake_program};

    #[test]
    fn draft_path_lives_in_git_dir() {
        let repo = TestRepo::new().expect("repo");
        let git = Git::new("git", repo.path().join("."));
        let path = draft_path(&git, "COMMIT_DRAFTMSG").expect("path");
        assert!(path.ends_with(".git/COMMIT_DRAFTMSG"));
        assert!(path.parent().expect("parent").is_dir());
    }

    #[test]
    fn draft_path_requires_repository() {
        let temp = tempfile::tempdir().expect("tempdir");
        let git = Git::new("git", temp.path());
        assert!(draft_path(&git, "COMMIT_DRAFTMSG").is_err());
    }

    #[test]
    fn missing_draft_is_not_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("COMMIT_DRAFTMSG");
        assert!(!draft_exists(&path).expect("exists"));
        remove_draft(&path).expect("remove missing");
        fs::write(&path, "msg").expect("write");
        assert!(draft_exists(&path).expect("exists"));
    }

    #[test]
    fn commit_from_draft_uses_full_contents_and_removes_file() {
        let repo = TestRepo::new().expect("repo");
        repo.write_file("a.txt", "a").expect("write");
        repo.git(&["add", "a.txt"]).expect("add");
        let git = Git::new("git", repo.path());
        let path = draft_path(&git, "COMMIT_DRAFTMSG").expect("path");
        fs::write(&path, "Add a\n\nLonger body\nsecond line\n").expect("write draft");

        let captured = commit_from_draft(&git, &path).expect("commit");

        assert!(captured.outcome.is_ok(), "{captured:?}");
        assert!(!path.exists());
        let message = repo.head_message().expect("log");
        assert_eq!(message.trim_end(), "Add a\n\nLonger body\nsecond line");
    }

    #[test]
    fn commit_from_draft_removes_file_when_commit_fails() {
        let repo = TestRepo::new().expect("repo");
        let git = Git::new("git", repo.path());
        let path = draft_path(&git, "COMMIT_DRAFTMSG").expect("path");
        fs::write(&path, "nothing staged").expect("write draft");

        let captured = commit_from_draft(&git, &path).expect("commit");

        assert!(captured.outcome.is_err());
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn commit_from_draft_keeps_non_utf8_bytes() {
        let repo = TestRepo::new().expect("repo");
        repo.git(&["config", "i18n.commitEncoding", "ISO-8859-1"])
            .expect("config");
        repo.write_file("a.txt", "a").expect("write");
        repo.git(&["add", "a.txt"]).expect("add");
        let git = Git::new("git", repo.path());
        let path = draft_path(&git, "COMMIT_DRAFTMSG").expect("path");
        fs::write(&path, b"Caf\xe9 fix\n").expect("write draft");

        let captured = commit_from_draft(&git, &path).expect("commit");

        assert!(captured.outcome.is_ok(), "{captured:?}");
        assert!(!path.exists());
        assert_eq!(repo.commit_count().expect("count"), 1);
        let raw = repo.git(&["cat-file", "commit", "HEAD"]).expect("cat-file");
        assert!(raw.contains("Caf\u{fffd} fix"), "{raw}");
    }

    #[test]
    fn template_commit_sees_draft_then_it_disappears() {
        let temp = tempfile::tempdir().expect("tempdir");
        let seen = temp.path().join("seen.txt");
        let after = temp.path().join("after.txt");
        // args: commit -t <path>
        let fake_git = fake_program(
            temp.path(),
            "fake-git",
            &format!(
                "cp \"$3\" '{seen}'\nsleep 1\nif [ -e \"$3\" ]; then echo present > '{after}'; else echo gone > '{after}'; fi\nexit 1\n",
                seen = seen.display(),
                after = after.display()
            ),
        )
        .expect("fake git");
        let draft = temp.path().join("COMMIT_DRAFTMSG");
        fs::write(&draft, "template body\n").expect("write draft");
        let git = Git::new(fake_git.to_string_lossy(), temp.path());

        let outcome =
            commit_with_template(&git, &draft, Duration::from_millis(300)).expect("commit");

        assert!(outcome.is_err());
        assert!(!draft.exists());
        assert_eq!(fs::read_to_string(&seen).expect("seen"), "template body\n");
        assert_eq!(fs::read_to_string(&after).expect("after").trim(), "gone");
    }

    #[test]
    fn template_commit_waits_for_commit_to_finish() {
        let temp = tempfile::tempdir().expect("tempdir");
        let done = temp.path().join("done");
        let fake_git = fake_program(
            temp.path(),
            "fake-git",
            &format!("sleep 0.5\ntouch '{}'\n", done.display()),
        )
        .expect("fake git");
        let draft = temp.path().join("COMMIT_DRAFTMSG");
        fs::write(&draft, "x").expect("write draft");
        let git = Git::new(fake_git.to_string_lossy(), temp.path());

        let outcome =
            commit_with_template(&git, &draft, Duration::from_millis(50)).expect("commit");

        assert!(outcome.is_ok());
        assert!(done.exists());
        assert!(!draft.exists());
    }
}
