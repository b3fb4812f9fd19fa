//! Argument rewriting for the one-line `commit` form.

use anyhow::Result;

/// Flag always passed so an empty one-liner still commits.
pub const ALLOW_EMPTY_MESSAGE: &str = "--allow-empty-message";

/// Build the `git commit` arguments (without the `commit` token) for `args`.
///
/// Output starts with [`ALLOW_EMPTY_MESSAGE`], then copies `args` verbatim up
/// to the first `-m`. `-m` swallows the rest of the line, joined with single
/// spaces, as the message even when those tokens look like flags. A trailing
/// `-m` with nothing after it asks `prompt_message` for the message instead.
pub fn build_commit_flags<F>(args: &[String], prompt_message: F) -> Result<Vec<String>>
where
    F: FnOnce() -> Result<String>,
{
    let mut flags = vec![ALLOW_EMPTY_MESSAGE.to_string()];
    for (idx, arg) in args.iter().enumerate() {
        if arg == "-m" {
            let rest = &args[idx + 1..];
            let message = if rest.is_empty() {
                prompt_message()?
            } else {
                rest.join(" ")
            };
            flags.push("-m".to_string());
            flags.push(message);
            return Ok(flags);
        }
        flags.push(arg.clone());
    }
    Ok(flags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn no_prompt() -> Result<String> {
        Err(anyhow!("prompt should not be used"))
    }

    #[test]
    fn m_consumes_rest_of_line() {
        let flags = build_commit_flags(&strings(&["-m", "add", "feature", "foo"]), no_prompt)
            .expect("flags");
        assert_eq!(
            flags,
            strings(&[ALLOW_EMPTY_MESSAGE, "-m", "add feature foo"])
        );
    }

    #[test]
    fn tokens_before_m_are_kept_in_order() {
        let flags = build_commit_flags(
            &strings(&["-a", "--no-verify", "-m", "wip", "-a", "--amend"]),
            no_prompt,
        )
        .expect("flags");
        assert_eq!(
            flags,
            strings(&[ALLOW_EMPTY_MESSAGE, "-a", "--no-verify", "-m", "wip -a --amend"])
        );
    }

    #[test]
    fn without_m_all_args_are_copied() {
        let flags = build_commit_flags(&strings(&["--amend", "--no-edit"]), no_prompt)
            .expect("flags");
        assert_eq!(flags, strings(&[ALLOW_EMPTY_MESSAGE, "--amend", "--no-edit"]));
    }

    #[test]
    fn trailing_m_prompts_for_message() {
        let flags = build_commit_flags(&strings(&["-a", "-m"]), || Ok("typed later".to_string()))
            .expect("flags");
        assert_eq!(
            flags,
            strings(&[ALLOW_EMPTY_MESSAGE, "-a", "-m", "typed later"])
        );
    }

    #[test]
    fn prompt_errors_propagate() {
        let err = build_commit_flags(&strings(&["-m"]), || Err(anyhow!("stdin closed")))
            .expect_err("error");
        assert!(err.to_string().contains("stdin closed"));
    }

    #[test]
    fn only_first_m_is_special() {
        let flags =
            build_commit_flags(&strings(&["-m", "a", "-m", "b"]), no_prompt).expect("flags");
        assert_eq!(flags, strings(&[ALLOW_EMPTY_MESSAGE, "-m", "a -m b"]));
    }
}
