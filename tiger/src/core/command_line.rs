//! Tokenizing input lines and classifying them into shell commands.

/// One whitespace-tokenized input line with the forwarding alias removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub name: String,
    pub args: Vec<String>,
}

impl CommandLine {
    /// Split `line` on whitespace, dropping a leading `alias` token.
    ///
    /// Returns `None` when nothing is left to run. There is no quoting: every
    /// run of non-whitespace characters is one token.
    pub fn parse(line: &str, alias: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace().peekable();
        if !alias.is_empty() && tokens.peek() == Some(&alias) {
            tokens.next();
        }
        let name = tokens.next()?.to_string();
        Some(Self {
            name,
            args: tokens.map(str::to_string).collect(),
        })
    }

    /// Command name followed by its arguments.
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens = Vec::with_capacity(self.args.len() + 1);
        tokens.push(self.name.clone());
        tokens.extend(self.args.iter().cloned());
        tokens
    }
}

/// What the dispatcher should do with a parsed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `cd <path...>`; `None` when no path was given.
    ChangeDir(Option<String>),
    /// `exit` or `quit`.
    Exit,
    /// `draft`: open the draft message in the editor.
    Draft,
    /// `commit [args...]`.
    Commit(Vec<String>),
    /// `ci` / `checkin [message...]`: add everything, commit, push.
    CheckIn(Vec<String>),
    /// Pager command with `--color` injected; full git argument list.
    Paged(Vec<String>),
    /// Anything else, forwarded verbatim to git.
    Forward(Vec<String>),
}

impl Command {
    /// Classify a parsed line. Matching is exact and case-sensitive.
    pub fn classify(line: CommandLine, pager_commands: &[String]) -> Self {
        match line.name.as_str() {
            "cd" => {
                if line.args.is_empty() {
                    Command::ChangeDir(None)
                } else {
                    Command::ChangeDir(Some(line.args.join(" ")))
                }
            }
            "exit" | "quit" => Command::Exit,
            "draft" => Command::Draft,
            "commit" => Command::Commit(line.args),
            "ci" | "checkin" => Command::CheckIn(line.args),
            name if pager_commands.iter().any(|cmd| cmd == name) => {
                let mut args = Vec::with_capacity(line.args.len() + 2);
                args.push(line.name);
                args.push("--color".to_string());
                args.extend(line.args);
                Command::Paged(args)
            }
            _ => Command::Forward(line.tokens()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pagers() -> Vec<String> {
        vec!["log".to_string(), "diff".to_string(), "show".to_string()]
    }

    fn classify(line: &str) -> Option<Command> {
        CommandLine::parse(line, "git").map(|parsed| Command::classify(parsed, &pagers()))
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn alias_prefix_is_stripped_before_matching() {
        assert_eq!(
            CommandLine::parse("git status -s", "git"),
            CommandLine::parse("status -s", "git")
        );
        assert_eq!(classify("git exit"), Some(Command::Exit));
    }

    #[test]
    fn alias_only_strips_first_token() {
        let parsed = CommandLine::parse("git git", "git").expect("parsed");
        assert_eq!(parsed.name, "git");
        assert!(parsed.args.is_empty());
    }

    #[test]
    fn blank_lines_and_bare_alias_are_empty() {
        assert_eq!(CommandLine::parse("", "git"), None);
        assert_eq!(CommandLine::parse("   \t ", "git"), None);
        assert_eq!(CommandLine::parse("git", "git"), None);
    }

    #[test]
    fn empty_alias_disables_stripping() {
        let parsed = CommandLine::parse("git status", "").expect("parsed");
        assert_eq!(parsed.tokens(), strings(&["git", "status"]));
    }

    #[test]
    fn tokens_split_on_any_whitespace() {
        let parsed = CommandLine::parse("  add   a.txt\tb.txt ", "git").expect("parsed");
        assert_eq!(parsed.name, "add");
        assert_eq!(parsed.args, strings(&["a.txt", "b.txt"]));
    }

    #[test]
    fn cd_joins_path_tokens_with_spaces() {
        assert_eq!(
            classify("cd My Documents"),
            Some(Command::ChangeDir(Some("My Documents".to_string())))
        );
        assert_eq!(classify("cd"), Some(Command::ChangeDir(None)));
    }

    #[test]
    fn quit_and_exit_both_stop() {
        assert_eq!(classify("quit"), Some(Command::Exit));
        assert_eq!(classify("exit now"), Some(Command::Exit));
    }

    #[test]
    fn checkin_aliases_keep_message_tokens() {
        let expected = Some(Command::CheckIn(strings(&["fix", "typo"])));
        assert_eq!(classify("ci fix typo"), expected);
        assert_eq!(classify("checkin fix typo"), expected);
    }

    #[test]
    fn log_is_rewritten_with_color_flag() {
        assert_eq!(
            classify("log --oneline -5"),
            Some(Command::Paged(strings(&["log", "--color", "--oneline", "-5"])))
        );
        assert_eq!(
            classify("git show"),
            Some(Command::Paged(strings(&["show", "--color"])))
        );
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert_eq!(
            classify("Commit -m hi"),
            Some(Command::Forward(strings(&["Commit", "-m", "hi"])))
        );
        assert_eq!(classify("LOG"), Some(Command::Forward(strings(&["LOG"]))));
    }

    #[test]
    fn unknown_commands_forward_verbatim() {
        assert_eq!(
            classify("status -s -uall"),
            Some(Command::Forward(strings(&["status", "-s", "-uall"])))
        );
    }
}
