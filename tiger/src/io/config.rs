//! Shell configuration loaded from an optional TOML file.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Shell configuration (TOML).
///
/// Every field is optional in the file; missing fields take the defaults
/// below, which reproduce plain `git` behavior with a `less` fallback pager.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ShellConfig {
    /// Version-control program to invoke.
    pub git: String,

    /// Leading token dropped from input lines (typing `git status` out of habit).
    pub alias: String,

    /// Wrapper that runs pager and editor settings as shell fragments.
    pub shell: Vec<String>,

    /// Pager used when `core.pager` is unset.
    pub fallback_pager: String,

    /// Commands whose output is colored and sent through the pager.
    pub pager_commands: Vec<String>,

    /// Draft message file name inside `.git/`.
    pub draft_file: String,

    /// How long `git commit -t` gets to read the draft before it is removed.
    pub draft_handoff_delay_ms: u64,

    /// Show `git status -s -uall` above every prompt.
    pub show_status: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            git: "git".to_string(),
            alias: "git".to_string(),
            shell: vec!["sh".to_string(), "-c".to_string()],
            fallback_pager: "less -FRX".to_string(),
            pager_commands: vec!["log".to_string(), "diff".to_string(), "show".to_string()],
            draft_file: "COMMIT_DRAFTMSG".to_string(),
            draft_handoff_delay_ms: 100,
            show_status: true,
        }
    }
}

impl ShellConfig {
    pub fn validate(&self) -> Result<()> {
        if self.git.trim().is_empty() {
            return Err(anyhow!("git must be a non-empty program name"));
        }
        if self.shell.is_empty() || self.shell[0].trim().is_empty() {
            return Err(anyhow!("shell must be a non-empty array"));
        }
        if self.fallback_pager.trim().is_empty() {
            return Err(anyhow!("fallback_pager must be non-empty"));
        }
        if self.draft_file.trim().is_empty() {
            return Err(anyhow!("draft_file must be non-empty"));
        }
        if self.draft_file.contains(['/', '\\']) {
            return Err(anyhow!("draft_file must be a bare file name"));
        }
        if self.draft_handoff_delay_ms == 0 {
            return Err(anyhow!("draft_handoff_delay_ms must be > 0"));
        }
        Ok(())
    }

    pub fn draft_handoff_delay(&self) -> Duration {
        Duration::from_millis(self.draft_handoff_delay_ms)
    }

    /// Serialize as TOML with a trailing newline.
    pub fn to_toml(&self) -> Result<String> {
        let mut buf = toml::to_string_pretty(self).context("serialize config toml")?;
        if !buf.ends_with('\n') {
            buf.push('\n');
        }
        Ok(buf)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `ShellConfig::default()`.
pub fn load_config(path: &Path) -> Result<ShellConfig> {
    if !path.exists() {
        let cfg = ShellConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ShellConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
