// shell.rs

use std::fmt;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use tracing::warn;

use crate::env::Environment;
use crate::error::HistoryError;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum ShellKind {
    /// Plain line history, `~/.bash_history`.
    Bash,
    /// Extended line history, `~/.zsh_history`.
    Zsh,
    /// Structured entries, `$XDG_DATA_HOME/fish/fish_history`.
    Fish,
}

impl ShellKind {
    /// Order used when nothing is detected, and for the fallbacks after the
    /// detected shell.
    pub const FALLBACK_ORDER: [ShellKind; 3] = [ShellKind::Zsh, ShellKind::Bash, ShellKind::Fish];

    pub fn name(self) -> &'static str {
        match self {
            ShellKind::Bash => "bash",
            ShellKind::Zsh => "zsh",
            ShellKind::Fish => "fish",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "bash" => Some(ShellKind::Bash),
            "zsh" => Some(ShellKind::Zsh),
            "fish" => Some(ShellKind::Fish),
            _ => None,
        }
    }

    /// Default history file for this shell.
    pub fn history_path(self, env: &Environment) -> Result<PathBuf, HistoryError> {
        let home = || {
            env.home()
                .cloned()
                .ok_or(HistoryError::HomeDirNotFound { shell: self })
        };
        match self {
            ShellKind::Bash => Ok(home()?.join(".bash_history")),
            ShellKind::Zsh => Ok(home()?.join(".zsh_history")),
            ShellKind::Fish => {
                let data_home = match env.var("XDG_DATA_HOME") {
                    Some(dir) => PathBuf::from(dir),
                    None => home()?.join(".local").join("share"),
                };
                Ok(data_home.join("fish").join("fish_history"))
            }
        }
    }
}

impl fmt::Display for ShellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Guesses the interactive shell from its version marker variables, then
/// from the file name of `$SHELL`.
pub fn detect_shell(env: &Environment) -> Option<ShellKind> {
    if env.is_set("FISH_VERSION") {
        return Some(ShellKind::Fish);
    }
    if env.is_set("ZSH_VERSION") {
        return Some(ShellKind::Zsh);
    }
    if env.is_set("BASH_VERSION") {
        return Some(ShellKind::Bash);
    }
    env.var("SHELL").and_then(|shell| shell_from_path(Path::new(shell)))
}

fn shell_from_path(path: &Path) -> Option<ShellKind> {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(ShellKind::from_name)
        .or_else(|| {
            // `zsh.exe`, `bash-5.2` and friends
            path.file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.split('-').next())
                .and_then(ShellKind::from_name)
        })
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SourceKind {
    /// `$HISTFILE`; line format, dialect sniffed from content.
    Override,
    Shell(ShellKind),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct HistorySource {
    pub kind: SourceKind,
    pub path: PathBuf,
}

impl HistorySource {
    pub fn for_shell(shell: ShellKind, env: &Environment) -> Result<Self, HistoryError> {
        Ok(Self {
            kind: SourceKind::Shell(shell),
            path: shell.history_path(env)?,
        })
    }

    pub fn from_override(env: &Environment) -> Option<Self> {
        env.var("HISTFILE").map(|path| Self {
            kind: SourceKind::Override,
            path: PathBuf::from(path),
        })
    }
}

/// Resolved form of `path` when it exists, the path itself otherwise.
fn same_file_key(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Shell try-order: the detected shell first, then the remaining shells.
pub fn shell_order(detected: Option<ShellKind>) -> Vec<ShellKind> {
    detected
        .into_iter()
        .chain(ShellKind::FALLBACK_ORDER)
        .unique()
        .collect()
}

/// Every source worth reading, most authoritative first. Sources whose path
/// cannot be resolved are logged and left out. Two paths naming the same
/// file, through a symlink or `..`, are read once.
pub fn history_sources(env: &Environment) -> Vec<HistorySource> {
    let shells = shell_order(detect_shell(env)).into_iter().filter_map(|shell| {
        HistorySource::for_shell(shell, env)
            .map_err(|err| warn!("skipping {shell} history: {err}"))
            .ok()
    });
    HistorySource::from_override(env)
        .into_iter()
        .chain(shells)
        .unique_by(|source| same_file_key(&source.path))
        .collect()
}
