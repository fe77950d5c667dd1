// history.rs

//! Recall from the user's shell history files.
//!
//! Sources are tried in a fixed priority: `$HISTFILE`, then the detected
//! shell's own file, then every other supported shell. Nothing here fails
//! because a file is missing or unreadable; such a source simply has no
//! commands.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::Path;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::env::Environment;
use crate::error::HistoryError;
use crate::fish::FishParser;
use crate::parser::{HistoryParser, LineParser};
use crate::shell::{history_sources, HistorySource, ShellKind, SourceKind};

/// Reads a whole history file. Missing and unreadable files yield `None`.
fn read_history_file(path: &Path) -> Option<Bytes> {
    match std::fs::read(path) {
        Ok(data) => Some(Bytes::from(data)),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!("no history at {}", path.display());
            None
        }
        Err(err) => {
            warn!("cannot read history {}: {err}", path.display());
            None
        }
    }
}

impl HistorySource {
    /// Reads this source and picks its parser. Only `$HISTFILE` has its
    /// format guessed from the content; every shell file has a fixed one.
    fn load(&self) -> Option<(Box<dyn HistoryParser>, Bytes)> {
        let raw = read_history_file(&self.path)?;
        let parser: Box<dyn HistoryParser> = match self.kind {
            SourceKind::Override => Box::new(LineParser::sniff(&raw)),
            SourceKind::Shell(ShellKind::Bash) => Box::new(LineParser::BASH),
            SourceKind::Shell(ShellKind::Zsh) => Box::new(LineParser::ZSH),
            SourceKind::Shell(ShellKind::Fish) => Box::new(FishParser),
        };
        Some((parser, raw))
    }

    /// Up to `limit` commands from this source, newest first.
    pub fn commands(&self, limit: usize) -> Vec<String> {
        match self.load() {
            Some((parser, raw)) => parser.parse(&raw, limit),
            None => Vec::new(),
        }
    }

    /// The newest usable command in this source.
    pub fn last_command(&self) -> Option<String> {
        let (parser, raw) = self.load()?;
        parser.last_command(&raw)
    }
}

/// Merges `sources` in order into at most `limit` distinct commands.
pub fn merge_sources(sources: &[HistorySource], limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for source in sources {
        if merged.len() >= limit {
            break;
        }
        let commands = source.commands(limit);
        debug!(
            "{} commands from {}",
            commands.len(),
            source.path.display()
        );
        for command in commands {
            if merged.len() >= limit {
                break;
            }
            if seen.insert(command.clone()) {
                merged.push(command);
            }
        }
    }
    merged
}

/// Recent commands across all known history files, newest first, with no
/// duplicates and at most `limit` entries.
pub fn history(env: &Environment, limit: usize) -> Vec<String> {
    merge_sources(&history_sources(env), limit)
}

/// The most recent usable command, looking at sources in priority order.
pub fn last_command(env: &Environment) -> Option<String> {
    history_sources(env)
        .iter()
        .find_map(HistorySource::last_command)
}

/// History of one shell only, ignoring `$HISTFILE` and shell detection.
pub fn shell_history(
    env: &Environment,
    shell: ShellKind,
    limit: usize,
) -> Result<Vec<String>, HistoryError> {
    Ok(HistorySource::for_shell(shell, env)?.commands(limit))
}

pub fn bash_history(env: &Environment, limit: usize) -> Result<Vec<String>, HistoryError> {
    shell_history(env, ShellKind::Bash, limit)
}

pub fn zsh_history(env: &Environment, limit: usize) -> Result<Vec<String>, HistoryError> {
    shell_history(env, ShellKind::Zsh, limit)
}

pub fn fish_history(env: &Environment, limit: usize) -> Result<Vec<String>, HistoryError> {
    shell_history(env, ShellKind::Fish, limit)
}
