// storage.rs

//! Saved commands, kept as a JSON array in `~/.stash/commands.json`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::env::Environment;
use crate::error::StorageError;

const STORE_DIR: &str = ".stash";
const STORE_FILE: &str = "commands.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SavedCommand {
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub use_count: u64,
}

#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Opens the store inside `dir`, creating the directory if needed.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|source| StorageError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: dir.join(STORE_FILE),
        })
    }

    /// Opens `~/.stash`.
    pub fn open_default(env: &Environment) -> Result<Self, StorageError> {
        let home = env.home().ok_or(StorageError::HomeDirNotFound)?;
        Self::open(home.join(STORE_DIR))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Vec<SavedCommand>, StorageError> {
        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_slice(&data).map_err(|source| StorageError::Json {
            path: self.path.clone(),
            source,
        })
    }

    pub fn save(&self, commands: &[SavedCommand]) -> Result<(), StorageError> {
        let data = serde_json::to_vec_pretty(commands).map_err(|source| StorageError::Json {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, data).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })
    }

    /// Saves `text` unless it is already stored. Returns whether it was added.
    pub fn add(&self, text: &str) -> Result<bool, StorageError> {
        let mut commands = self.load()?;
        if commands.iter().any(|c| c.text == text) {
            debug!("already stashed: {text}");
            return Ok(false);
        }
        commands.push(SavedCommand {
            text: text.to_string(),
            created_at: Utc::now(),
            use_count: 0,
        });
        self.save(&commands)?;
        Ok(true)
    }

    /// Removes `text`. Returns whether anything was removed.
    pub fn remove(&self, text: &str) -> Result<bool, StorageError> {
        let mut commands = self.load()?;
        let before = commands.len();
        commands.retain(|c| c.text != text);
        if commands.len() == before {
            return Ok(false);
        }
        self.save(&commands)?;
        Ok(true)
    }

    /// Replaces the text of a saved command, keeping its counters. If `new`
    /// is already saved the two entries are merged.
    pub fn update(&self, old: &str, new: &str) -> Result<bool, StorageError> {
        let mut commands = self.load()?;
        let Some(pos) = commands.iter().position(|c| c.text == old) else {
            return Ok(false);
        };
        let existing = commands.iter().position(|c| c.text == new).filter(|&i| i != pos);
        if let Some(existing) = existing {
            let merged = commands[pos].use_count;
            commands[existing].use_count += merged;
            commands.remove(pos);
        } else {
            commands[pos].text = new.to_string();
        }
        self.save(&commands)?;
        Ok(true)
    }

    pub fn increment_use(&self, text: &str) -> Result<(), StorageError> {
        let mut commands = self.load()?;
        if let Some(command) = commands.iter_mut().find(|c| c.text == text) {
            command.use_count += 1;
            self.save(&commands)?;
        }
        Ok(())
    }

    /// Saved texts, most used first, newest first among equals.
    pub fn list(&self) -> Result<Vec<String>, StorageError> {
        let mut commands = self.load()?;
        commands.sort_by(|a, b| {
            b.use_count
                .cmp(&a.use_count)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(commands.into_iter().map(|c| c.text).collect())
    }
}
