// error.rs

use std::path::PathBuf;

use thiserror::Error;

use crate::shell::ShellKind;

#[derive(Debug, Error)]
pub enum HistoryError {
    /// The default history location of `shell` lives under the home
    /// directory, and no home directory could be resolved.
    #[error("cannot locate {shell} history: no home directory")]
    HomeDirNotFound { shell: ShellKind },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cannot locate command store: no home directory")]
    HomeDirNotFound,
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed command store {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
