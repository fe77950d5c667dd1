// lib.rs

//! Save shell commands and recall them later, with candidates taken from
//! the user's bash, zsh and fish history files.

pub mod completion;
pub mod env;
pub mod error;
pub mod fish;
pub mod history;
pub mod parser;
pub mod repl;
pub mod shell;
pub mod storage;
pub mod terminal;
pub mod util;

pub use env::Environment;
pub use error::{HistoryError, StorageError};
pub use history::{history, last_command, shell_history};
pub use shell::{detect_shell, ShellKind};
pub use storage::Store;
