// terminal.rs

//! Hands a chosen command back to the user's shell by faking keystrokes.

use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

static CONTINUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\\s*\n\s*").unwrap());

/// Turns a backslash-continued command into a single line, so it can be
/// typed into a prompt that would otherwise run it at the first newline.
pub fn collapse_multiline(command: &str) -> String {
    CONTINUATION.replace_all(command, " ").into_owned()
}

#[cfg(unix)]
mod tty {
    use nix::sys::termios::{self, SetArg};

    nix::ioctl_write_ptr_bad!(tiocsti, libc::TIOCSTI, libc::c_char);

    /// Queues `text` as pending input on stdin's terminal. Echo is disabled
    /// while the bytes are pushed.
    pub fn push_input(text: &str) -> nix::Result<()> {
        let fd = libc::STDIN_FILENO;
        let saved = termios::tcgetattr(fd)?;
        let mut raw = saved.clone();
        termios::cfmakeraw(&mut raw);
        termios::tcsetattr(fd, SetArg::TCSANOW, &raw)?;

        let pushed = text.bytes().try_for_each(|byte| {
            let ch = byte as libc::c_char;
            // SAFETY: `ch` outlives the call and TIOCSTI only reads one byte.
            unsafe { tiocsti(fd, &ch) }.map(drop)
        });

        let restored = termios::tcsetattr(fd, SetArg::TCSANOW, &saved);
        pushed.and(restored)
    }
}

/// Inserts `command` into the terminal input buffer, as if typed.
#[cfg(unix)]
pub fn insert_input(command: &str) -> Result<()> {
    let command = collapse_multiline(command);
    tty::push_input(&command).context("failed to push input to the terminal")
}

#[cfg(not(unix))]
pub fn insert_input(_command: &str) -> Result<()> {
    anyhow::bail!("terminal input injection is not supported on this platform")
}

/// Copies `command` to the system clipboard.
pub fn copy_to_clipboard(command: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("clipboard unavailable")?;
    clipboard
        .set_text(command.to_string())
        .context("failed to copy to clipboard")
}
