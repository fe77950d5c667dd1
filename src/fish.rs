// fish.rs

//! Fish history: one YAML-like record per command.
//!
//! ```text
//! - cmd: git commit -m 'first\nsecond'
//!   when: 1700000000
//!   paths:
//!     - src/main.rs
//! ```
//!
//! Only the `- cmd:` field matters here. Its value is escaped so that it fits
//! on one line: a newline is written as `\n` and a backslash as `\\`.

use crate::parser::HistoryParser;

const CMD_FIELD: &str = "- cmd:";

#[derive(Clone, Copy, Debug, Default)]
pub struct FishParser;

impl HistoryParser for FishParser {
    fn entries<'a>(&self, text: &'a str) -> Box<dyn Iterator<Item = String> + 'a> {
        Box::new(
            text.lines()
                .rev()
                .filter_map(|line| line.strip_prefix(CMD_FIELD))
                .map(|value| unescape_fish_command(value).trim().to_string()),
        )
    }
}

/// Decodes a `cmd` field value. Single pass, so an escaped backslash
/// followed by `n` stays a backslash and an `n`.
pub fn unescape_fish_command(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('\\') => result.push('\\'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result
}

/// Encodes a command the way fish writes it into a `cmd` field.
pub fn escape_fish_command(command: &str) -> String {
    let mut result = String::with_capacity(command.len());
    for ch in command.chars() {
        match ch {
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            _ => result.push(ch),
        }
    }
    result
}
