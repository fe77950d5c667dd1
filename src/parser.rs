// parser.rs

use itertools::Itertools;

/// Commands starting with one of these are the tool's own invocations and
/// never show up in recalled history.
pub const SELF_INVOCATION_PREFIXES: [&str; 2] = ["stash", "cli-stash"];

pub fn is_self_invocation(command: &str) -> bool {
    SELF_INVOCATION_PREFIXES
        .iter()
        .any(|prefix| command.starts_with(prefix))
}

fn accepts(command: &str) -> bool {
    !command.is_empty() && !is_self_invocation(command)
}

/// A history file format.
///
/// Implementors only have to walk the file from its end and decode one
/// entry at a time; filtering, dedup and the limit are shared.
pub trait HistoryParser {
    /// Decoded, trimmed entries, newest first. Entries may be empty or
    /// self-invocations; callers filter them.
    fn entries<'a>(&self, text: &'a str) -> Box<dyn Iterator<Item = String> + 'a>;

    /// Up to `limit` distinct accepted commands, newest first.
    fn parse(&self, raw: &[u8], limit: usize) -> Vec<String> {
        let text = String::from_utf8_lossy(raw);
        // bound so the boxed iterator drops before `text`
        let commands = self
            .entries(&text)
            .filter(|command| accepts(command))
            .unique()
            .take(limit)
            .collect();
        commands
    }

    /// The newest accepted command. Stops decoding as soon as one is found.
    fn last_command(&self, raw: &[u8]) -> Option<String> {
        let text = String::from_utf8_lossy(raw);
        let found = self.entries(&text).find(|command| accepts(command));
        found
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LineDialect {
    /// Any trailing `\` continues the entry; `#<epoch>` lines are timestamps.
    Bash,
    /// `: <epoch>:<duration>;` headers; literal backslashes are doubled.
    Zsh,
}

impl LineDialect {
    fn continues(self, line: &str) -> bool {
        match self {
            LineDialect::Bash => line.ends_with('\\'),
            // an even run is only escaped backslashes
            LineDialect::Zsh => line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1,
        }
    }

    fn is_delimiter(self, line: &str) -> bool {
        self == LineDialect::Bash && is_bash_timestamp(line)
    }

    /// Lines that always open a new entry, whatever precedes them.
    fn starts_entry(self, line: &str) -> bool {
        match self {
            LineDialect::Bash => is_bash_timestamp(line),
            LineDialect::Zsh => is_extended_header(line.trim_start()),
        }
    }

    fn decode(self, block: &str) -> String {
        let command = strip_extended_header(block.trim()).trim();
        match self {
            LineDialect::Bash => command.to_string(),
            LineDialect::Zsh => unescape_backslashes(command),
        }
    }
}

/// Line-oriented history: bash plain history and zsh extended history.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LineParser {
    dialect: LineDialect,
}

impl LineParser {
    pub const BASH: LineParser = LineParser { dialect: LineDialect::Bash };
    pub const ZSH: LineParser = LineParser { dialect: LineDialect::Zsh };

    pub fn new(dialect: LineDialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> LineDialect {
        self.dialect
    }

    /// Picks the dialect of a file of unknown origin: zsh when any line
    /// carries a well-formed extended header, bash otherwise.
    pub fn sniff(raw: &[u8]) -> Self {
        let text = String::from_utf8_lossy(raw);
        if text.lines().any(|line| is_extended_header(line.trim_start())) {
            Self::ZSH
        } else {
            Self::BASH
        }
    }
}

impl HistoryParser for LineParser {
    fn entries<'a>(&self, text: &'a str) -> Box<dyn Iterator<Item = String> + 'a> {
        let lines: Vec<&'a str> = text.lines().collect();
        Box::new(LineEntries {
            end: lines.len(),
            lines,
            dialect: self.dialect,
        })
    }
}

/// Walks lines from the end, regrouping continued lines into one entry.
struct LineEntries<'a> {
    lines: Vec<&'a str>,
    /// Lines at and after this index are consumed.
    end: usize,
    dialect: LineDialect,
}

impl Iterator for LineEntries<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while self.end > 0 {
            let last = self.end - 1;
            if self.dialect.is_delimiter(self.lines[last]) {
                self.end = last;
                continue;
            }
            let mut start = last;
            while start > 0
                && !self.dialect.starts_entry(self.lines[start])
                && self.dialect.continues(self.lines[start - 1])
            {
                start -= 1;
            }
            self.end = start;
            let block = self.lines[start..=last].join("\n");
            return Some(self.dialect.decode(&block));
        }
        None
    }
}

/// Drops `: <epoch>:<duration>;` from the first line of an entry. Only the
/// first `;` of the first line counts.
fn strip_extended_header(block: &str) -> &str {
    if !block.starts_with(':') {
        return block;
    }
    let first_line = block.split('\n').next().unwrap_or(block);
    match first_line.find(';') {
        Some(pos) => &block[pos + 1..],
        None => block,
    }
}

/// Strict form of the zsh header: `: <digits>:<digits>;`.
fn is_extended_header(line: &str) -> bool {
    let Some(rest) = line.strip_prefix(": ") else {
        return false;
    };
    let Some((stamp, _)) = rest.split_once(';') else {
        return false;
    };
    let Some((epoch, duration)) = stamp.split_once(':') else {
        return false;
    };
    let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    digits(epoch) && digits(duration)
}

fn is_bash_timestamp(line: &str) -> bool {
    line.trim_end()
        .strip_prefix('#')
        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
}

/// Collapses the doubled backslashes zsh writes for each literal one. Any
/// other backslash, including a continuation before a newline, is kept.
pub fn unescape_backslashes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        result.push(ch);
        if ch == '\\' && chars.peek() == Some(&'\\') {
            chars.next();
        }
    }
    result
}
