// completion.rs

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

/// Completes the filter prompt with stashed or recalled commands.
pub struct CommandCompleter {
    candidates: Vec<String>,
}

impl CommandCompleter {
    pub fn new(candidates: Vec<String>) -> Self {
        Self { candidates }
    }

    /// Candidates containing `query`, ignoring case, in their original order.
    pub fn matches(&self, query: &str) -> Vec<&str> {
        let query = query.to_lowercase();
        self.candidates
            .iter()
            .filter(|c| c.to_lowercase().contains(&query))
            .map(String::as_str)
            .collect()
    }
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> Result<(usize, Vec<Pair>), ReadlineError> {
        let completions = self
            .matches(&line[..pos])
            .into_iter()
            .map(|c| Pair {
                display: c.replace('\n', " "),
                replacement: c.to_string(),
            })
            .collect();
        Ok((0, completions))
    }
}

impl Hinter for CommandCompleter {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if line.is_empty() || pos < line.len() {
            return None;
        }
        self.candidates
            .iter()
            .find(|c| c.starts_with(line) && c.len() > line.len())
            .map(|c| c[line.len()..].to_string())
    }
}

impl Highlighter for CommandCompleter {}

impl Validator for CommandCompleter {}

impl Helper for CommandCompleter {}
