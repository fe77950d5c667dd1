// repl.rs

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{CompletionType, Config, DefaultEditor, Editor};

use crate::completion::CommandCompleter;

/// Shown before the candidate list is narrowed any further.
const MAX_LISTED: usize = 20;

/// Asks for a command to stash, pre-filled with `suggestion`. `None` when
/// the user cancels or submits nothing.
pub fn prompt_push(suggestion: Option<&str>) -> Result<Option<String>> {
    if suggestion.is_some() {
        eprintln!("Last command detected:");
    }
    prompt_line(suggestion.unwrap_or_default())
}

/// Asks for the new text of a stashed command, starting from `current`.
pub fn prompt_edit(current: &str) -> Result<Option<String>> {
    eprintln!("Editing:");
    prompt_line(current)
}

fn prompt_line(initial: &str) -> Result<Option<String>> {
    let mut rl = DefaultEditor::new()?;
    match rl.readline_with_initial("stash> ", (initial, "")) {
        Ok(line) => {
            let line = line.trim();
            Ok((!line.is_empty()).then(|| line.to_string()))
        }
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Selection {
    Chosen(String),
    Narrowed(Vec<String>),
    NoMatch,
}

/// Applies one line of picker input to the `shown` candidates: a row
/// number picks that row, anything else filters by substring.
pub fn select(shown: &[String], input: &str) -> Selection {
    let input = input.trim();
    if let Ok(row) = input.parse::<usize>() {
        if let Some(command) = row.checked_sub(1).and_then(|i| shown.get(i)) {
            return Selection::Chosen(command.clone());
        }
    }
    let completer = CommandCompleter::new(shown.to_vec());
    let mut matches: Vec<String> = completer
        .matches(input)
        .into_iter()
        .map(str::to_string)
        .collect();
    match matches.len() {
        0 => Selection::NoMatch,
        1 => Selection::Chosen(matches.remove(0)),
        _ => Selection::Narrowed(matches),
    }
}

fn show(title: &str, shown: &[String]) {
    eprintln!("{title}");
    for (i, command) in shown.iter().take(MAX_LISTED).enumerate() {
        eprintln!("{:>4}  {}", i + 1, command.replace('\n', "\n      "));
    }
    if shown.len() > MAX_LISTED {
        eprintln!("      ... {} more, type to filter", shown.len() - MAX_LISTED);
    }
}

/// Lets the user pick one of `candidates`. Empty input resets the filter;
/// Ctrl-C or Ctrl-D cancels.
pub fn pick(title: &str, candidates: Vec<String>) -> Result<Option<String>> {
    if candidates.is_empty() {
        return Ok(None);
    }
    let config = Config::builder()
        .completion_type(CompletionType::List)
        .build();
    let mut rl: Editor<CommandCompleter, DefaultHistory> = Editor::with_config(config)?;
    rl.set_helper(Some(CommandCompleter::new(candidates.clone())));

    let mut shown = candidates.clone();
    show(title, &shown);
    loop {
        let line = match rl.readline("filter> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        if line.trim().is_empty() {
            shown = candidates.clone();
            show(title, &shown);
            continue;
        }
        match select(&shown, &line) {
            Selection::Chosen(command) => return Ok(Some(command)),
            Selection::Narrowed(matches) => {
                shown = matches;
                show(title, &shown);
            }
            Selection::NoMatch => eprintln!("no match for {:?}", line.trim()),
        }
    }
}
