use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cli_stash::repl::{pick, prompt_edit, prompt_push};
use cli_stash::terminal::{copy_to_clipboard, insert_input};
use cli_stash::util::write_commands;
use cli_stash::{history, last_command, shell_history, Environment, ShellKind, Store};

/// Commands recalled from shell history when browsing it.
const DEFAULT_HISTORY_LIMIT: usize = 500;

#[derive(Parser, Debug)]
#[command(
    name = "cli-stash",
    version,
    about = "Save and recall shell commands",
    long_about = "Save frequently used shell commands and recall them later, \
                  from your stash or from your shell history."
)]
struct Cli {
    /// Directory holding the stash (default: ~/.stash)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Log what is read and skipped to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Save the last command, or the one given
    Push {
        command: Option<String>,
    },
    /// Pick a saved command and put it on the prompt
    Pop {
        /// Browse shell history instead of the stash
        #[arg(long)]
        history: bool,
        #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: usize,
    },
    /// List all saved commands
    List,
    /// Save commands piped on stdin, one per line
    Add,
    /// Print recent shell history, newest first
    History {
        /// Only read this shell's history file
        #[arg(long, value_enum)]
        shell: Option<ShellArg>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Delete a saved command
    Remove {
        command: String,
    },
    /// Change the text of a saved command
    Edit {
        command: String,
        /// Replacement text; prompted for when omitted
        new: Option<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum ShellArg {
    Bash,
    Zsh,
    Fish,
}

impl From<ShellArg> for ShellKind {
    fn from(shell: ShellArg) -> Self {
        match shell {
            ShellArg::Bash => ShellKind::Bash,
            ShellArg::Zsh => ShellKind::Zsh,
            ShellArg::Fish => ShellKind::Fish,
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("CLI_STASH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn open_store(cli: &Cli, env: &Environment) -> Result<Store> {
    let store = match &cli.store {
        Some(dir) => Store::open(dir),
        None => Store::open_default(env),
    };
    store.context("cannot open the command stash")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let env = Environment::capture();

    match &cli.command {
        Some(Commands::Push { command }) => run_push(&cli, &env, command.as_deref()),
        None => run_pop(&cli, &env, false, DEFAULT_HISTORY_LIMIT),
        Some(Commands::Pop { history, limit }) => run_pop(&cli, &env, *history, *limit),
        Some(Commands::List) => run_list(&cli, &env),
        Some(Commands::Add) => run_add(&cli, &env),
        Some(Commands::History { shell, limit }) => run_history(&env, *shell, *limit),
        Some(Commands::Remove { command }) => {
            if !open_store(&cli, &env)?.remove(command)? {
                bail!("not in the stash: {command}");
            }
            Ok(())
        }
        Some(Commands::Edit { command, new }) => run_edit(&cli, &env, command, new.as_deref()),
    }
}

/// Reports the outcome of saving one command.
fn save(store: &Store, text: &str) -> Result<()> {
    if store.add(text)? {
        eprintln!("✓ Command saved to stash!");
    } else {
        eprintln!("Already in the stash.");
    }
    Ok(())
}

fn run_push(cli: &Cli, env: &Environment, command: Option<&str>) -> Result<()> {
    let store = open_store(cli, env)?;
    let text = match command {
        Some(text) => Some(text.trim().to_string()),
        None => {
            let last = last_command(env);
            debug!("last command: {last:?}");
            prompt_push(last.as_deref())?
        }
    };
    match text.filter(|t| !t.is_empty()) {
        Some(text) => save(&store, &text)?,
        None => eprintln!("Cancelled."),
    }
    Ok(())
}

fn run_pop(cli: &Cli, env: &Environment, from_history: bool, limit: usize) -> Result<()> {
    let store = open_store(cli, env)?;
    let (title, candidates) = if from_history {
        ("Shell history:", history(env, limit))
    } else {
        ("Stashed commands:", store.list()?)
    };
    if candidates.is_empty() {
        if from_history {
            eprintln!("No shell history found.");
        } else {
            eprintln!("No saved commands. Use 'cli-stash push' to add some.");
        }
        return Ok(());
    }

    let Some(selected) = pick(title, candidates)? else {
        return Ok(());
    };
    if from_history {
        // a history pick is stashed, then the stash is offered
        save(&store, &selected)?;
        return run_pop(cli, env, false, limit);
    }
    store.increment_use(&selected)?;

    if let Err(err) = insert_input(&selected) {
        debug!("{err:#}");
        match copy_to_clipboard(&selected) {
            Ok(()) => eprintln!("Copied to clipboard: {selected}"),
            Err(err) => {
                debug!("{err:#}");
                println!("{selected}");
            }
        }
    }
    Ok(())
}

fn run_edit(cli: &Cli, env: &Environment, old: &str, new: Option<&str>) -> Result<()> {
    let store = open_store(cli, env)?;
    if !store.list()?.iter().any(|c| c == old) {
        bail!("not in the stash: {old}");
    }
    let new = match new {
        Some(text) => Some(text.trim().to_string()),
        None => prompt_edit(old)?,
    };
    match new.filter(|t| !t.is_empty()) {
        Some(new) => {
            store.update(old, &new)?;
            eprintln!("✓ Command updated.");
        }
        None => eprintln!("Cancelled."),
    }
    Ok(())
}

fn run_list(cli: &Cli, env: &Environment) -> Result<()> {
    let commands = open_store(cli, env)?.list()?;
    if commands.is_empty() {
        println!("No saved commands. Use 'cli-stash push' to add some.");
        return Ok(());
    }
    write_commands(io::stdout().lock(), &commands, true)?;
    Ok(())
}

fn stdin_is_piped() -> bool {
    !nix::unistd::isatty(libc::STDIN_FILENO).unwrap_or(true)
}

fn run_add(cli: &Cli, env: &Environment) -> Result<()> {
    if !stdin_is_piped() {
        bail!("nothing piped in. Usage: echo 'command' | cli-stash add");
    }
    let store = open_store(cli, env)?;
    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read stdin")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        store.add(line)?;
        println!("Saved: {line}");
    }
    Ok(())
}

fn run_history(env: &Environment, shell: Option<ShellArg>, limit: usize) -> Result<()> {
    let commands = match shell {
        Some(shell) => shell_history(env, shell.into(), limit)?,
        None => history(env, limit),
    };
    write_commands(io::stdout().lock(), &commands, false)?;
    Ok(())
}
