use std::collections::HashSet;
use std::path::Path;

use cli_stash::fish::escape_fish_command;
use cli_stash::history::{bash_history, fish_history, zsh_history};
use cli_stash::parser::is_self_invocation;
use cli_stash::{history, last_command, shell_history, Environment, HistoryError, ShellKind};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tempfile::TempDir;

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

/// A fake home directory and an environment pointing at it.
fn home() -> (TempDir, Environment) {
    let dir = TempDir::new().unwrap();
    let env = Environment::default().with_home(dir.path());
    (dir, env)
}

fn fish_file(commands: &[&str]) -> String {
    commands
        .iter()
        .enumerate()
        .map(|(i, c)| format!("- cmd: {}\n  when: {}\n", escape_fish_command(c), 1_700_000_000 + i))
        .collect()
}

#[test]
fn last_command_from_extended_history() {
    let (dir, env) = home();
    write(
        &dir.path().join(".zsh_history"),
        ": 100:0;echo first\n: 101:0;echo second\n: 102:0;git status\n",
    );
    assert_eq!(last_command(&env).as_deref(), Some("git status"));
}

#[test]
fn last_command_skips_own_invocations() {
    let (dir, env) = home();
    write(&dir.path().join(".zsh_history"), "echo hello\nstash push\nstash\n");
    assert_eq!(last_command(&env).as_deref(), Some("echo hello"));
}

#[test]
fn last_command_from_plain_bash_history() {
    let (dir, env) = home();
    write(&dir.path().join(".bash_history"), "cd /tmp\nls\npwd\n");
    assert_eq!(last_command(&env).as_deref(), Some("pwd"));
}

#[test]
fn continuation_is_one_command() {
    let (dir, env) = home();
    write(&dir.path().join(".bash_history"), "ls\nfoo \\\nbar\n");
    let commands = history(&env, 10);
    assert_eq!(commands, vec!["foo \\\nbar", "ls"]);
}

#[test]
fn nothing_anywhere_is_empty_not_an_error() {
    let (_dir, env) = home();
    assert!(history(&env, 10).is_empty());
    assert_eq!(last_command(&env), None);
    assert_eq!(bash_history(&env, 10).unwrap(), Vec::<String>::new());
}

#[test]
fn no_home_directory_degrades_to_empty() {
    let env = Environment::default();
    assert!(history(&env, 10).is_empty());
    assert_eq!(last_command(&env), None);
    assert!(matches!(
        zsh_history(&env, 10),
        Err(HistoryError::HomeDirNotFound { shell: ShellKind::Zsh })
    ));
}

#[test]
fn histfile_is_read_first() {
    let (dir, env) = home();
    let custom = dir.path().join("custom_history");
    write(&custom, "make release\n");
    write(&dir.path().join(".zsh_history"), ": 1:0;git pull\n");
    let env = env.with_var("HISTFILE", custom.to_string_lossy());

    assert_eq!(last_command(&env).as_deref(), Some("make release"));
    assert_eq!(history(&env, 10), vec!["make release", "git pull"]);
}

#[test]
fn empty_histfile_falls_through_to_shells() {
    let (dir, env) = home();
    let custom = dir.path().join("custom_history");
    write(&custom, "stash\n\n");
    write(&dir.path().join(".bash_history"), "htop\n");
    let env = env.with_var("HISTFILE", custom.to_string_lossy());
    assert_eq!(last_command(&env).as_deref(), Some("htop"));
}

#[test]
fn detected_shell_is_tried_first() {
    let (dir, env) = home();
    write(&dir.path().join(".zsh_history"), ": 1:0;from zsh\n");
    write(&dir.path().join(".bash_history"), "from bash\n");
    write(
        &dir.path().join(".local/share/fish/fish_history"),
        &fish_file(&["from fish"]),
    );

    // zsh leads the fallback order
    assert_eq!(last_command(&env).as_deref(), Some("from zsh"));

    let fish = env.clone().with_var("FISH_VERSION", "3.7.1");
    assert_eq!(last_command(&fish).as_deref(), Some("from fish"));
    assert_eq!(history(&fish, 10), vec!["from fish", "from zsh", "from bash"]);

    let bash = env.with_var("SHELL", "/bin/bash");
    assert_eq!(last_command(&bash).as_deref(), Some("from bash"));
}

#[test]
fn fish_history_under_xdg_data_home() {
    let (dir, env) = home();
    let data = dir.path().join("data");
    write(
        &data.join("fish/fish_history"),
        &fish_file(&["ls", "printf 'a\\nb'", "echo one\necho two"]),
    );
    let env = env.with_var("XDG_DATA_HOME", data.to_string_lossy());
    assert_eq!(
        fish_history(&env, 10).unwrap(),
        vec!["echo one\necho two", "printf 'a\\nb'", "ls"]
    );
}

#[test]
fn single_source_ignores_histfile_and_detection() {
    let (dir, env) = home();
    let custom = dir.path().join("custom_history");
    write(&custom, "from histfile\n");
    write(&dir.path().join(".bash_history"), "from bash\n");
    let env = env
        .with_var("HISTFILE", custom.to_string_lossy())
        .with_var("ZSH_VERSION", "5.9");
    assert_eq!(
        shell_history(&env, ShellKind::Bash, 10).unwrap(),
        vec!["from bash"]
    );
    assert!(zsh_history(&env, 10).unwrap().is_empty());
}

#[test]
fn merge_deduplicates_across_sources() {
    let (dir, env) = home();
    write(&dir.path().join(".zsh_history"), ": 1:0;make\n: 2:0;ls\n");
    write(&dir.path().join(".bash_history"), "ls\npwd\nmake\n");
    assert_eq!(history(&env, 10), vec!["ls", "make", "pwd"]);
    assert_eq!(history(&env, 2), vec!["ls", "make"]);
}

fn command() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,6}( [a-z]{1,4}){0,2}",
        Just("stash".to_string()),
        Just("stash push".to_string()),
        Just("cli-stash pop".to_string()),
    ]
}

/// Index of a command's newest usable occurrence in one source.
fn newest_index(on_disk: &[String], command: &str) -> Option<usize> {
    on_disk.iter().rposition(|c| c == command)
}

proptest! {
    #[test]
    fn merged_history_invariants(
        zsh in prop::collection::vec(command(), 0..20),
        bash in prop::collection::vec(command(), 0..20),
        fish in prop::collection::vec(command(), 0..20),
        limit in 0usize..30,
    ) {
        let (dir, env) = home();
        let zsh_text: String = zsh.iter().enumerate().map(|(i, c)| format!(": {i}:0;{c}\n")).collect();
        let bash_text: String = bash.iter().map(|c| format!("{c}\n")).collect();
        let fish_refs: Vec<&str> = fish.iter().map(String::as_str).collect();
        write(&dir.path().join(".zsh_history"), &zsh_text);
        write(&dir.path().join(".bash_history"), &bash_text);
        write(&dir.path().join(".local/share/fish/fish_history"), &fish_file(&fish_refs));

        let merged = history(&env, limit);

        prop_assert!(merged.len() <= limit);
        let unique: HashSet<&String> = merged.iter().collect();
        prop_assert_eq!(unique.len(), merged.len());
        prop_assert!(merged.iter().all(|c| !is_self_invocation(c)));

        // with nothing detected the priority is zsh, bash, fish; each
        // command comes from the first of them that has it
        let sources = [&zsh, &bash, &fish];
        let origin = |command: &String| sources.iter().position(|s| s.contains(command));
        for (i, source) in sources.iter().enumerate() {
            let positions: Vec<usize> = merged
                .iter()
                .filter(|c| origin(*c) == Some(i))
                .filter_map(|c| newest_index(source, c))
                .collect();
            prop_assert!(positions.windows(2).all(|w| w[0] > w[1]));
        }
        let origins: Vec<usize> = merged.iter().filter_map(origin).collect();
        prop_assert!(origins.windows(2).all(|w| w[0] <= w[1]));

        let every: HashSet<&String> = zsh.iter().chain(&bash).chain(&fish)
            .filter(|c| !is_self_invocation(c))
            .collect();
        prop_assert_eq!(merged.len(), every.len().min(limit));
    }
}
