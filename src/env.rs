// env.rs

use std::collections::HashMap;
use std::path::PathBuf;

/// Read-only snapshot of the process environment.
///
/// History lookups never touch `std::env` directly; they receive one of
/// these, so tests can describe a shell session without mutating the real
/// environment.
#[derive(Clone, Debug, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
    home: Option<PathBuf>,
}

impl Environment {
    /// Captures the current process environment.
    pub fn capture() -> Self {
        let mut env = Self::from_vars(std::env::vars());
        if env.home.is_none() {
            env.home = dirs::home_dir();
        }
        env
    }

    /// Builds a snapshot from explicit `(name, value)` pairs. `HOME` is taken
    /// as the home directory when present and non-empty.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let home = vars
            .get("HOME")
            .filter(|h| !h.is_empty())
            .map(PathBuf::from);
        Self { vars, home }
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        if name == "HOME" && !value.is_empty() {
            self.home = Some(PathBuf::from(&value));
        }
        self.vars.insert(name, value);
        self
    }

    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Value of `name`, treating an empty variable as unset.
    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.var(name).is_some()
    }

    pub fn home(&self) -> Option<&PathBuf> {
        self.home.as_ref()
    }
}
