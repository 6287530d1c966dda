//! Access to process environment behind an injectable provider
//!
//! Everything that reads environment variables or the home directory goes
//! through [`SettingsProvider`], so tests can hand in fixed values instead
//! of mutating the real process environment.

use std::collections::HashMap;
use std::path::PathBuf;

/// Source of environment variables and the user's home directory.
pub trait SettingsProvider {
    /// Value of an environment variable; empty values count as unset.
    fn var(&self, key: &str) -> Option<String>;

    /// The user's home directory.
    fn home_dir(&self) -> Option<PathBuf> {
        self.var("HOME").map(PathBuf::from)
    }
}

/// Reads the real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessSettings;

impl SettingsProvider for ProcessSettings {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|value| !value.is_empty())
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.var("HOME").map(PathBuf::from).or_else(dirs::home_dir)
    }
}

/// Fixed set of variables, for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct StaticSettings {
    vars: HashMap<String, String>,
}

impl StaticSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl SettingsProvider for StaticSettings {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).filter(|value| !value.is_empty()).cloned()
    }
}
