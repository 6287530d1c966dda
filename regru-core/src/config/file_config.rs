//! Persisted config file: schema, validation, and load/save
//!
//! The file is a single JSON object, pretty-printed with a trailing newline.
//! Unknown keys are rejected on load, and a missing file reads as an empty
//! config.

use super::keys::ConfigKey;
use crate::error::{RegruError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Upper bound for the per-attempt timeout, in milliseconds.
pub const MAX_TIMEOUT_MS: u64 = 120_000;

/// Upper bound for the retry count.
pub const MAX_RETRIES: u32 = 10;

/// Partial configuration record.
///
/// Used both for the persisted file and for each override layer (env,
/// flags) during resolution: an absent field never overrides a present one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Per-attempt request timeout in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl FileConfig {
    /// Layer `over` on top of `self`; fields present in `over` win.
    pub fn overlay(self, over: FileConfig) -> FileConfig {
        FileConfig {
            endpoint: over.endpoint.or(self.endpoint),
            region: over.region.or(self.region),
            timeout: over.timeout.or(self.timeout),
            retries: over.retries.or(self.retries),
            username: over.username.or(self.username),
            password: over.password.or(self.password),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == FileConfig::default()
    }

    /// Current value of a key as JSON, if set.
    pub fn get(&self, key: ConfigKey) -> Option<Value> {
        match key {
            ConfigKey::Endpoint => self.endpoint.clone().map(Value::from),
            ConfigKey::Region => self.region.clone().map(Value::from),
            ConfigKey::Timeout => self.timeout.map(Value::from),
            ConfigKey::Retries => self.retries.map(Value::from),
            ConfigKey::Username => self.username.clone().map(Value::from),
            ConfigKey::Password => self.password.clone().map(Value::from),
        }
    }

    /// Set a key from its textual form; numeric keys must parse as integers.
    pub fn set(&mut self, key: ConfigKey, raw: &str) -> Result<()> {
        match key {
            ConfigKey::Endpoint => self.endpoint = Some(raw.to_string()),
            ConfigKey::Region => self.region = Some(raw.to_string()),
            ConfigKey::Timeout => self.timeout = Some(parse_integer(key, raw)?),
            ConfigKey::Retries => self.retries = Some(parse_integer(key, raw)?),
            ConfigKey::Username => self.username = Some(raw.to_string()),
            ConfigKey::Password => self.password = Some(raw.to_string()),
        }
        Ok(())
    }

    pub fn unset(&mut self, key: ConfigKey) {
        match key {
            ConfigKey::Endpoint => self.endpoint = None,
            ConfigKey::Region => self.region = None,
            ConfigKey::Timeout => self.timeout = None,
            ConfigKey::Retries => self.retries = None,
            ConfigKey::Username => self.username = None,
            ConfigKey::Password => self.password = None,
        }
    }

    /// Build a config from an import payload.
    ///
    /// Keys outside the whitelist are rejected; string values for numeric
    /// keys are coerced.
    pub fn from_import(payload: Value) -> Result<FileConfig> {
        let Value::Object(entries) = payload else {
            return Err(RegruError::usage("Import payload must be a JSON object."));
        };

        let mut coerced = Map::new();
        for (name, value) in entries {
            let key: ConfigKey = name
                .parse()
                .map_err(|_| RegruError::usage(format!("Unsupported key in import payload: {}", name)))?;

            let value = match value {
                Value::String(s) if key.is_numeric() => match key {
                    ConfigKey::Timeout => Value::from(parse_integer::<u64>(key, &s)?),
                    _ => Value::from(parse_integer::<u32>(key, &s)?),
                },
                other => other,
            };
            coerced.insert(name, value);
        }

        serde_json::from_value(Value::Object(coerced))
            .map_err(|e| RegruError::usage(format!("Invalid import payload: {}", e)))
    }

    /// Schema violations, one message per offending field.
    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if let Some(endpoint) = &self.endpoint {
            if let Err(e) = url::Url::parse(endpoint) {
                issues.push(format!("endpoint: invalid URL '{}' ({})", endpoint, e));
            }
        }

        for (key, value) in [
            (ConfigKey::Region, &self.region),
            (ConfigKey::Username, &self.username),
            (ConfigKey::Password, &self.password),
        ] {
            if value.as_deref() == Some("") {
                issues.push(format!("{}: must not be empty", key));
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 || timeout > MAX_TIMEOUT_MS {
                issues.push(format!("timeout: must be between 1 and {}", MAX_TIMEOUT_MS));
            }
        }

        if let Some(retries) = self.retries {
            if retries > MAX_RETRIES {
                issues.push(format!("retries: must be between 0 and {}", MAX_RETRIES));
            }
        }

        issues
    }

    /// Validate user-supplied values before they are persisted.
    pub fn validate(&self) -> Result<()> {
        let issues = self.issues();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(RegruError::usage(format!("Invalid config value. {}", issues.join("; "))))
        }
    }
}

fn parse_integer<T: std::str::FromStr>(key: ConfigKey, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| RegruError::usage(format!("Invalid integer value for {}: {}", key, raw)))
}

/// Reads and writes the config file at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the file; a missing file is an empty config.
    pub fn load(&self) -> Result<FileConfig> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "config file absent, using empty config");
                return Ok(FileConfig::default());
            }
            Err(e) => return Err(e.into()),
        };

        let config: FileConfig = serde_json::from_str(&raw).map_err(|e| {
            if e.is_data() {
                RegruError::config(format!(
                    "Invalid config schema at {}. {}",
                    self.path.display(),
                    e
                ))
            } else {
                RegruError::config(format!("Invalid JSON in config file: {}", self.path.display()))
            }
        })?;

        let issues = config.issues();
        if !issues.is_empty() {
            return Err(RegruError::config(format!(
                "Invalid config schema at {}. {}",
                self.path.display(),
                issues.join("; ")
            )));
        }

        debug!(path = %self.path.display(), "loaded config file");
        Ok(config)
    }

    /// Validate and write the whole file, creating parent directories.
    pub fn save(&self, config: &FileConfig) -> Result<()> {
        config.validate()?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = format!("{}\n", serde_json::to_string_pretty(config)?);
        std::fs::write(&self.path, content)?;

        debug!(path = %self.path.display(), "saved config file");
        Ok(())
    }
}
