//! CLI configuration resolution
//!
//! Builds the effective configuration from four layers and applies
//! `config set` assignments to the persisted file.

use regru_core::config::{self, ConfigKey, ConfigStore, EffectiveConfig, FileConfig};
use regru_core::{Params, RegruError, SettingsProvider};
use std::io::{IsTerminal, Read};
use tracing::debug;

/// Environment variables consulted during resolution.
pub const ENV_ENDPOINT: &str = "REGRU_ENDPOINT";
pub const ENV_REGION: &str = "REGRU_REGION";
pub const ENV_TIMEOUT: &str = "REGRU_TIMEOUT";
pub const ENV_RETRIES: &str = "REGRU_RETRIES";
pub const ENV_USERNAME: &str = "REGRU_USERNAME";
pub const ENV_PASSWORD: &str = "REGRU_PASSWORD";

/// Per-invocation overrides from command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub timeout: Option<u64>,
    pub retries: Option<u32>,
}

impl From<ConfigOverrides> for FileConfig {
    fn from(overrides: ConfigOverrides) -> Self {
        FileConfig {
            endpoint: overrides.endpoint,
            region: overrides.region,
            timeout: overrides.timeout,
            retries: overrides.retries,
            ..Default::default()
        }
    }
}

/// Partial config read from `REGRU_*` variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvLayer {
    pub config: FileConfig,
    /// Integers that do not fit their key, such as a negative retry count
    pub rejected: Vec<(ConfigKey, i64)>,
}

/// Read the `REGRU_*` variables.
///
/// Numeric variables that are not integers are treated as unset; integers
/// out of range are kept in `rejected` and fail resolution like any other
/// bound violation.
pub fn env_layer(settings: &dyn SettingsProvider) -> EnvLayer {
    let mut rejected = Vec::new();
    let timeout = env_number(settings, ENV_TIMEOUT, ConfigKey::Timeout, &mut rejected);
    let retries = env_number(settings, ENV_RETRIES, ConfigKey::Retries, &mut rejected);

    EnvLayer {
        config: FileConfig {
            endpoint: settings.var(ENV_ENDPOINT),
            region: settings.var(ENV_REGION),
            timeout,
            retries,
            username: settings.var(ENV_USERNAME),
            password: settings.var(ENV_PASSWORD),
        },
        rejected,
    }
}

fn env_number<T: TryFrom<i64>>(
    settings: &dyn SettingsProvider,
    var: &str,
    key: ConfigKey,
    rejected: &mut Vec<(ConfigKey, i64)>,
) -> Option<T> {
    let value: i64 = settings.var(var)?.trim().parse().ok()?;
    match T::try_from(value) {
        Ok(number) => Some(number),
        Err(_) => {
            rejected.push((key, value));
            None
        }
    }
}

/// Builder for the effective configuration
///
/// Layers are folded left to right; a field present in a later layer
/// replaces the earlier value, an absent one never does:
/// 1. Defaults
/// 2. Config file
/// 3. Environment variables
/// 4. CLI flags
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    layers: Vec<(&'static str, FileConfig)>,
    /// Out-of-range values, with the index of the layer they came from
    rejected: Vec<(usize, ConfigKey, i64)>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    /// Create a builder seeded with the built-in defaults
    pub fn new() -> Self {
        Self {
            layers: vec![("defaults", config::defaults())],
            rejected: Vec::new(),
        }
    }

    /// Layer the persisted file config
    pub fn with_file(mut self, file: FileConfig) -> Self {
        self.layers.push(("file", file));
        self
    }

    /// Layer environment variable values
    pub fn with_env(mut self, settings: &dyn SettingsProvider) -> Self {
        let env = env_layer(settings);
        let index = self.layers.len();
        self.rejected
            .extend(env.rejected.into_iter().map(|(key, raw)| (index, key, raw)));
        self.layers.push(("env", env.config));
        self
    }

    /// Layer command-line flags (highest priority)
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.layers.push(("flags", overrides.into()));
        self
    }

    /// Merge all layers and validate the result
    pub fn build(self) -> Result<EffectiveConfig, RegruError> {
        // A rejected value still counts as present unless a later layer sets the key
        for &(index, key, raw) in &self.rejected {
            let overridden = self.layers[index + 1..]
                .iter()
                .any(|(_, layer)| layer.get(key).is_some());
            if !overridden {
                return Err(config::out_of_range(key, raw));
            }
        }

        let merged = self
            .layers
            .into_iter()
            .fold(FileConfig::default(), |acc, (source, layer)| {
                if !layer.is_empty() {
                    debug!(source, "applying config layer");
                }
                acc.overlay(layer)
            });

        EffectiveConfig::from_merged(merged)
    }
}

/// Resolve the effective configuration for this invocation.
pub fn resolve(
    settings: &dyn SettingsProvider,
    overrides: &ConfigOverrides,
) -> Result<EffectiveConfig, RegruError> {
    let store = ConfigStore::new(config::config_path(settings));
    let file = store.load()?;

    ConfigBuilder::new()
        .with_file(file)
        .with_env(settings)
        .with_overrides(overrides.clone())
        .build()
}

/// Source of piped input for `-` placeholders.
pub trait InputSource {
    /// Read everything available; an interactive terminal yields nothing.
    fn read_all(&mut self) -> std::io::Result<String>;
}

/// Reads the process's standard input.
#[derive(Debug, Default)]
pub struct StdinInput;

impl InputSource for StdinInput {
    fn read_all(&mut self) -> std::io::Result<String> {
        let mut stdin = std::io::stdin();
        if stdin.is_terminal() {
            return Ok(String::new());
        }

        let mut buf = String::new();
        stdin.read_to_string(&mut buf)?;
        Ok(buf)
    }
}

/// Reads an [`InputSource`] at most once and hands out the trimmed value.
///
/// Several keys set from `-` in one invocation share the value instead of
/// draining the stream twice.
pub struct CachedInput<'a> {
    source: &'a mut dyn InputSource,
    cached: Option<String>,
}

impl<'a> CachedInput<'a> {
    pub fn new(source: &'a mut dyn InputSource) -> Self {
        Self {
            source,
            cached: None,
        }
    }

    pub fn value(&mut self) -> Result<String, RegruError> {
        if let Some(value) = &self.cached {
            return Ok(value.clone());
        }

        let value = self.source.read_all()?.trim().to_string();
        self.cached = Some(value.clone());
        Ok(value)
    }
}

/// Marker value meaning "read this value from stdin".
pub const STDIN_PLACEHOLDER: &str = "-";

/// Apply `config set` assignments to a file config.
///
/// Secrets must come from stdin; any key given as `-` reads stdin too.
/// Empty values are rejected (use `unset` instead).
pub fn apply_assignments(
    file: &mut FileConfig,
    entries: &Params,
    input: &mut dyn InputSource,
) -> Result<(), RegruError> {
    if entries.is_empty() {
        return Err(RegruError::usage("No key/value entries provided."));
    }

    let mut stdin = CachedInput::new(input);

    for (name, raw) in entries {
        let key: ConfigKey = name.parse()?;

        let value = if key.is_secret() {
            if raw != STDIN_PLACEHOLDER {
                return Err(RegruError::usage(format!(
                    "Refusing to set secret key '{name}' via argv. Use stdin: printf \"...\" | regru cfg set {name} -"
                )));
            }
            let value = stdin.value()?;
            if value.is_empty() {
                return Err(RegruError::usage(
                    "Expected secret value from stdin, got empty input.",
                ));
            }
            value
        } else if raw == STDIN_PLACEHOLDER {
            stdin.value()?
        } else {
            raw.clone()
        };

        if value.is_empty() {
            return Err(RegruError::usage(format!(
                "Empty value for key '{name}' is not allowed. Use unset to remove keys."
            )));
        }

        file.set(key, &value)?;
    }

    file.validate()
}
