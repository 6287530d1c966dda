//! Configuration types for the regru CLI
//!
//! - [`file_config`] - Persisted partial config and its store
//! - [`effective`] - Merged per-invocation config
//! - [`keys`] - Mutable key whitelist and secret classification
//! - [`paths`] - Config file location
//! - [`settings`] - Injectable environment access

pub mod effective;
pub mod file_config;
pub mod keys;
pub mod paths;
pub mod settings;

pub use effective::{out_of_range, EffectiveConfig};
pub use file_config::{ConfigStore, FileConfig, MAX_RETRIES, MAX_TIMEOUT_MS};
pub use keys::{is_secret_key, ConfigKey, SECRET_KEYS, SECRET_MASK};
pub use paths::config_path;
pub use settings::{ProcessSettings, SettingsProvider, StaticSettings};

/// API endpoint used when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "https://api.reg.ru/api/regru2";

/// Per-attempt timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 20_000;

/// Retries after the first attempt.
pub const DEFAULT_RETRIES: u32 = 1;

/// Built-in defaults, the bottom layer of resolution.
pub fn defaults() -> FileConfig {
    FileConfig {
        endpoint: Some(DEFAULT_ENDPOINT.to_string()),
        timeout: Some(DEFAULT_TIMEOUT_MS),
        retries: Some(DEFAULT_RETRIES),
        ..Default::default()
    }
}
