//! regru Core Library
//!
//! Shared types for the REG.RU API2 command-line client: the error
//! taxonomy, the config schema and its on-disk store, key classification,
//! assignment parsing, and response classification.

pub mod api;
pub mod config;
pub mod error;
pub mod params;

// Re-export commonly used types
pub use api::{ensure_non_reseller, normalize_method, ApiResponse, ServiceItem};
pub use config::{
    config_path, ConfigKey, ConfigStore, EffectiveConfig, FileConfig, ProcessSettings,
    SettingsProvider, StaticSettings,
};
pub use error::*;
pub use params::{parse_assignments, Params};
