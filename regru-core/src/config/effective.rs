//! Effective configuration for one invocation

use super::file_config::{FileConfig, MAX_RETRIES, MAX_TIMEOUT_MS};
use super::keys::{is_secret_key, ConfigKey, SECRET_MASK};
use crate::error::{RegruError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Display;
use std::time::Duration;

/// Config error for a numeric key outside its allowed range.
pub fn out_of_range(key: ConfigKey, value: impl Display) -> RegruError {
    match key {
        ConfigKey::Timeout => RegruError::config(format!(
            "Timeout must be between 1 and {} ms, got {}",
            MAX_TIMEOUT_MS, value
        )),
        ConfigKey::Retries => RegruError::config(format!(
            "Retries must be between 0 and {}, got {}",
            MAX_RETRIES, value
        )),
        other => RegruError::config(format!("Invalid value for {}: {}", other, value)),
    }
}

/// Merged settings used for every API call of one invocation.
///
/// Never persisted. The endpoint is always an absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub endpoint: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Per-attempt request timeout in milliseconds
    pub timeout: u64,

    pub retries: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl EffectiveConfig {
    /// Promote a fully merged record, enforcing the mandatory fields.
    pub fn from_merged(merged: FileConfig) -> Result<Self> {
        let endpoint = merged
            .endpoint
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| RegruError::config("Endpoint is not configured."))?;

        if let Err(e) = url::Url::parse(&endpoint) {
            return Err(RegruError::config(format!(
                "Endpoint must be an absolute URL, got '{}' ({})",
                endpoint, e
            )));
        }

        let timeout = merged
            .timeout
            .ok_or_else(|| RegruError::config("Timeout is not configured."))?;
        if timeout == 0 || timeout > MAX_TIMEOUT_MS {
            return Err(out_of_range(ConfigKey::Timeout, timeout));
        }

        let retries = merged
            .retries
            .ok_or_else(|| RegruError::config("Retries are not configured."))?;
        if retries > MAX_RETRIES {
            return Err(out_of_range(ConfigKey::Retries, retries));
        }

        Ok(Self {
            endpoint,
            region: merged.region,
            timeout,
            retries,
            username: merged.username,
            password: merged.password,
        })
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }

    /// Both username and password are present.
    pub fn has_credentials(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }

    /// URL for a (normalized) method name.
    pub fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), method)
    }

    /// Copy with the timeout capped and retries replaced, for probes.
    pub fn for_probe(&self, timeout_cap: u64, retries: u32) -> Self {
        Self {
            timeout: self.timeout.min(timeout_cap),
            retries,
            ..self.clone()
        }
    }

    /// Key/value view, with non-empty secrets masked unless `reveal` is set.
    pub fn to_display_map(&self, reveal: bool) -> Map<String, Value> {
        let Ok(Value::Object(mut map)) = serde_json::to_value(self) else {
            return Map::new();
        };

        if !reveal {
            for (key, value) in map.iter_mut() {
                let non_empty = value.as_str().is_some_and(|s| !s.is_empty());
                if non_empty && is_secret_key(key) {
                    *value = Value::from(SECRET_MASK);
                }
            }
        }

        map
    }

    /// Selected keys; unknown or unset keys map to `null`.
    pub fn select(&self, keys: &[String], reveal: bool) -> Map<String, Value> {
        let all = self.to_display_map(reveal);
        if keys.is_empty() {
            return all;
        }

        keys.iter()
            .map(|key| (key.clone(), all.get(key).cloned().unwrap_or(Value::Null)))
            .collect()
    }
}
