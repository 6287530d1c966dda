//! Config key names: the mutable whitelist and the secret classification

use crate::error::RegruError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Shown in place of a secret value.
pub const SECRET_MASK: &str = "********";

/// Names treated as secrets wherever they appear.
///
/// Only `password` is a real config field today; the rest are kept so a
/// future token-based field is masked from day one.
pub const SECRET_KEYS: [&str; 6] = ["password", "token", "secret", "apikey", "api_key", "sig"];

/// Whether a key name holds a secret (case-insensitive).
pub fn is_secret_key(key: &str) -> bool {
    let key = key.to_lowercase();
    SECRET_KEYS.contains(&key.as_str())
}

/// Keys that may be changed through the config interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigKey {
    Endpoint,
    Region,
    Timeout,
    Retries,
    Username,
    Password,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 6] = [
        ConfigKey::Endpoint,
        ConfigKey::Region,
        ConfigKey::Timeout,
        ConfigKey::Retries,
        ConfigKey::Username,
        ConfigKey::Password,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::Endpoint => "endpoint",
            ConfigKey::Region => "region",
            ConfigKey::Timeout => "timeout",
            ConfigKey::Retries => "retries",
            ConfigKey::Username => "username",
            ConfigKey::Password => "password",
        }
    }

    pub fn is_secret(&self) -> bool {
        is_secret_key(self.as_str())
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ConfigKey::Timeout | ConfigKey::Retries)
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = RegruError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| RegruError::usage(format!("Unsupported config key: {}", s)))
    }
}
