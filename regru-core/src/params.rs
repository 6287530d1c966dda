//! Parsing of `key=value` arguments

use crate::error::{RegruError, Result};
use std::collections::BTreeMap;

/// Request or config parameters, ordered by key.
pub type Params = BTreeMap<String, String>;

/// Parse positional assignments plus repeated `--param` values.
///
/// Positional tokens are `key=value` entries, except that exactly two
/// tokens with no `=` in either are read as a `<key> <value>` pair. Only the
/// first `=` separates key from value.
pub fn parse_assignments(tokens: &[String], repeated: &[String]) -> Result<Params> {
    let mut parsed = Params::new();

    for entry in repeated {
        let (key, value) = split_assignment(entry).ok_or_else(|| {
            RegruError::usage(format!("Invalid --param value: {}. Expected key=value.", entry))
        })?;
        parsed.insert(key, value);
    }

    if let [key, value] = tokens {
        if !key.contains('=') && !value.contains('=') {
            if key.is_empty() {
                return Err(RegruError::usage("Expected <key> <value> pair."));
            }
            parsed.insert(key.clone(), value.clone());
            return Ok(parsed);
        }
    }

    for token in tokens {
        let (key, value) = split_assignment(token).ok_or_else(|| {
            RegruError::usage(format!("Invalid argument: {}. Expected key=value.", token))
        })?;
        parsed.insert(key, value);
    }

    Ok(parsed)
}

fn split_assignment(entry: &str) -> Option<(String, String)> {
    match entry.split_once('=') {
        Some((key, value)) if !key.is_empty() => Some((key.to_string(), value.to_string())),
        _ => None,
    }
}
