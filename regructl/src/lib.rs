//! REG.RU API2 CLI Library
//!
//! This library provides the core functionality for the `regru` command-line
//! tool.
//!
//! # Public API
//!
//! The primary public API is the [`client::RegruClient`], which sends
//! non-reseller API2 calls with per-attempt timeouts and retries.
//! Configuration resolution is available via [`config::resolve`] and
//! [`config::ConfigBuilder`].
//!
//! ```no_run
//! use regructl::client::{ApiCall, RegruClient};
//! use regructl::config::{resolve, ConfigOverrides};
//! use regru_core::ProcessSettings;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = resolve(&ProcessSettings, &ConfigOverrides::default())?;
//! let client = RegruClient::new()?;
//!
//! let response = client.call_checked(ApiCall::new("nop", &config)).await?;
//! println!("{:?}", response.answer());
//! # Ok(())
//! # }
//! ```

// Internal CLI implementation - not part of public API
#[doc(hidden)]
pub mod cli;

/// HTTP client for the REG.RU API2.
pub mod client;

/// Configuration resolution for the CLI tool.
pub mod config;

// Internal formatting functions - not part of public API
#[doc(hidden)]
pub mod format;

#[cfg(test)]
pub mod test_utils;
