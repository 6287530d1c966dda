//! Read-only readiness checks for `regru doctor`

use anyhow::Result;
use colored::*;
use regru_core::config::{self, ConfigStore};
use regru_core::SettingsProvider;
use serde::Serialize;
use serde_json::json;
use std::path::Path;

use crate::client::{ApiCall, RegruClient, Transport};
use crate::config::{resolve, ConfigOverrides};
use crate::format::{to_json, OutputFormat};

/// Timeout cap for the unauthenticated reachability probe, in ms.
const PROBE_TIMEOUT_MS: u64 = 6_000;

/// Timeout cap for the authenticated `nop`, in ms.
const LIVE_TIMEOUT_MS: u64 = 8_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    Ok,
    Warn,
    Fail,
}

impl CheckStatus {
    fn label(&self) -> &'static str {
        match self {
            CheckStatus::Ok => "OK",
            CheckStatus::Warn => "WARN",
            CheckStatus::Fail => "FAIL",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub id: &'static str,
    pub status: CheckStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl CheckResult {
    fn ok(id: &'static str, message: impl Into<String>) -> Self {
        Self {
            id,
            status: CheckStatus::Ok,
            message: message.into(),
            hint: None,
        }
    }

    fn warn(id: &'static str, message: impl Into<String>, hint: Option<&str>) -> Self {
        Self {
            id,
            status: CheckStatus::Warn,
            message: message.into(),
            hint: hint.map(str::to_string),
        }
    }

    fn fail(id: &'static str, message: impl Into<String>, hint: Option<&str>) -> Self {
        Self {
            id,
            status: CheckStatus::Fail,
            message: message.into(),
            hint: hint.map(str::to_string),
        }
    }
}

/// Whether this process can list and create files in `dir`.
///
/// Tries the operations instead of reading mode bits, so ownership and
/// privileges are taken into account.
pub fn config_dir_accessible(dir: &Path) -> bool {
    std::fs::read_dir(dir).is_ok() && tempfile::NamedTempFile::new_in(dir).is_ok()
}

/// Whether any check failed.
pub fn has_failures(checks: &[CheckResult]) -> bool {
    checks.iter().any(|c| c.status == CheckStatus::Fail)
}

/// Run every check in order. Network checks use no retries.
pub async fn run_checks<T: Transport>(
    client: &RegruClient<T>,
    settings: &dyn SettingsProvider,
    overrides: &ConfigOverrides,
) -> Vec<CheckResult> {
    let mut checks = vec![CheckResult::ok(
        "runtime",
        format!(
            "regru {} ({}/{})",
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS,
            std::env::consts::ARCH
        ),
    )];

    let config_path = config::config_path(settings);
    let config_dir = config_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_default();

    if config_dir_accessible(&config_dir) {
        checks.push(CheckResult::ok(
            "fs.config_dir",
            format!("Config dir accessible: {}", config_dir.display()),
        ));
    } else {
        checks.push(CheckResult::warn(
            "fs.config_dir",
            format!("Config dir not accessible yet: {}", config_dir.display()),
            Some("Run `regru cfg set endpoint=https://api.reg.ru/api/regru2` to create it"),
        ));
    }

    match ConfigStore::new(&config_path).load() {
        Ok(_) => checks.push(CheckResult::ok("config.parse", "Config file is valid or absent")),
        Err(e) => checks.push(CheckResult::fail(
            "config.parse",
            e.to_string(),
            Some("Fix or remove broken config file"),
        )),
    }

    let effective = match resolve(settings, overrides) {
        Ok(effective) => effective,
        Err(e) => {
            checks.push(CheckResult::fail("config.endpoint", e.to_string(), None));
            return checks;
        }
    };
    checks.push(CheckResult::ok(
        "config.endpoint",
        format!("Endpoint: {}", effective.endpoint),
    ));

    if effective.has_credentials() {
        checks.push(CheckResult::ok("auth.credentials", "Username/password present"));
    } else {
        checks.push(CheckResult::fail(
            "auth.credentials",
            "Username/password missing",
            Some("Set REGRU_USERNAME/REGRU_PASSWORD or use regru cfg set"),
        ));
    }

    // The API's public test account answers `nop` without real credentials
    let probe_config = effective.for_probe(PROBE_TIMEOUT_MS, 0);
    let probe = ApiCall::new("nop", &probe_config)
        .without_auth()
        .param("username", "test")
        .param("password", "test");
    match client.call(probe).await {
        Ok(response) if response.is_success() => {
            checks.push(CheckResult::ok("network.endpoint", "Endpoint reachable"))
        }
        Ok(_) => checks.push(CheckResult::warn(
            "network.endpoint",
            "Endpoint reachable but probe returned API error",
            None,
        )),
        Err(e) => checks.push(CheckResult::fail(
            "network.endpoint",
            e.to_string(),
            Some("Check endpoint/network/firewall"),
        )),
    }

    if effective.has_credentials() {
        let live_config = effective.for_probe(LIVE_TIMEOUT_MS, 0);
        match client.call(ApiCall::new("nop", &live_config)).await {
            Ok(response) if response.is_success() => {
                checks.push(CheckResult::ok("auth.live_nop", "Live auth call succeeded"))
            }
            Ok(response) => checks.push(CheckResult::fail(
                "auth.live_nop",
                format!(
                    "Live auth call returned API error ({})",
                    response.error_code().unwrap_or(regru_core::api::DEFAULT_ERROR_CODE)
                ),
                Some("Verify API allowlist and credentials"),
            )),
            Err(e) => checks.push(CheckResult::fail(
                "auth.live_nop",
                e.to_string(),
                Some("Verify API allowlist and credentials"),
            )),
        }
    }

    checks
}

/// Format the check list
pub fn format_checks(checks: &[CheckResult], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let failed = has_failures(checks);
            to_json(&json!({
                "status": if failed { "fail" } else { "ok" },
                "checks": checks,
                "exitCode": if failed { 1 } else { 0 },
            }))
        }
        OutputFormat::Plain => Ok(checks
            .iter()
            .map(|c| format!("{}\t{}\t{}", c.id, c.status.label(), c.message))
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Human => Ok(checks
            .iter()
            .map(|c| {
                let status = match c.status {
                    CheckStatus::Ok => c.status.label().green(),
                    CheckStatus::Warn => c.status.label().yellow(),
                    CheckStatus::Fail => c.status.label().red(),
                };
                match &c.hint {
                    Some(hint) => format!("{} {}: {} ({})", status, c.id, c.message, hint),
                    None => format!("{} {}: {}", status, c.id, c.message),
                }
            })
            .collect::<Vec<_>>()
            .join("\n")),
    }
}
