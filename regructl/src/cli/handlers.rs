//! Command execution handlers

use anyhow::{bail, Result};
use regru_core::api::ZONE_RECORD_KINDS;
use regru_core::config::{self, ConfigKey, ConfigStore, EffectiveConfig, FileConfig};
use regru_core::{parse_assignments, Params, RegruError, SettingsProvider};
use serde_json::{json, Value};
use std::path::Path;
use tracing::debug;

use crate::client::{ApiCall, RegruClient, Transport};
use crate::config::{apply_assignments, resolve, ConfigOverrides, InputSource, STDIN_PLACEHOLDER};
use crate::format::{
    format_domains, format_key_values, format_nop, format_raw, format_services, format_success,
    format_zone_records, format_zone_result, to_json, OutputFormat,
};

use super::commands::*;
use super::doctor;

/// Where the agent skill for this CLI is published.
pub const SKILL_URL: &str = "https://github.com/vforsh/regru-cli/tree/main/skill/regru";

/// Per-invocation context shared by the handlers.
pub struct Invocation<'a> {
    pub settings: &'a dyn SettingsProvider,
    pub overrides: ConfigOverrides,
    pub format: OutputFormat,
}

impl<'a> Invocation<'a> {
    pub fn new(settings: &'a dyn SettingsProvider, overrides: ConfigOverrides, format: OutputFormat) -> Self {
        Self {
            settings,
            overrides,
            format,
        }
    }

    /// Effective config for this invocation.
    pub fn config(&self) -> Result<EffectiveConfig, RegruError> {
        resolve(self.settings, &self.overrides)
    }

    fn store(&self) -> ConfigStore {
        ConfigStore::new(config::config_path(self.settings))
    }
}

/// Handle config commands
pub fn handle_config(
    command: ConfigCommands,
    inv: &Invocation<'_>,
    input: &mut dyn InputSource,
) -> Result<()> {
    match command {
        ConfigCommands::Path => {
            println!("{}", inv.store().path().display());
        }
        ConfigCommands::List => {
            let values = inv.config()?.to_display_map(false);
            println!("{}", format_key_values(&values, inv.format)?);
        }
        ConfigCommands::Get { keys, reveal } => {
            let values = inv.config()?.select(&keys, reveal);
            println!("{}", format_key_values(&values, inv.format)?);
        }
        ConfigCommands::Set { entries, stdin_key } => {
            let mut assignments = parse_assignments(&entries, &[])?;
            if let Some(key) = stdin_key {
                assignments.insert(key, STDIN_PLACEHOLDER.to_string());
            }

            let store = inv.store();
            let mut file = store.load()?;
            apply_assignments(&mut file, &assignments, input)?;
            store.save(&file)?;

            debug!(keys = ?assignments.keys().collect::<Vec<_>>(), "config updated");
            print_saved(store.path(), inv.format)?;
        }
        ConfigCommands::Unset { keys } => {
            let keys = keys
                .iter()
                .map(|k| k.parse::<ConfigKey>())
                .collect::<Result<Vec<_>, _>>()?;

            let store = inv.store();
            let mut file = store.load()?;
            for key in keys {
                file.unset(key);
            }
            store.save(&file)?;
            print_saved(store.path(), inv.format)?;
        }
        ConfigCommands::Import => {
            if inv.format != OutputFormat::Json {
                return Err(RegruError::usage(
                    "Use --json with cfg import and pipe JSON payload via stdin.",
                )
                .into());
            }

            let raw = input.read_all()?;
            if raw.trim().is_empty() {
                return Err(RegruError::usage("No JSON payload provided on stdin.").into());
            }
            let payload: Value = serde_json::from_str(&raw)
                .map_err(|_| RegruError::usage("Invalid JSON payload for cfg import."))?;

            let file = FileConfig::from_import(payload)?;
            let store = inv.store();
            store.save(&file)?;
            print_saved(store.path(), inv.format)?;
        }
        ConfigCommands::Export => {
            if inv.format != OutputFormat::Json {
                return Err(RegruError::usage("Use --json with cfg export.").into());
            }
            println!("{}", to_json(&inv.config()?)?);
        }
    }

    Ok(())
}

fn print_saved(path: &Path, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", to_json(&json!({ "ok": true, "path": path }))?),
        OutputFormat::Plain => println!("{}", path.display()),
        OutputFormat::Human => println!("{}", format_success("Config updated.")),
    }
    Ok(())
}

/// Handle doctor command
pub async fn handle_doctor<T: Transport>(client: &RegruClient<T>, inv: &Invocation<'_>) -> Result<()> {
    let checks = doctor::run_checks(client, inv.settings, &inv.overrides).await;
    println!("{}", doctor::format_checks(&checks, inv.format)?);

    if doctor::has_failures(&checks) {
        bail!("Doctor found blocking issues.");
    }
    Ok(())
}

/// Handle skill command
pub fn handle_skill(format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", to_json(&json!({ "url": SKILL_URL }))?),
        _ => println!("{}", SKILL_URL),
    }
    Ok(())
}

/// Handle nop command
pub async fn handle_nop<T: Transport>(client: &RegruClient<T>, inv: &Invocation<'_>) -> Result<()> {
    let config = inv.config()?;
    let response = client.call_checked(ApiCall::new("nop", &config)).await?;
    println!("{}", format_nop(&response, inv.format)?);
    Ok(())
}

/// Handle services commands
pub async fn handle_services<T: Transport>(
    client: &RegruClient<T>,
    command: ServicesCommands,
    inv: &Invocation<'_>,
) -> Result<()> {
    match command {
        ServicesCommands::List { servtype, state } => {
            let config = inv.config()?;
            let mut params = Params::new();
            if let Some(servtype) = servtype {
                params.insert("servtype".to_string(), servtype);
            }
            if let Some(state) = state {
                params.insert("state".to_string(), state);
            }

            let response = client
                .call_checked(ApiCall::new("service/get_list", &config).params(params))
                .await?;
            println!("{}", format_services(&response.services(), inv.format)?);
        }
    }
    Ok(())
}

/// Handle domains commands
pub async fn handle_domains<T: Transport>(
    client: &RegruClient<T>,
    command: DomainsCommands,
    inv: &Invocation<'_>,
) -> Result<()> {
    match command {
        DomainsCommands::List => {
            let config = inv.config()?;
            let response = client
                .call_checked(ApiCall::new("service/get_list", &config).param("servtype", "domain"))
                .await?;
            println!("{}", format_domains(&response.domains(), inv.format)?);
        }
    }
    Ok(())
}

/// Parameters for a zone method: `domain_name` plus extras, extras winning.
pub fn zone_params(domain: &str, extra: Params) -> Params {
    let mut params = Params::new();
    params.insert("domain_name".to_string(), domain.to_string());
    params.extend(extra);
    params
}

/// Validate a record kind for `zone add`, returning the lowercased kind.
pub fn record_kind(kind: &str) -> Result<String, RegruError> {
    let normalized = kind.trim().to_lowercase();
    if ZONE_RECORD_KINDS.contains(&normalized.as_str()) {
        Ok(normalized)
    } else {
        Err(RegruError::usage(format!("Unsupported record kind: {kind}")))
    }
}

/// Handle zone commands
pub async fn handle_zone<T: Transport>(
    client: &RegruClient<T>,
    command: ZoneCommands,
    inv: &Invocation<'_>,
) -> Result<()> {
    match command {
        ZoneCommands::Records { domain } => {
            let config = inv.config()?;
            let call = ApiCall::new("zone/get_resource_records", &config)
                .params(zone_params(&domain, Params::new()));
            let response = client.call_checked(call).await?;
            println!("{}", format_zone_records(&response, inv.format)?);
        }
        ZoneCommands::Add {
            kind,
            domain,
            params,
            param,
        } => {
            let kind = record_kind(&kind)?;
            let extra = parse_assignments(&params, &param)?;
            let config = inv.config()?;
            let call = ApiCall::new(format!("zone/add_{kind}"), &config)
                .params(zone_params(&domain, extra));
            let response = client.call_checked(call).await?;
            println!("{}", format_zone_result(&response, inv.format)?);
        }
        ZoneCommands::Remove {
            domain,
            params,
            param,
        } => {
            let extra = parse_assignments(&params, &param)?;
            let config = inv.config()?;
            let call = ApiCall::new("zone/remove_record", &config).params(zone_params(&domain, extra));
            let response = client.call_checked(call).await?;
            println!("{}", format_zone_result(&response, inv.format)?);
        }
        ZoneCommands::Update {
            domain,
            params,
            param,
        } => {
            let extra = parse_assignments(&params, &param)?;
            let config = inv.config()?;
            let call = ApiCall::new("zone/update_records", &config).params(zone_params(&domain, extra));
            let response = client.call_checked(call).await?;
            println!("{}", format_zone_result(&response, inv.format)?);
        }
        ZoneCommands::Clear { domain } => {
            let config = inv.config()?;
            let call = ApiCall::new("zone/clear", &config).params(zone_params(&domain, Params::new()));
            let response = client.call_checked(call).await?;
            println!("{}", format_zone_result(&response, inv.format)?);
        }
    }
    Ok(())
}

/// Handle do command (generic method call)
pub async fn handle_do<T: Transport>(
    client: &RegruClient<T>,
    method: String,
    params: Vec<String>,
    param: Vec<String>,
    inv: &Invocation<'_>,
) -> Result<()> {
    let params = parse_assignments(&params, &param)?;
    let config = inv.config()?;
    let response = client
        .call_checked(ApiCall::new(method, &config).params(params))
        .await?;
    println!("{}", format_raw(&response, inv.format)?);
    Ok(())
}

/// `result` / `wait` exist for parity with async CLIs; API2 calls are synchronous.
pub fn handle_unsupported(name: &str) -> Result<()> {
    Err(RegruError::usage(format!(
        "{name} is not supported: REG.RU API2 commands used by regru-cli are synchronous."
    ))
    .into())
}

/// Generate shell completion script
pub fn generate_completion(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}
