//! Output formatting utilities for the CLI
//!
//! Three renderings: human-readable (colors, tables), JSON, and a stable
//! tab-separated plain form for scripts.

use anyhow::Result;
use colored::*;
use regru_core::{ApiResponse, RegruError, ServiceItem};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tabled::{settings::Style, Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
    Plain,
}

impl OutputFormat {
    /// `--json` wins over `--plain`.
    pub fn from_flags(json: bool, plain: bool) -> Self {
        if json {
            OutputFormat::Json
        } else if plain {
            OutputFormat::Plain
        } else {
            OutputFormat::Human
        }
    }
}

/// Pretty-printed JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Scalar rendering without JSON quoting; `None` for null.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Format a key/value map (config list/get)
pub fn format_key_values(values: &Map<String, Value>, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(values),
        OutputFormat::Plain => Ok(values
            .iter()
            .map(|(key, value)| format!("{}\t{}", key, scalar(value).unwrap_or_default()))
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Human => Ok(values
            .iter()
            .map(|(key, value)| {
                let shown = scalar(value)
                    .map(|v| v.normal())
                    .unwrap_or_else(|| "(unset)".dimmed());
                format!("{}: {}", key.cyan(), shown)
            })
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

#[derive(Tabled)]
struct DomainRow {
    #[tabled(rename = "Domain")]
    dname: String,
    #[tabled(rename = "Expires")]
    expiration_date: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "ID")]
    service_id: String,
}

/// Format the domain list
pub fn format_domains(rows: &[ServiceItem], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(&json!({ "domains": rows })),
        OutputFormat::Plain => Ok(rows
            .iter()
            .map(|row| {
                format!(
                    "{}\t{}\t{}\t{}",
                    row.dname,
                    row.expiration_date,
                    row.id(),
                    row.state
                )
            })
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Human => {
            if rows.is_empty() {
                return Ok("No domains found.".to_string());
            }

            let table_rows: Vec<DomainRow> = rows
                .iter()
                .map(|row| DomainRow {
                    dname: row.dname.clone().cyan().to_string(),
                    expiration_date: row.expiration_date.clone(),
                    state: row.state.clone(),
                    service_id: row.id(),
                })
                .collect();

            let table = Table::new(table_rows).with(Style::rounded()).to_string();
            Ok(format!("{}\n{}", "Domains:".bold(), table))
        }
    }
}

#[derive(Tabled)]
struct ServiceRow {
    #[tabled(rename = "Type")]
    servtype: String,
    #[tabled(rename = "Name")]
    dname: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Expires")]
    expiration_date: String,
    #[tabled(rename = "ID")]
    service_id: String,
}

/// Format the service list
pub fn format_services(rows: &[ServiceItem], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(&json!({ "services": rows })),
        OutputFormat::Plain => Ok(rows
            .iter()
            .map(|row| {
                format!(
                    "{}\t{}\t{}\t{}\t{}",
                    row.id(),
                    row.servtype,
                    row.dname,
                    row.state,
                    row.expiration_date
                )
            })
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Human => {
            if rows.is_empty() {
                return Ok("No services found.".to_string());
            }

            let table_rows: Vec<ServiceRow> = rows
                .iter()
                .map(|row| ServiceRow {
                    servtype: row.servtype.clone().yellow().to_string(),
                    dname: row.dname.clone(),
                    state: row.state.clone(),
                    expiration_date: row.expiration_date.clone(),
                    service_id: row.id(),
                })
                .collect();

            let table = Table::new(table_rows).with(Style::rounded()).to_string();
            Ok(format!("{}\n{}", "Services:".bold(), table))
        }
    }
}

/// Format the `nop` answer (login and user id)
pub fn format_nop(response: &ApiResponse, format: OutputFormat) -> Result<String> {
    let answer = response.answer();
    let field = |name: &str| {
        answer
            .and_then(|a| a.get(name))
            .and_then(scalar)
            .unwrap_or_default()
    };
    let login = field("login");
    let user_id = field("user_id");

    match format {
        OutputFormat::Json => to_json(response),
        OutputFormat::Plain => Ok(format!("login\t{}\nuser_id\t{}", login, user_id)),
        OutputFormat::Human => Ok(format!(
            "{}\nlogin: {}\nuser_id: {}",
            "API OK".green().bold(),
            login.cyan(),
            user_id
        )),
    }
}

/// Format zone records: plain mode prints one JSON record per line
pub fn format_zone_records(response: &ApiResponse, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json | OutputFormat::Human => to_json(response),
        OutputFormat::Plain => Ok(response
            .resource_records()
            .iter()
            .map(|record| record.to_string())
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

/// Format a zone mutation result: plain mode prints `result\terror_code`
pub fn format_zone_result(response: &ApiResponse, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json | OutputFormat::Human => to_json(response),
        OutputFormat::Plain => Ok(format!(
            "{}\t{}",
            response.result().unwrap_or("unknown"),
            response.error_code().unwrap_or("-")
        )),
    }
}

/// Format an arbitrary method result: plain mode prints compact JSON
pub fn format_raw(response: &ApiResponse, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json | OutputFormat::Human => to_json(response),
        OutputFormat::Plain => Ok(serde_json::to_string(response)?),
    }
}

/// Format success message
pub fn format_success(message: &str) -> String {
    format!("{} {}", "✓".green().bold(), message)
}

/// JSON error envelope for `--json` mode.
pub fn error_envelope(message: &str, exit_code: i32, details: Option<&Value>) -> Value {
    json!({
        "error": {
            "message": message,
            "exitCode": exit_code,
            "details": details.cloned().unwrap_or(Value::Null),
        }
    })
}

/// Render a top-level failure: the envelope for JSON mode, else the message.
pub fn format_error(err: &anyhow::Error, format: OutputFormat) -> (String, i32) {
    let (exit_code, details) = match err.downcast_ref::<RegruError>() {
        Some(e) => (e.exit_code(), e.details()),
        None => (regru_core::EXIT_FAILURE, None),
    };

    let message = err.to_string();
    let rendered = match format {
        OutputFormat::Json => {
            let envelope = error_envelope(&message, exit_code, details);
            serde_json::to_string_pretty(&envelope).unwrap_or(message)
        }
        _ => message,
    };

    (rendered, exit_code)
}
