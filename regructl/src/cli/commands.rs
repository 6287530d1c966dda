//! CLI command and subcommand definitions

use crate::config::ConfigOverrides;
use clap::{Parser, Subcommand};
use regru_core::config::{DEFAULT_ENDPOINT, MAX_RETRIES, MAX_TIMEOUT_MS};

/// REG.RU API2 CLI (non-reseller)
#[derive(Parser, Debug)]
#[command(name = "regru")]
#[command(version, about = "REG.RU API2 CLI (non-reseller)", long_about = None)]
pub struct Cli {
    /// JSON output
    #[arg(long, global = true)]
    pub json: bool,

    /// Stable plain (tab-separated) output
    #[arg(long, global = true)]
    pub plain: bool,

    /// Suppress non-essential logs
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Request timeout in milliseconds
    #[arg(long, global = true, value_name = "MS",
          value_parser = clap::value_parser!(u64).range(1..=MAX_TIMEOUT_MS))]
    pub timeout: Option<u64>,

    /// Retry count for API calls
    #[arg(long, global = true, value_name = "COUNT",
          value_parser = clap::value_parser!(u32).range(0..=MAX_RETRIES as i64))]
    pub retries: Option<u32>,

    #[arg(long, global = true, value_name = "URL", help = format!("Override API endpoint (default: {})", DEFAULT_ENDPOINT))]
    pub endpoint: Option<String>,

    /// Optional region label for future usage
    #[arg(long, global = true, value_name = "NAME")]
    pub region: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Config overrides carried by the global flags.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            endpoint: self.endpoint.clone(),
            region: self.region.clone(),
            timeout: self.timeout,
            retries: self.retries,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage regru-cli configuration
    #[command(visible_alias = "cfg", after_help = CONFIG_EXAMPLES)]
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Run read-only readiness checks
    #[command(visible_alias = "check")]
    Doctor,

    /// Print skill install URL
    Skill,

    /// Run the nop method with current credentials
    Nop,

    /// Service-related commands
    Services {
        #[command(subcommand)]
        command: ServicesCommands,
    },

    /// Domain commands
    Domains {
        #[command(subcommand)]
        command: DomainsCommands,
    },

    /// Zone (DNS) operations
    Zone {
        #[command(subcommand)]
        command: ZoneCommands,
    },

    /// Execute any non-reseller REG.RU API2 method
    #[command(visible_aliases = ["run", "gen"])]
    Do {
        /// API method like service/get_list
        method: String,

        /// key=value pairs
        params: Vec<String>,

        /// Extra parameter (repeatable)
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
        param: Vec<String>,
    },

    /// Not supported: REG.RU API2 methods in this CLI are synchronous
    Result {
        /// Placeholder id
        id: String,
    },

    /// Not supported: REG.RU API2 methods in this CLI are synchronous
    Wait {
        /// Placeholder id
        id: String,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

const CONFIG_EXAMPLES: &str = "Examples:
  regru cfg set endpoint=https://api.reg.ru/api/regru2 timeout=20000
  printf \"my-pass\" | regru cfg set password -
  regru cfg get endpoint region retries
  regru cfg unset region retries
  regru cfg import --json < config.json
  regru cfg export --json";

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print config file path
    Path,

    /// List effective config (secrets redacted)
    #[command(visible_alias = "ls")]
    List,

    /// Get one or more effective config keys
    Get {
        /// Keys to show (default: all)
        keys: Vec<String>,

        /// Show secret values
        #[arg(long)]
        reveal: bool,
    },

    /// Set config values. Use key=value entries or <key> <value>
    Set {
        /// key=value entries, or a single <key> <value> pair
        entries: Vec<String>,

        /// Read the value for this key from stdin (secret-safe)
        #[arg(long, value_name = "KEY")]
        stdin_key: Option<String>,
    },

    /// Unset one or more file config keys
    Unset {
        /// Keys to remove
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Import file config JSON from stdin (requires --json)
    Import,

    /// Export effective config as JSON (requires --json)
    Export,
}

#[derive(Subcommand, Debug)]
pub enum ServicesCommands {
    /// List account services
    List {
        /// Filter by service type
        #[arg(long)]
        servtype: Option<String>,

        /// Filter by state
        #[arg(long)]
        state: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum DomainsCommands {
    /// List domains in the account
    List,
}

#[derive(Subcommand, Debug)]
pub enum ZoneCommands {
    /// Get DNS records for a domain
    Records {
        /// Domain name
        domain: String,
    },

    /// Add DNS record using zone/add_<kind> (kind: alias, aaaa, cname, txt, mx, ns, srv, caa, https)
    Add {
        /// Record kind
        kind: String,

        /// Domain name
        domain: String,

        /// key=value pairs
        params: Vec<String>,

        /// Extra parameter (repeatable)
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
        param: Vec<String>,
    },

    /// Remove DNS record using zone/remove_record
    Remove {
        /// Domain name
        domain: String,

        /// key=value pairs
        params: Vec<String>,

        /// Extra parameter (repeatable)
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
        param: Vec<String>,
    },

    /// Update zone records using zone/update_records
    Update {
        /// Domain name
        domain: String,

        /// key=value pairs
        params: Vec<String>,

        /// Extra parameter (repeatable)
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
        param: Vec<String>,
    },

    /// Clear zone records using zone/clear
    Clear {
        /// Domain name
        domain: String,
    },
}
