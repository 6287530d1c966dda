//! REG.RU API2 CLI
//!
//! Command-line interface for the non-reseller REG.RU API2.

use anyhow::Result;
use clap::Parser;
use regru_core::ProcessSettings;
use regructl::cli::{
    generate_completion, handle_config, handle_do, handle_doctor, handle_domains, handle_nop,
    handle_services, handle_skill, handle_unsupported, handle_zone, Cli, Commands, Invocation,
};
use regructl::client::RegruClient;
use regructl::config::StdinInput;
use regructl::format::{format_error, OutputFormat};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let format = OutputFormat::from_flags(cli.json, cli.plain);

    if let Err(e) = run(cli, format).await {
        let (rendered, exit_code) = format_error(&e, format);
        match format {
            OutputFormat::Json => println!("{}", rendered),
            OutputFormat::Plain | OutputFormat::Human => eprintln!("{}", rendered),
        }
        std::process::exit(exit_code);
    }
}

async fn run(cli: Cli, format: OutputFormat) -> Result<()> {
    let settings = ProcessSettings;
    let inv = Invocation::new(&settings, cli.overrides(), format);
    let client = RegruClient::new()?;

    match cli.command {
        Commands::Config { command } => handle_config(command, &inv, &mut StdinInput),
        Commands::Doctor => handle_doctor(&client, &inv).await,
        Commands::Skill => handle_skill(format),
        Commands::Nop => handle_nop(&client, &inv).await,
        Commands::Services { command } => handle_services(&client, command, &inv).await,
        Commands::Domains { command } => handle_domains(&client, command, &inv).await,
        Commands::Zone { command } => handle_zone(&client, command, &inv).await,
        Commands::Do {
            method,
            params,
            param,
        } => handle_do(&client, method, params, param, &inv).await,
        Commands::Result { .. } => handle_unsupported("result"),
        Commands::Wait { .. } => handle_unsupported("wait"),
        Commands::Completion { shell } => {
            generate_completion(shell);
            Ok(())
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` wins over
/// the flags.
fn init_tracing(verbose: bool, quiet: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default_level = if verbose {
        "warn,regructl=debug,regru_core=debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
