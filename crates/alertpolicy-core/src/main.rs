//! AlertPolicy CLI
//!
//! Command-line interface for managing alert policies.

use std::path::PathBuf;
use std::process::ExitCode;

use alertpolicy::models::AccountId;
use alertpolicy::{Config, DeletedPolicy, IncidentPreference, ListPoliciesParams, Policies, Policy};
use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, error};

/// AlertPolicy - manage alert policies over REST or NerdGraph
#[derive(Parser)]
#[command(name = "alertpolicy")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "ALERTPOLICY_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Account to operate on (defaults to api.account_id from the config)
    #[arg(long, global = true, env = "ALERTPOLICY_ACCOUNT_ID")]
    account_id: Option<AccountId>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List alert policies
    List {
        /// Only policies matching this name
        #[arg(long)]
        name: Option<String>,
    },

    /// Show one alert policy
    Get {
        /// Policy ID
        id: i64,
    },

    /// Create an alert policy
    Create {
        /// Policy name
        #[arg(long)]
        name: String,

        /// Incident preference (per_policy, per_condition, per_condition_and_target)
        #[arg(long, default_value = "per_policy")]
        incident_preference: IncidentPreference,
    },

    /// Update an alert policy
    Update {
        /// Policy ID
        id: i64,

        /// New policy name
        #[arg(long)]
        name: String,

        /// New incident preference
        #[arg(long, default_value = "per_policy")]
        incident_preference: IncidentPreference,
    },

    /// Delete an alert policy
    Delete {
        /// Policy ID
        id: i64,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        generate_completions(shell);
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config, cli.verbose);
    debug!(routing = ?config.routing, "Configuration loaded");

    match run(config, cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(config: &Config, verbose: bool) {
    let level = if verbose { "debug" } else { config.logging.level.as_str() };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.logging.format == "json" {
        builder.json().init();
    } else {
        builder.with_target(false).init();
    }
}

async fn run(config: Config, cli: Cli) -> anyhow::Result<()> {
    let account_id = cli
        .account_id
        .or(config.api.account_id)
        .context("no account id: pass --account-id or set api.account_id")?;
    let policies = Policies::from_config(&config)?;
    let format = cli.format;

    match cli.command {
        Commands::List { name } => {
            let params = ListPoliciesParams { name };
            let found = policies.list(account_id, &params).await?;
            print_policies(&found, format)?;
        }
        Commands::Get { id } => {
            let policy = policies.get(account_id, id).await?;
            print_policies(std::slice::from_ref(&policy), format)?;
        }
        Commands::Create {
            name,
            incident_preference,
        } => {
            let created = policies
                .create(account_id, Policy::new(name, incident_preference))
                .await?;
            print_policies(std::slice::from_ref(&created), format)?;
        }
        Commands::Update {
            id,
            name,
            incident_preference,
        } => {
            let updated = policies
                .update(account_id, Policy::new(name, incident_preference).with_id(id))
                .await?;
            print_policies(std::slice::from_ref(&updated), format)?;
        }
        Commands::Delete { id } => {
            let deleted = policies.delete(account_id, id).await?;
            print_deleted(&deleted, format)?;
        }
        Commands::Completions { .. } => unreachable!("handled before configuration is loaded"),
    }

    Ok(())
}

fn print_policies(policies: &[Policy], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(policies)?),
        OutputFormat::Text => {
            println!("{:<12} {:<28} NAME", "ID", "INCIDENT PREFERENCE");
            for policy in policies {
                let id = policy.id.map_or_else(|| "-".to_string(), |id| id.to_string());
                println!("{id:<12} {:<28} {}", policy.incident_preference, policy.name);
            }
        }
    }
    Ok(())
}

fn print_deleted(deleted: &DeletedPolicy, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(deleted)?),
        OutputFormat::Text => match &deleted.policy {
            Some(policy) => println!("Deleted policy {} ({})", deleted.id, policy.name),
            None => println!("Deleted policy {}", deleted.id),
        },
    }
    Ok(())
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "alertpolicy", &mut io::stdout());
}
