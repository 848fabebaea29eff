use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use blnk_sdk::allocation::{AllocationTarget, AllocationValidator, AmountComparison, SideSpec, TransferIntent};
use blnk_sdk::config::{load_config, ClientConfig};
use blnk_sdk::observability::logging::init_logging;
use blnk_sdk::resources::search::{ResourceType, SearchParams};
use blnk_sdk::{BlnkClient, ClientError, CreateLedgerRequest, CreateTransactionRequest, ParentTransaction};

#[derive(Parser)]
#[command(name = "blnk-cli")]
#[command(about = "Command-line client for the Blnk ledger service", long_about = None)]
struct Cli {
    /// TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Service base URL (overrides config)
    #[arg(short, long, global = true)]
    url: Option<String>,

    /// API key (overrides config)
    #[arg(short, long, global = true)]
    key: Option<String>,

    /// Attempts per call, including the first (overrides config)
    #[arg(short, long, global = true)]
    retries: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a transfer's allocation offline
    Validate {
        #[command(flatten)]
        transfer: TransferArgs,

        /// Accept totals within this absolute difference
        #[arg(long, conflicts_with = "minor_units")]
        tolerance: Option<f64>,

        /// Compare totals in minor units (amount x precision)
        #[arg(long)]
        minor_units: bool,
    },
    GetLedger {
        id: String,
    },
    CreateLedger {
        name: String,
    },
    GetBalance {
        id: String,
    },
    GetTransaction {
        id: String,
    },
    CreateTransaction {
        #[command(flatten)]
        transfer: TransferArgs,

        #[arg(long)]
        reference: String,

        #[arg(long, default_value = "USD")]
        currency: String,

        #[arg(long, default_value = "")]
        description: String,
    },
    Search {
        /// ledgers, balances, transactions or identities
        resource: ResourceType,

        #[arg(default_value = "*")]
        query: String,
    },
}

#[derive(Args)]
struct TransferArgs {
    #[arg(long)]
    amount: f64,

    #[arg(long, default_value_t = 100)]
    precision: i64,

    #[arg(long)]
    source: Option<String>,

    /// Split sources as id=distribution, e.g. @visa=50% @master=left
    #[arg(long, num_args = 1.., value_parser = parse_target)]
    sources: Vec<AllocationTarget>,

    #[arg(long)]
    destination: Option<String>,

    #[arg(long, num_args = 1.., value_parser = parse_target)]
    destinations: Vec<AllocationTarget>,
}

impl TransferArgs {
    fn intent(&self) -> TransferIntent<'_> {
        TransferIntent {
            amount: self.amount,
            precision: self.precision,
            source: SideSpec {
                single: self.source.as_deref(),
                multiple: &self.sources,
            },
            destination: SideSpec {
                single: self.destination.as_deref(),
                multiple: &self.destinations,
            },
        }
    }
}

/// Parse "identifier=distribution".
fn parse_target(raw: &str) -> Result<AllocationTarget, String> {
    match raw.rsplit_once('=') {
        Some((identifier, distribution)) if !identifier.is_empty() => {
            Ok(AllocationTarget::new(identifier, distribution))
        }
        _ => Err(format!("expected identifier=distribution, got {:?}", raw)),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.observability) {
        eprintln!("Warning: logging not initialised: {}", e);
    }

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Some(api) = e.api_error() {
                eprintln!("Response: {}", api.body_text());
            }
            ExitCode::FAILURE
        }
    }
}

fn build_config(cli: &Cli) -> Result<ClientConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };

    if let Some(url) = &cli.url {
        config.connection.base_url = url.clone();
    }
    if let Some(key) = &cli.key {
        config.connection.api_key = Some(key.clone());
    }
    if let Some(retries) = cli.retries {
        config.retries.max_attempts = retries;
    }
    Ok(config)
}

async fn run(command: Commands, config: ClientConfig) -> Result<(), ClientError> {
    if let Commands::Validate {
        transfer,
        tolerance,
        minor_units,
    } = &command
    {
        let comparison = match (tolerance, minor_units) {
            (Some(epsilon), _) => AmountComparison::Epsilon(*epsilon),
            (None, true) => AmountComparison::MinorUnits,
            (None, false) => AmountComparison::Exact,
        };
        let resolved = AllocationValidator::with_comparison(comparison).validate(&transfer.intent())?;
        return print_json(&resolved);
    }

    let client = BlnkClient::new(config)?;

    match command {
        Commands::Validate { .. } => Ok(()),
        Commands::GetLedger { id } => print_json(&client.ledgers().get(&id).await?),
        Commands::CreateLedger { name } => {
            print_json(&client.ledgers().create(&CreateLedgerRequest::new(name)).await?)
        }
        Commands::GetBalance { id } => print_json(&client.balances().get(&id).await?),
        Commands::GetTransaction { id } => print_json(&client.transactions().get(&id).await?),
        Commands::CreateTransaction {
            transfer,
            reference,
            currency,
            description,
        } => {
            let request = CreateTransactionRequest {
                transaction: ParentTransaction {
                    amount: transfer.amount,
                    precision: transfer.precision,
                    reference,
                    currency,
                    description,
                    source: transfer.source,
                    sources: transfer.sources,
                    destination: transfer.destination,
                    destinations: transfer.destinations,
                    ..Default::default()
                },
                ..Default::default()
            };
            print_json(&client.transactions().create(&request).await?)
        }
        Commands::Search { resource, query } => {
            print_json(&client.search().search(resource, &SearchParams::query(query)).await?)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), ClientError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| ClientError::Decode {
        source: e,
        body: String::new(),
    })?;
    println!("{}", text);
    Ok(())
}
