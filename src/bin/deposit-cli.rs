use alloy::primitives::Address;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use deposit_desk::blockchain::{ChainClient, LocalWallet};
use deposit_desk::config::{load_config, AppConfig};
use deposit_desk::observability::{init_logging, LoggingConfig};
use deposit_desk::registrations::{
    DepositDesk, FileStore, HttpStore, RegistrationForm, RegistrationStore,
    SurveyAnswers, TechnologiesUsed,
};

#[derive(Parser)]
#[command(name = "deposit-cli")]
#[command(about = "Pay, redeem and inspect event deposits", long_about = None)]
struct Cli {
    /// Service config file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Registration file to read and write directly.
    #[arg(long, conflicts_with = "service_url")]
    store_file: Option<PathBuf>,

    /// Running deposit-desk service to record registrations with.
    #[arg(long)]
    service_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the contract's deposit amount, admin and redemption deadline
    Info,
    /// Show on-chain and local state for an address
    Status { address: Address },
    /// Pay the deposit with the key in DEPOSIT_DESK_PRIVATE_KEY and register
    Deposit {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        portfolio: String,
        /// Has used Substrate / Polkadot before
        #[arg(long)]
        used_substrate: bool,
        #[arg(long, value_enum, value_delimiter = ',')]
        tech: Vec<Technology>,
        /// Precompiles familiarity, 1 to 5
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=5))]
        precompiles: u8,
    },
    /// Redeem the deposit of the key in DEPOSIT_DESK_PRIVATE_KEY
    Redeem,
    /// List stored registrations
    List,
}

#[derive(Clone, Copy, ValueEnum)]
enum Technology {
    Ink,
    EvmSolidity,
    PolkaVm,
    Xcm,
    PolkadotJsApi,
}

fn technologies(selected: &[Technology]) -> TechnologiesUsed {
    let mut used = TechnologiesUsed::default();
    for tech in selected {
        match tech {
            Technology::Ink => used.ink = true,
            Technology::EvmSolidity => used.evm_solidity = true,
            Technology::PolkaVm => used.polka_vm = true,
            Technology::Xcm => used.xcm = true,
            Technology::PolkadotJsApi => used.polkadot_js_api = true,
        }
    }
    used
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    init_logging(&LoggingConfig {
        level: "warn".to_string(),
        ..LoggingConfig::from_observability(&config.observability)
    });

    let store: Arc<dyn RegistrationStore> = match (&cli.service_url, &cli.store_file) {
        (Some(url), _) => Arc::new(HttpStore::new(url)),
        (None, Some(path)) => Arc::new(FileStore::new(path)),
        (None, None) => Arc::new(FileStore::new(&config.storage.path)),
    };

    let contract: Address = config.contract.address.parse()?;
    let client = Arc::new(ChainClient::new(&config.chain, contract)?);
    let chain = config.chain.descriptor.clone();
    let desk = DepositDesk::new(chain.clone(), client, store.clone());

    match cli.command {
        Commands::Info => {
            let info = desk.contract_info().await?;
            print_json(&json!({
                "contract": info,
                "contractUrl": chain.address_url(&info.address),
                "addChainParams": chain.add_chain_params(),
            }))?;
        }
        Commands::Status { address } => {
            print_json(&desk.status(address).await?)?;
        }
        Commands::Deposit {
            name,
            portfolio,
            used_substrate,
            tech,
            precompiles,
        } => {
            let wallet = local_wallet(&config)?;
            let form = RegistrationForm {
                name,
                portfolio_link: portfolio,
                survey_answers: SurveyAnswers {
                    has_used_substrate_polkadot: used_substrate,
                    technologies_used: technologies(&tech),
                    precompiles_familiarity: precompiles,
                    ..SurveyAnswers::default()
                },
            };
            let receipt = desk.deposit(&wallet, wallet.address(), form).await?;
            print_json(&receipt)?;
        }
        Commands::Redeem => {
            let wallet = local_wallet(&config)?;
            let receipt = desk.redeem(&wallet, wallet.address()).await?;
            print_json(&receipt)?;
        }
        Commands::List => {
            print_json(&store.get_all().await?)?;
        }
    }

    Ok(())
}

fn local_wallet(config: &AppConfig) -> Result<LocalWallet, Box<dyn std::error::Error>> {
    let wallet = LocalWallet::from_env(config.chain.descriptor.clone())?
        .with_poll_interval(Duration::from_millis(config.chain.confirmation_poll_ms));
    Ok(wallet)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
