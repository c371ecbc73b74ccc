mod flow;
mod settings;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use marketplace::{MarketplaceApi, MerchantEndpoint};
use merchant_core::{app_config, AppConfig, MerchantToken};
use producer::ProducerApi;
use settings::{load_profile, DEFAULT_PROFILE_PATH};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

#[derive(Parser, Debug)]
#[command(name = "merchant-cli", about = "Pricewars merchant command line tool", version)]
struct Cli {
    /// Merchant profile (YAML); MERCHANT__* variables override its fields
    #[arg(long, default_value = DEFAULT_PROFILE_PATH)]
    profile: String,
    /// Also write logs to daily files in this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register the profile's merchant, print its token, then buy products with it
    Smoke {
        /// Units to buy, defaults to the profile quantity
        #[arg(long, short = 'q')]
        quantity: Option<u32>,
    },
    /// Register a merchant and print its id and token
    Register {
        #[arg(long, short = 'n')]
        name: Option<String>,
        #[arg(long, short = 'a')]
        algorithm: Option<String>,
        /// Port on this host or full URL of the merchant API
        #[arg(long, short = 'e')]
        endpoint: Option<MerchantEndpoint>,
    },
    /// Remove a merchant from the marketplace
    Unregister {
        /// Falls back to MERCHANT_TOKEN
        #[arg(long, short = 't')]
        token: Option<String>,
    },
    /// List registered merchants
    Merchants,
    /// List marketplace offers
    Offers {
        #[arg(long)]
        include_empty: bool,
    },
    /// List the producer catalogue
    Products,
    /// Buy products with an existing token
    Buy {
        #[arg(long, short = 'q')]
        quantity: Option<u32>,
        /// Falls back to MERCHANT_TOKEN
        #[arg(long, short = 't')]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_tracing(cli.log_dir.as_deref())?;

    let config = app_config()?;
    let profile = load_profile(&cli.profile)?;

    match cli.command {
        Command::Smoke { quantity } => {
            let quantity = quantity.unwrap_or(profile.quantity);
            flow::run_smoke(config, &profile, quantity, &mut std::io::stdout()).await?;
        }
        Command::Register {
            name,
            algorithm,
            endpoint,
        } => {
            let marketplace = MarketplaceApi::from_config(config)?;
            let registration = marketplace
                .register(
                    endpoint.unwrap_or_else(|| profile.endpoint()),
                    name.as_deref().unwrap_or(&profile.name),
                    algorithm.as_deref().unwrap_or(&profile.algorithm),
                )
                .await?;
            println!("merchant_id {}", registration.merchant_id);
            println!("token {}", registration.merchant_token.expose());
        }
        Command::Unregister { token } => {
            let token = resolve_token(config, token)?;
            MarketplaceApi::from_config(config)?
                .unregister(&token)
                .await?;
            println!("merchant unregistered");
        }
        Command::Merchants => {
            let merchants = MarketplaceApi::from_config(config)?.list_merchants().await?;
            println!("{}", serde_json::to_string_pretty(&merchants)?);
        }
        Command::Offers { include_empty } => {
            let offers = MarketplaceApi::from_config(config)?
                .get_offers(include_empty)
                .await?;
            println!("{}", serde_json::to_string_pretty(&offers)?);
        }
        Command::Products => {
            // the catalogue is public; a blank token sends no Authorization header
            let producer = ProducerApi::from_config(
                config,
                config.merchant_token.clone().unwrap_or_default(),
            )?;
            let products = producer.get_products().await?;
            println!("{}", serde_json::to_string_pretty(&products)?);
        }
        Command::Buy { quantity, token } => {
            let token = resolve_token(config, token)?;
            let order = ProducerApi::from_config(config, token)?
                .buy_products(quantity.unwrap_or(profile.quantity))
                .await?;
            println!("{}", serde_json::to_string_pretty(&order)?);
        }
    }

    Ok(())
}

fn resolve_token(config: &AppConfig, flag: Option<String>) -> Result<MerchantToken> {
    match flag {
        Some(token) => Ok(MerchantToken::new(token)),
        None => config.require_merchant_token().cloned(),
    }
}

fn init_tracing(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "merchant-cli.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let subscriber = Registry::default()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer);

    let _ = tracing::subscriber::set_global_default(subscriber);
    Ok(guard)
}
