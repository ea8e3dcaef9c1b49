//! Marketplace Cart CLI - Inspect and edit the persisted cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the current cart
//! mp-cart show
//!
//! # Add a product (quantity starts at 1, or goes up by 1 if already present)
//! mp-cart add --id a --title "Shoe" --price 10 --image-url https://cdn.example.com/shoe.png
//!
//! # Change quantities
//! mp-cart increment a
//! mp-cart decrement a
//!
//! # Use a different storage file
//! mp-cart --storage /tmp/cart.json show --json
//! ```
//!
//! # Environment Variables
//!
//! - `CART_STORAGE_PATH` - Storage file (default: `cart-storage.json`)
//! - `CART_STORAGE_KEY` - Storage key (default: `@GoMarketplace:products`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `RUST_LOG` - Log filter (default: `marketplace_cart=info,mp_cart=info`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use marketplace_cart::{CartConfig, CartStore, NewCartItem};
use marketplace_core::{Price, ProductId};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::cart::OutputFormat;

#[derive(Parser)]
#[command(name = "mp-cart")]
#[command(author, version, about = "Marketplace cart tools")]
struct Cli {
    /// Storage file, overriding `CART_STORAGE_PATH`
    #[arg(long, global = true)]
    storage: Option<PathBuf>,

    /// Print the cart as JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current cart
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        #[arg(long)]
        id: String,

        /// Product title
        #[arg(long)]
        title: String,

        /// Unit price (e.g. 19.99)
        #[arg(long, value_parser = Price::parse)]
        price: Price,

        /// Product image URL
        #[arg(long, default_value = "")]
        image_url: String,
    },
    /// Add one unit to a product already in the cart
    Increment {
        /// Product ID
        id: String,
    },
    /// Remove one unit, dropping the product at zero
    Decrement {
        /// Product ID
        id: String,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CartConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match CartConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            #[allow(clippy::print_stderr)]
            {
                eprintln!("Failed to load configuration: {e}");
            }
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "marketplace_cart=info,mp_cart=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, mut config: CartConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = cli.storage {
        config.storage_path = path;
    }
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };

    tracing::debug!(path = %config.storage_path.display(), key = %config.storage_key, "Opening cart");
    let store = CartStore::open(&config)?;

    match cli.command {
        Commands::Show => commands::cart::show(&store, format).await?,
        Commands::Add {
            id,
            title,
            price,
            image_url,
        } => {
            let item = NewCartItem {
                id: ProductId::new(id),
                title,
                image_url,
                price,
            };
            commands::cart::add(&store, item, format).await?;
        }
        Commands::Increment { id } => {
            commands::cart::increment(&store, &ProductId::new(id), format).await?;
        }
        Commands::Decrement { id } => {
            commands::cart::decrement(&store, &ProductId::new(id), format).await?;
        }
    }
    Ok(())
}
