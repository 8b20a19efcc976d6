//! Aromiq CLI - Inspect and edit persisted carts.
//!
//! # Usage
//!
//! ```bash
//! # Add one unit of a product/size
//! aromiq-cart add "Oud Noir" 50ml 1200
//!
//! # Change a quantity (0 or less removes the line)
//! aromiq-cart set "Oud Noir" 50ml 3
//!
//! # Show the cart, its total or its item count
//! aromiq-cart show
//! aromiq-cart total
//! aromiq-cart count
//!
//! # Use a different storage file
//! aromiq-cart --file /tmp/storage.json show
//! ```
//!
//! # Environment Variables
//!
//! - `AROMIQ_CART_FILE` - Storage file (default: `aromiq-storage.json`)
//! - `AROMIQ_CART_KEY` - Storage key holding the cart (default: `aromiqCart`)
//! - `AROMIQ_CURRENCY` - Display currency (default: `BDT`)
//! - `RUST_LOG` - Log filter (default: `warn`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use aromiq_core::{CartStore, CurrencyCode, Price, keys};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod storage;

use storage::FileStorage;

#[derive(Parser)]
#[command(name = "aromiq-cart")]
#[command(author, version, about = "Aromiq cart tools")]
struct Cli {
    /// Storage file holding the cart
    #[arg(long, global = true, env = "AROMIQ_CART_FILE", default_value = "aromiq-storage.json")]
    file: PathBuf,

    /// Storage key the cart is persisted under
    #[arg(long, global = true, env = "AROMIQ_CART_KEY", default_value = keys::CART)]
    key: String,

    /// Currency used when displaying amounts
    #[arg(long, global = true, env = "AROMIQ_CURRENCY", default_value = "BDT")]
    currency: CurrencyCode,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add one unit of a product/size
    Add {
        /// Product name
        name: String,
        /// Size label, e.g. 50ml
        size: String,
        /// Unit price
        price: Price,
    },
    /// Remove a line
    Remove {
        /// Product name
        name: String,
        /// Size label
        size: String,
    },
    /// Set the quantity of a line (0 or less removes it)
    Set {
        /// Product name
        name: String,
        /// Size label
        size: String,
        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Print every line with the cart total
    Show,
    /// Print the cart total
    Total,
    /// Print the number of units in the cart
    Count,
    /// Empty the cart
    Clear,
}

fn main() {
    // Load .env before parsing so env-backed flags pick it up
    dotenvy::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(output) => {
            #[allow(clippy::print_stdout)]
            {
                println!("{output}");
            }
        }
        Err(e) => {
            tracing::error!("Command failed: {e}");
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<String, commands::cart::CartCommandError> {
    tracing::debug!(file = %cli.file.display(), key = %cli.key, "Opening cart");
    let mut store = CartStore::with_key(FileStorage::new(cli.file), cli.key);

    match cli.command {
        Commands::Add { name, size, price } => {
            commands::cart::add(&mut store, &name, &size, price)
        }
        Commands::Remove { name, size } => commands::cart::remove(&mut store, &name, &size),
        Commands::Set {
            name,
            size,
            quantity,
        } => commands::cart::set_quantity(&mut store, &name, &size, quantity),
        Commands::Show => Ok(commands::cart::show(&store, cli.currency)),
        Commands::Total => Ok(commands::cart::total(&store, cli.currency)),
        Commands::Count => Ok(commands::cart::count(&store)),
        Commands::Clear => commands::cart::clear(&mut store),
    }
}
