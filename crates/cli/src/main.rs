//! Libreria CLI - Database migrations and catalog management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! libreria migrate
//!
//! # Load categories and products from a YAML file
//! libreria seed --file catalog.yaml
//!
//! # Overwrite documents that already exist
//! libreria seed --file catalog.yaml --replace
//!
//! # Show a user's cart as the storefront resolves it
//! libreria cart show --user u1
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed the catalog from YAML
//! - `cart show` - Inspect a user's cart

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "libreria")]
#[command(author, version, about = "Libreria CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed categories and products from a YAML file
    Seed {
        /// Path to the catalog YAML file
        #[arg(short, long)]
        file: String,

        /// Overwrite documents that already exist
        #[arg(long)]
        replace: bool,
    },
    /// Inspect carts
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show a user's resolved cart
    Show {
        /// User id the cart belongs to
        #[arg(short, long)]
        user: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Seed { file, replace } => commands::seed::catalog(&file, replace).await?,
        Commands::Cart { action } => match action {
            CartAction::Show { user } => commands::cart::show(&user).await?,
        },
    }
    Ok(())
}
