//! Franco Sport CLI - session store and operations tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the session table in the storefront's SQLite database
//! fs-cli migrate sessions
//!
//! # Validate storefront configuration without starting the server
//! fs-cli config check
//!
//! # Fetch a product from the backend API
//! fs-cli backend product 42
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use franco_sport_core::ProductId;

mod commands;

#[derive(Parser)]
#[command(name = "fs-cli")]
#[command(author, version, about = "Franco Sport CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Inspect storefront configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Query the backend API
    Backend {
        #[command(subcommand)]
        action: BackendAction,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Create the session store table
    Sessions,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Load configuration from the environment and print a redacted summary
    Check,
}

#[derive(Subcommand)]
enum BackendAction {
    /// Fetch one product and print it as JSON
    Product {
        /// Product id
        id: ProductId,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate { target } => match target {
            MigrateTarget::Sessions => commands::migrate::sessions().await?,
        },
        Commands::Config { action } => match action {
            ConfigAction::Check => commands::config::check()?,
        },
        Commands::Backend { action } => match action {
            BackendAction::Product { id } => commands::backend::product(id).await?,
        },
    }
    Ok(())
}
