//! CLI subcommands.

pub mod backend;
pub mod config;
pub mod migrate;

use franco_sport_storefront::api::ApiError;
use franco_sport_storefront::config::ConfigError;

/// Failure of any subcommand.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("backend error: {0}")]
    Backend(#[from] ApiError),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
