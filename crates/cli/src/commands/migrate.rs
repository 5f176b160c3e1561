//! Database migration commands.
//!
//! The storefront keeps only sessions in `SQLite`; `tower-sessions-sqlx-store`
//! owns that schema. The server also runs this on startup, so the command is
//! for preparing a database ahead of a deploy.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_SESSION_DATABASE_URL` - `SQLite` URL
//!   (default: `sqlite://franco-sport-sessions.db?mode=rwc`)

use secrecy::ExposeSecret;
use sqlx::sqlite::SqlitePool;
use tower_sessions_sqlx_store::SqliteStore;

use franco_sport_storefront::config::StorefrontConfig;

use super::CommandError;

/// Create the session table if it does not exist.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the database cannot be
/// opened, or the migration fails.
pub async fn sessions() -> Result<(), CommandError> {
    let config = StorefrontConfig::from_env()?;

    tracing::info!("Connecting to session database...");
    let pool = SqlitePool::connect(config.session_database_url.expose_secret()).await?;

    tracing::info!("Running session store migration...");
    SqliteStore::new(pool).migrate().await?;

    tracing::info!("Session store migration complete");
    Ok(())
}
