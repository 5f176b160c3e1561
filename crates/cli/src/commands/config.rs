//! Configuration checks.

use franco_sport_storefront::config::StorefrontConfig;

use super::CommandError;

/// Load the storefront configuration and log what it resolved to.
///
/// Secrets are never printed; only whether they are set.
///
/// # Errors
///
/// Returns an error if a required variable is missing or a value fails to parse.
pub fn check() -> Result<(), CommandError> {
    let config = StorefrontConfig::from_env()?;

    tracing::info!(
        listen = %config.socket_addr(),
        base_url = %config.base_url,
        api = %config.api.base_url,
        proof_max_bytes = config.proofs.max_bytes,
        proof_ttl_secs = config.proofs.ttl.as_secs(),
        sentry = config.sentry_dsn.is_some(),
        sentry_environment = config.sentry_environment.as_deref().unwrap_or("-"),
        "Configuration OK"
    );
    Ok(())
}
