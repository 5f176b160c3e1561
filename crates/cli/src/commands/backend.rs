//! Backend API checks.

use franco_sport_core::ProductId;
use franco_sport_storefront::api::BackendClient;
use franco_sport_storefront::config::StorefrontConfig;

use super::CommandError;

/// Fetch a product the way the cart does and print it.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the backend request fails.
pub async fn product(id: ProductId) -> Result<(), CommandError> {
    let config = StorefrontConfig::from_env()?;
    let client = BackendClient::new(&config.api)?;

    let product = client.get_product(id).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", serde_json::to_string_pretty(&product)?);
    }
    Ok(())
}
