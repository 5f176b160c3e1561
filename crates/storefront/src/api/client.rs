//! HTTP client for the Franco Sport backend.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use franco_sport_core::{Address, CreatedOrder, NewAddress, OrderRequest, Product, ProductId};

use super::ApiError;
use super::cache::{CacheKey, CacheValue};
use super::types::{Customer, ErrorBody, UploadedImage};
use crate::config::BackendConfig;

/// Multipart field name the upload endpoint reads.
const UPLOAD_FIELD: &str = "image";

// =============================================================================
// BackendClient
// =============================================================================

/// Client for the Franco Sport backend API.
///
/// Cheap to clone. Product lookups are cached for 5 minutes; everything
/// customer-scoped goes to the backend every time.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    config: BackendConfig,
    cache: Cache<CacheKey, CacheValue>,
}

impl BackendClient {
    /// Create a new backend API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                config: config.clone(),
                cache,
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        self.inner.config.endpoint(path)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Get a product with its variants and stock.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown ids, or any transport/API error.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let cache_key = CacheKey::Product(id);

        // Check cache
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let response = self
            .inner
            .client
            .get(self.url(&format!("/products/{id}")))
            .send()
            .await?;
        let product: Product = read_json(response, || format!("Product {id}")).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Invalidate a cached product.
    pub async fn invalidate_product(&self, id: ProductId) {
        self.inner.cache.invalidate(&CacheKey::Product(id)).await;
    }

    // =========================================================================
    // Customer
    // =========================================================================

    /// Profile and loyalty balance of the token's owner.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` if the token is rejected.
    #[instrument(skip_all)]
    pub async fn current_customer(&self, token: &str) -> Result<Customer, ApiError> {
        let response = self
            .inner
            .client
            .get(self.url("/users/me"))
            .bearer_auth(token)
            .send()
            .await?;
        read_json(response, || "Customer".to_string()).await
    }

    /// Saved addresses of the token's owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip_all)]
    pub async fn list_addresses(&self, token: &str) -> Result<Vec<Address>, ApiError> {
        let response = self
            .inner
            .client
            .get(self.url("/addresses"))
            .bearer_auth(token)
            .send()
            .await?;
        read_json(response, || "Addresses".to_string()).await
    }

    /// Create an address for the token's owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the backend rejects the fields.
    #[instrument(skip_all)]
    pub async fn create_address(
        &self,
        token: &str,
        address: &NewAddress,
    ) -> Result<Address, ApiError> {
        let response = self
            .inner
            .client
            .post(self.url("/addresses"))
            .bearer_auth(token)
            .json(address)
            .send()
            .await?;
        read_json(response, || "Address".to_string()).await
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Upload an image and get back its hosted URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the content type is malformed or the upload fails.
    #[instrument(skip(self, token, bytes), fields(size = bytes.len()))]
    pub async fn upload_image(
        &self,
        token: &str,
        bytes: Vec<u8>,
        file_name: &str,
        content_type: &str,
    ) -> Result<UploadedImage, ApiError> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .inner
            .client
            .post(self.url("/upload"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        read_json(response, || "Upload".to_string()).await
    }

    /// Submit an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the backend rejects the order.
    #[instrument(skip_all, fields(lines = order.items.len(), payment = ?order.payment_method))]
    pub async fn create_order(
        &self,
        token: &str,
        order: &OrderRequest,
    ) -> Result<CreatedOrder, ApiError> {
        let response = self
            .inner
            .client
            .post(self.url("/orders"))
            .bearer_auth(token)
            .json(order)
            .send()
            .await?;
        read_json(response, || "Order".to_string()).await
    }
}

/// Map the status to an `ApiError`, or parse the body as `T`.
async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    what: impl FnOnce() -> String,
) -> Result<T, ApiError> {
    let status = response.status();

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound(what()));
    }

    let body = response.text().await?;

    if !status.is_success() {
        tracing::warn!(
            status = %status,
            body = %body.chars().take(500).collect::<String>(),
            "Backend returned non-success status"
        );
        return Err(ApiError::Api {
            status: status.as_u16(),
            message: ErrorBody::message_from(&body),
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %body.chars().take(500).collect::<String>(),
            "Failed to parse backend response"
        );
        ApiError::Parse(e.to_string())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use franco_sport_core::{
        AddressId, ConfirmedPayment, Money, OrderDraft, OrderId, OrderPaymentMethod,
    };
    use serde_json::json;
    use wiremock::matchers::{body_json, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(server: &MockServer) -> BackendClient {
        let config = BackendConfig::new(&format!("{}/api", server.uri())).unwrap();
        BackendClient::new(&config).unwrap()
    }

    fn product_json() -> serde_json::Value {
        json!({
            "id": 12,
            "name": "Home Jersey",
            "slug": "home-jersey",
            "price": "45.00",
            "stock": 5,
            "description": "ignored",
            "variants": [{ "id": 121, "name": "M", "stock": 2 }]
        })
    }

    #[tokio::test]
    async fn test_get_product_is_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products/12"))
            .respond_with(ResponseTemplate::new(200).set_body_json(product_json()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let first = client.get_product(ProductId::new(12)).await.unwrap();
        let second = client.get_product(ProductId::new(12)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.price, Money::from_minor(4_500));
        assert_eq!(first.variants.len(), 1);
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products/99"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/users/me"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/addresses"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({ "message": "db down" })),
            )
            .mount(&server)
            .await;

        let client = client(&server);

        assert!(matches!(
            client.get_product(ProductId::new(99)).await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            client.current_customer("expired").await,
            Err(ApiError::Unauthorized)
        ));
        match client.list_addresses("tok").await {
            Err(ApiError::Api { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "db down");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_current_customer_sends_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/me"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 4,
                "email": "ana@example.com",
                "loyaltyPoints": 1200
            })))
            .expect(1)
            .mount(&server)
            .await;

        let customer = client(&server).current_customer("tok-1").await.unwrap();
        assert_eq!(customer.loyalty_points, 1_200);
    }

    #[tokio::test]
    async fn test_upload_uses_image_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .and(body_string_contains("name=\"image\""))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "url": "https://cdn.francosport.com/p/1.png" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let uploaded = client(&server)
            .upload_image("tok", vec![0x89, 0x50, 0x4e, 0x47], "proof.png", "image/png")
            .await
            .unwrap();
        assert_eq!(uploaded.url, "https://cdn.francosport.com/p/1.png");
    }

    #[tokio::test]
    async fn test_create_order_posts_payload() {
        let server = MockServer::start().await;
        let order = OrderRequest {
            items: Vec::new(),
            shipping_address_id: AddressId::new(3),
            payment_method: OrderPaymentMethod::CashOnDelivery,
            payment_proof_url: None,
            redeem_points: None,
        };
        Mock::given(method("POST"))
            .and(path("/api/orders"))
            .and(body_json(json!({
                "items": [],
                "shippingAddressId": 3,
                "paymentMethod": "CASH_ON_DELIVERY"
            })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({ "id": 77, "orderNumber": "FS-77" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let created = client(&server).create_order("tok", &order).await.unwrap();
        assert_eq!(created.id, OrderId::new(77));

        // Drafts and payloads agree on omission of optional fields
        let draft = OrderDraft {
            address: AddressId::new(3),
            payment: ConfirmedPayment::CashOnDelivery,
            redeem_points: 0,
        };
        let rebuilt = OrderRequest::new(&franco_sport_core::Cart::default(), &draft, None);
        assert_eq!(rebuilt, order);
    }
}
