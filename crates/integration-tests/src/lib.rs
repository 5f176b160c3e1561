//! End-to-end harness for the Franco Sport storefront.
//!
//! Each test gets its own storefront bound to an ephemeral port, an in-memory
//! session store, and a `wiremock` server standing in for the backend API.
//! The HTTP client keeps cookies, so one `TestApp` is one shopper.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p franco-sport-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::time::Duration;

use reqwest::{Client, Response};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower_sessions::MemoryStore;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use franco_sport_storefront::config::{BackendConfig, ProofConfig, StorefrontConfig};
use franco_sport_storefront::state::AppState;

/// Bearer token the mocked backend accepts.
pub const TOKEN: &str = "test-token";

/// A running storefront plus its mocked backend.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub backend: MockServer,
}

impl TestApp {
    /// Start a storefront against a fresh mock backend.
    ///
    /// # Panics
    ///
    /// If the server cannot bind or the client cannot be built.
    pub async fn spawn() -> Self {
        let backend = MockServer::start().await;

        let config = StorefrontConfig {
            host: [127, 0, 0, 1].into(),
            port: 0,
            base_url: "http://127.0.0.1".to_string(),
            session_database_url: SecretString::from("sqlite::memory:"),
            api: BackendConfig::new(&backend.uri()).expect("mock server URI is a valid URL"),
            proofs: ProofConfig {
                max_bytes: 64 * 1024,
                ttl: Duration::from_secs(300),
                cache_bytes: 1024 * 1024,
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 0.0,
            sentry_traces_sample_rate: 0.0,
        };

        let state = AppState::new(config).expect("Failed to build app state");
        let app = franco_sport_storefront::app(state, MemoryStore::default());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("listener has an address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            addr,
            client,
            backend,
        }
    }

    /// Absolute storefront URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// # Panics
    ///
    /// If the request cannot be sent.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET failed")
    }

    /// # Panics
    ///
    /// If the request cannot be sent.
    pub async fn post(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("POST failed")
    }

    /// POST with no body.
    ///
    /// # Panics
    ///
    /// If the request cannot be sent.
    pub async fn post_empty(&self, path: &str) -> Response {
        self.client
            .post(self.url(path))
            .send()
            .await
            .expect("POST failed")
    }

    // =========================================================================
    // Backend fixtures
    // =========================================================================

    /// Serve a simple product (no variants) at `GET /products/{id}`.
    pub async fn mock_product(&self, id: i32, price: &str, stock: u32) {
        Mock::given(method("GET"))
            .and(path(format!("/products/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": id,
                "name": format!("Product {id}"),
                "slug": format!("product-{id}"),
                "price": price,
                "stock": stock,
            })))
            .mount(&self.backend)
            .await;
    }

    /// Serve the signed-in customer with `points` loyalty points.
    pub async fn mock_customer(&self, points: u64) {
        self.mock_customer_as(TOKEN, 9, points).await;
    }

    /// Serve customer `id` to requests bearing `token`.
    pub async fn mock_customer_as(&self, token: &str, id: i32, points: u64) {
        Mock::given(method("GET"))
            .and(path("/users/me"))
            .and(header("authorization", format!("Bearer {token}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": id,
                "email": format!("customer{id}@example.com"),
                "name": format!("Customer {id}"),
                "loyaltyPoints": points,
            })))
            .mount(&self.backend)
            .await;
    }

    /// Serve one saved address with id 5.
    pub async fn mock_addresses(&self) {
        Mock::given(method("GET"))
            .and(path("/addresses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": 5,
                "fullName": "Ana Pérez",
                "streetAddress": "Calle 1",
                "city": "Lima",
                "state": "Lima",
                "postalCode": "15001",
                "country": "PE",
                "phone": "+51 999 999 999",
                "isDefault": true,
            }])))
            .mount(&self.backend)
            .await;
    }

    // =========================================================================
    // Shopper actions
    // =========================================================================

    /// Sign in with [`TOKEN`].
    ///
    /// # Panics
    ///
    /// If sign-in is not accepted.
    pub async fn sign_in(&self) {
        self.sign_in_as(TOKEN).await;
    }

    /// Sign in with `token`.
    ///
    /// # Panics
    ///
    /// If sign-in is not accepted.
    pub async fn sign_in_as(&self, token: &str) {
        let resp = self.post("/api/auth/session", &json!({ "token": token })).await;
        assert!(resp.status().is_success(), "sign-in failed: {}", resp.status());
    }

    /// Add `quantity` of product `id` to the cart.
    ///
    /// # Panics
    ///
    /// If the add is rejected.
    pub async fn add_to_cart(&self, id: i32, quantity: u32) {
        let resp = self
            .post(
                "/api/cart/items",
                &json!({ "productId": id, "quantity": quantity }),
            )
            .await;
        assert!(resp.status().is_success(), "add to cart failed: {}", resp.status());
    }

    /// Sign in, fill the cart and walk to the payment step with address 5.
    ///
    /// # Panics
    ///
    /// If any step is rejected.
    pub async fn reach_payment_step(&self, points: u64, price: &str, quantity: u32) {
        self.mock_product(1, price, 10).await;
        self.mock_customer(points).await;
        self.mock_addresses().await;

        self.sign_in().await;
        self.add_to_cart(1, quantity).await;

        let resp = self.get("/api/checkout").await;
        assert_eq!(resp.status(), 200);
        let resp = self
            .post("/api/checkout/address", &json!({ "addressId": 5 }))
            .await;
        assert_eq!(resp.status(), 200);
        let view: Value = self
            .post_empty("/api/checkout/continue")
            .await
            .json()
            .await
            .expect("checkout view");
        assert_eq!(view["step"], "payment");
    }

    /// Drain queued notices.
    ///
    /// # Panics
    ///
    /// If the notice list cannot be read.
    pub async fn notices(&self) -> Vec<Value> {
        self.get("/api/notifications")
            .await
            .json()
            .await
            .expect("notice list")
    }
}
