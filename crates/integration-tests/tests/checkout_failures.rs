//! Checkout guards and backend failures during order placement.

use franco_sport_integration_tests::{TOKEN, TestApp};
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

// ============================================================================
// Entry guards
// ============================================================================

#[tokio::test]
async fn test_signed_out_visitor_is_sent_to_login() {
    let app = TestApp::spawn().await;
    app.mock_product(1, "15.00", 10).await;
    app.add_to_cart(1, 1).await;

    let resp = app.get("/api/checkout").await;
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["redirect"], "/login");

    // Mutations are guarded too
    let resp = app.post_empty("/api/checkout/continue").await;
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_empty_cart_is_sent_back_to_cart() {
    let app = TestApp::spawn().await;
    app.mock_customer(0).await;
    app.sign_in().await;

    let resp = app.get("/api/checkout").await;
    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["redirect"], "/cart");
}

#[tokio::test]
async fn test_continue_without_address_is_rejected() {
    let app = TestApp::spawn().await;
    app.mock_product(1, "15.00", 10).await;
    app.mock_customer(0).await;
    app.sign_in().await;
    app.add_to_cart(1, 1).await;

    let view: Value = app.get("/api/checkout").await.json().await.unwrap();
    assert_eq!(view["step"], "address");
    assert_eq!(view["canContinue"], false);

    let resp = app.post_empty("/api/checkout/continue").await;
    assert_eq!(resp.status(), 422);
}

#[tokio::test]
async fn test_foreign_address_cannot_be_selected() {
    let app = TestApp::spawn().await;
    app.mock_product(1, "15.00", 10).await;
    app.mock_customer(0).await;
    app.mock_addresses().await;
    app.sign_in().await;
    app.add_to_cart(1, 1).await;

    let resp = app
        .post("/api/checkout/address", &json!({ "addressId": 999 }))
        .await;
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_blank_inline_address_lists_missing_fields() {
    let app = TestApp::spawn().await;
    app.mock_product(1, "15.00", 10).await;
    app.mock_customer(0).await;
    app.sign_in().await;
    app.add_to_cart(1, 1).await;

    Mock::given(method("POST"))
        .and(path("/addresses"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&app.backend)
        .await;

    let resp = app
        .post(
            "/api/checkout/addresses",
            &json!({
                "fullName": "Ana Pérez",
                "streetAddress": "   ",
                "city": "Lima",
                "state": "Lima",
                "postalCode": "",
                "country": "PE",
                "phone": "+51 999 999 999",
            }),
        )
        .await;
    assert_eq!(resp.status(), 422);
    let body: Value = resp.json().await.unwrap();
    let fields = body["fields"].as_array().unwrap();
    assert!(fields.contains(&json!("streetAddress")));
    assert!(fields.contains(&json!("postalCode")));
}

// ============================================================================
// Placement failures
// ============================================================================

#[tokio::test]
async fn test_proof_upload_failure_aborts_order() {
    let app = TestApp::spawn().await;
    app.reach_payment_step(0, "15.00", 2).await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(500).set_body_string("storage offline"))
        .mount(&app.backend)
        .await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 1 })))
        .expect(0)
        .mount(&app.backend)
        .await;

    app.post("/api/checkout/payment", &json!({ "method": "qr_transfer" }))
        .await;
    let part = Part::bytes(vec![0xFF, 0xD8, 0xFF, 0xE0])
        .file_name("receipt.jpg")
        .mime_str("image/jpeg")
        .unwrap();
    let resp = app
        .client
        .post(app.url("/api/checkout/proof"))
        .multipart(Form::new().part("proof", part))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    app.post_empty("/api/checkout/continue").await;

    let resp = app.post_empty("/api/checkout/confirm").await;
    assert_eq!(resp.status(), 502);

    let cart: Value = app.get("/api/cart").await.json().await.unwrap();
    assert_eq!(cart["itemsCount"], 2);

    let view: Value = app.get("/api/checkout").await.json().await.unwrap();
    assert_eq!(view["step"], "review");

    let notices = app.notices().await;
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0]["level"], "error");
}

#[tokio::test]
async fn test_order_rejection_keeps_cart_and_review() {
    let app = TestApp::spawn().await;
    app.reach_payment_step(0, "15.00", 3).await;

    Mock::given(method("POST"))
        .and(path("/orders"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "Insufficient stock" })),
        )
        .expect(1)
        .mount(&app.backend)
        .await;

    app.post("/api/checkout/payment", &json!({ "method": "cash_on_delivery" }))
        .await;
    app.post_empty("/api/checkout/continue").await;

    let resp = app.post_empty("/api/checkout/confirm").await;
    assert_eq!(resp.status(), 422);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Insufficient stock");

    let cart: Value = app.get("/api/cart").await.json().await.unwrap();
    assert_eq!(cart["itemsCount"], 3);

    let view: Value = app.get("/api/checkout").await.json().await.unwrap();
    assert_eq!(view["step"], "review");

    let notices = app.notices().await;
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0]["level"], "error");
    assert!(notices[0]["message"].as_str().unwrap().contains("Insufficient stock"));
}

#[tokio::test]
async fn test_expired_backend_token_is_reported() {
    let app = TestApp::spawn().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&app.backend)
        .await;

    let resp = app
        .post("/api/auth/session", &json!({ "token": TOKEN }))
        .await;
    assert_eq!(resp.status(), 401);

    let resp = app.get("/api/auth/session").await;
    assert_eq!(resp.status(), 401);
}
