//! Happy-path checkouts through the HTTP surface.

use franco_sport_core::Money;
use franco_sport_integration_tests::TestApp;
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

fn money(value: &Value) -> Money {
    serde_json::from_value(value.clone()).expect("money amount")
}

fn proof_form() -> Form {
    let part = Part::bytes(vec![0x89, b'P', b'N', b'G', 1, 2, 3])
        .file_name("receipt.png")
        .mime_str("image/png")
        .expect("valid mime");
    Form::new().part("proof", part)
}

// ============================================================================
// Cash on delivery
// ============================================================================

#[tokio::test]
async fn test_cash_on_delivery_order_is_placed_and_cart_emptied() {
    let app = TestApp::spawn().await;
    app.reach_payment_step(0, "15.00", 2).await;

    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(body_partial_json(json!({
            "items": [{ "productId": 1, "quantity": 2 }],
            "shippingAddressId": 5,
            "paymentMethod": "CASH_ON_DELIVERY",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 77,
            "orderNumber": "FS-0077",
        })))
        .expect(1)
        .mount(&app.backend)
        .await;

    let resp = app
        .post("/api/checkout/payment", &json!({ "method": "cash_on_delivery" }))
        .await;
    assert_eq!(resp.status(), 200);

    let view: Value = app
        .post_empty("/api/checkout/continue")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(view["step"], "review");
    assert_eq!(money(&view["totals"]["total"]), money(&json!("30.00")));

    let resp = app.post_empty("/api/checkout/confirm").await;
    assert_eq!(resp.status(), 201);
    let placed: Value = resp.json().await.unwrap();
    assert_eq!(placed["orderId"], 77);
    assert_eq!(placed["redirect"], "/orders/77");

    let cart: Value = app.get("/api/cart").await.json().await.unwrap();
    assert_eq!(cart["items"], json!([]));
    assert_eq!(cart["itemsCount"], 0);

    let notices = app.notices().await;
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0]["level"], "success");
    assert!(notices[0]["message"].as_str().unwrap().contains("FS-0077"));

    // Checkout is gone along with the cart
    let resp = app.get("/api/checkout").await;
    assert_eq!(resp.status(), 409);
}

// ============================================================================
// QR transfer
// ============================================================================

#[tokio::test]
async fn test_qr_transfer_needs_proof_before_review() {
    let app = TestApp::spawn().await;
    app.reach_payment_step(0, "15.00", 1).await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "url": "https://cdn.example.com/receipt.png" })),
        )
        .expect(1)
        .mount(&app.backend)
        .await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(body_partial_json(json!({
            "paymentMethod": "BANK_TRANSFER",
            "paymentProofUrl": "https://cdn.example.com/receipt.png",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 78 })))
        .expect(1)
        .mount(&app.backend)
        .await;

    let view: Value = app
        .post("/api/checkout/payment", &json!({ "method": "qr_transfer" }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(view["canContinue"], false);

    let resp = app.post_empty("/api/checkout/continue").await;
    assert_eq!(resp.status(), 422);

    let resp = app
        .client
        .post(app.url("/api/checkout/proof"))
        .multipart(proof_form())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let view: Value = resp.json().await.unwrap();
    assert_eq!(view["proof"]["fileName"], "receipt.png");
    assert!(
        view["proof"]["previewUrl"]
            .as_str()
            .unwrap()
            .starts_with("data:image/png;base64,")
    );
    assert_eq!(view["canContinue"], true);

    let view: Value = app
        .post_empty("/api/checkout/continue")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(view["step"], "review");

    let resp = app.post_empty("/api/checkout/confirm").await;
    assert_eq!(resp.status(), 201);
    let placed: Value = resp.json().await.unwrap();
    assert_eq!(placed["redirect"], "/orders/78");
}

#[tokio::test]
async fn test_switching_to_cash_discards_proof() {
    let app = TestApp::spawn().await;
    app.reach_payment_step(0, "15.00", 1).await;

    app.post("/api/checkout/payment", &json!({ "method": "qr_transfer" }))
        .await;
    let resp = app
        .client
        .post(app.url("/api/checkout/proof"))
        .multipart(proof_form())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let view: Value = app
        .post("/api/checkout/payment", &json!({ "method": "cash_on_delivery" }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(view["paymentMethod"], "cash_on_delivery");
    assert_eq!(view["proof"], Value::Null);
}

#[tokio::test]
async fn test_non_image_proof_is_rejected() {
    let app = TestApp::spawn().await;
    app.reach_payment_step(0, "15.00", 1).await;
    app.post("/api/checkout/payment", &json!({ "method": "qr_transfer" }))
        .await;

    let part = Part::bytes(b"%PDF-1.7".to_vec())
        .file_name("receipt.pdf")
        .mime_str("application/pdf")
        .unwrap();
    let resp = app
        .client
        .post(app.url("/api/checkout/proof"))
        .multipart(Form::new().part("proof", part))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let view: Value = app.get("/api/checkout").await.json().await.unwrap();
    assert_eq!(view["proof"], Value::Null);
}

// ============================================================================
// Loyalty redemption
// ============================================================================

#[tokio::test]
async fn test_redemption_is_capped_at_subtotal() {
    let app = TestApp::spawn().await;
    app.reach_payment_step(5000, "30.00", 1).await;

    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(body_partial_json(json!({ "redeemPoints": 3000 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 79 })))
        .expect(1)
        .mount(&app.backend)
        .await;

    let view: Value = app
        .post("/api/checkout/redemption", &json!({ "points": 5000 }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(view["redemption"]["balance"], 5000);
    assert_eq!(view["redemption"]["max"], 3000);
    assert_eq!(view["redemption"]["points"], 3000);
    assert!(money(&view["totals"]["total"]).is_zero());

    app.post("/api/checkout/payment", &json!({ "method": "cash_on_delivery" }))
        .await;
    app.post_empty("/api/checkout/continue").await;

    let resp = app.post_empty("/api/checkout/confirm").await;
    assert_eq!(resp.status(), 201);
}

#[tokio::test]
async fn test_back_keeps_selections() {
    let app = TestApp::spawn().await;
    app.reach_payment_step(0, "15.00", 1).await;

    app.post("/api/checkout/payment", &json!({ "method": "cash_on_delivery" }))
        .await;
    app.post_empty("/api/checkout/continue").await;

    let view: Value = app
        .post_empty("/api/checkout/back")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(view["step"], "payment");
    assert_eq!(view["paymentMethod"], "cash_on_delivery");

    let view: Value = app
        .post_empty("/api/checkout/back")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(view["step"], "address");
    assert_eq!(view["selectedAddress"], 5);

    let resp = app.post_empty("/api/checkout/back").await;
    assert_eq!(resp.status(), 422);
}
