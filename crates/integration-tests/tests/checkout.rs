//! Simulated payment from the cart panel.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use quickkart_integration_tests::{PAYMENT_DELAY_MS, TestContext, attribute};
use reqwest::StatusCode;

/// Start a payment and return the polling path from its toast.
async fn start_payment(ctx: &TestContext) -> String {
    let response = ctx.post("/checkout/pay", &[]).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("Processing Payment..."));
    attribute(&html, "hx-get").unwrap().to_string()
}

async fn wait_past_payment_delay() {
    tokio::time::sleep(Duration::from_millis(PAYMENT_DELAY_MS * 3)).await;
}

#[tokio::test]
async fn test_pay_with_empty_cart_is_rejected() {
    let ctx = TestContext::new().await;

    let response = ctx.post("/checkout/pay", &[]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_payment_succeeds_after_delay() {
    let ctx = TestContext::new().await;
    ctx.add_to_cart(1, 3, "M").await;

    let poll_path = start_payment(&ctx).await;
    assert!(poll_path.starts_with("/checkout/pay/"));

    let early = ctx.get_text(&poll_path).await;
    assert!(early.contains("Processing Payment..."));

    wait_past_payment_delay().await;
    let done = ctx.get_text(&poll_path).await;
    assert!(done.contains("Payment Successful!"));
    assert!(!done.contains("hx-get"));

    // The outcome is reported once.
    assert!(ctx.get_text(&poll_path).await.trim().is_empty());

    // Paying leaves the cart alone.
    assert_eq!(ctx.cart_count().await, 3);
}

#[tokio::test]
async fn test_closing_the_cart_cancels_the_payment() {
    let ctx = TestContext::new().await;
    ctx.add_to_cart(2, 1, "L").await;
    ctx.get_text("/cart/panel").await;

    let poll_path = start_payment(&ctx).await;
    let response = ctx.post("/cart/close", &[]).await;
    assert_eq!(response.status(), StatusCode::OK);

    wait_past_payment_delay().await;
    let html = ctx.get_text(&poll_path).await;
    assert!(!html.contains("Payment Successful!"));
    assert!(html.trim().is_empty());
}

#[tokio::test]
async fn test_reloading_the_page_cancels_the_payment() {
    let ctx = TestContext::new().await;
    ctx.add_to_cart(1, 1, "S").await;

    let poll_path = start_payment(&ctx).await;
    ctx.get_text("/").await;

    wait_past_payment_delay().await;
    assert!(ctx.get_text(&poll_path).await.trim().is_empty());
}

#[tokio::test]
async fn test_unknown_payment_renders_nothing() {
    let ctx = TestContext::new().await;

    let response = ctx
        .get("/checkout/pay/6f1c1f7e-8a47-4c4e-9a57-2f0e7c1b9d10")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().trim().is_empty());

    let response = ctx.get("/checkout/pay/not-a-uuid").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
