//! Integration test harness for QuickKart.
//!
//! Each test gets its own fake catalog and its own storefront, both bound to
//! ephemeral ports on `127.0.0.1`, and a cookie-keeping HTTP client so a test
//! behaves like one browser tab.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p quickkart-integration-tests
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use quickkart_storefront::config::QuickKartConfig;
use quickkart_storefront::state::AppState;
use reqwest::Client;
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// How long the simulated payment takes in tests.
pub const PAYMENT_DELAY_MS: u64 = 200;

/// The catalog served by [`FakeCatalog`] until a test replaces it.
#[must_use]
pub fn default_products() -> Vec<Value> {
    vec![
        json!({
            "id": 1,
            "title": "Mug",
            "price": 9.99,
            "description": "A sturdy ceramic mug.",
            "category": "kitchen",
            "image": "https://img.example/mug.jpg",
            "rating": { "rate": 4.1, "count": 120 }
        }),
        json!({
            "id": 2,
            "title": "Cotton Jacket",
            "price": 55.99,
            "description": "Great outerwear for spring and autumn.",
            "category": "men's clothing",
            "image": "https://img.example/jacket.jpg",
            "rating": { "rate": 4.7, "count": 500 }
        }),
    ]
}

#[derive(Default)]
struct CatalogData {
    products: Mutex<Vec<Value>>,
    failing: AtomicBool,
    list_requests: AtomicUsize,
    product_requests: AtomicUsize,
}

/// A stand-in for the remote product catalog.
#[derive(Clone)]
pub struct FakeCatalog {
    pub url: String,
    data: Arc<CatalogData>,
}

impl FakeCatalog {
    /// Serve [`default_products`] on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    #[allow(clippy::unwrap_used)]
    pub async fn spawn() -> Self {
        let data = Arc::new(CatalogData {
            products: Mutex::new(default_products()),
            ..CatalogData::default()
        });

        let app = Router::new()
            .route("/products", get(list_products))
            .route("/products/{id}", get(get_product))
            .with_state(Arc::clone(&data));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self { url, data }
    }

    /// Make every request answer with HTTP 500 (or stop doing so).
    pub fn set_failing(&self, failing: bool) {
        self.data.failing.store(failing, Ordering::SeqCst);
    }

    /// Replace the catalog contents.
    pub fn set_products(&self, products: Vec<Value>) {
        *self
            .data
            .products
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = products;
    }

    /// Number of `GET /products` requests received.
    #[must_use]
    pub fn list_requests(&self) -> usize {
        self.data.list_requests.load(Ordering::SeqCst)
    }

    /// Number of `GET /products/{id}` requests received.
    #[must_use]
    pub fn product_requests(&self) -> usize {
        self.data.product_requests.load(Ordering::SeqCst)
    }
}

async fn list_products(State(data): State<Arc<CatalogData>>) -> Response {
    data.list_requests.fetch_add(1, Ordering::SeqCst);
    if data.failing.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let products = data
        .products
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    Json(products).into_response()
}

/// Unknown ids get an empty 200 body, the way the public catalog answers.
async fn get_product(State(data): State<Arc<CatalogData>>, Path(id): Path<u64>) -> Response {
    data.product_requests.fetch_add(1, Ordering::SeqCst);
    if data.failing.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let product = data
        .products
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .find(|p| p.get("id").and_then(Value::as_u64) == Some(id))
        .cloned();
    match product {
        Some(product) => Json(product).into_response(),
        None => (StatusCode::OK, "").into_response(),
    }
}

/// A running storefront wired to a [`FakeCatalog`].
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    pub catalog: FakeCatalog,
}

impl TestContext {
    /// Start a catalog and a storefront, and open the home page so the
    /// client holds a fresh session.
    ///
    /// # Panics
    ///
    /// Panics if either server cannot start.
    #[allow(clippy::unwrap_used)]
    pub async fn new() -> Self {
        let catalog = FakeCatalog::spawn().await;

        let payment_delay = PAYMENT_DELAY_MS.to_string();
        let vars: HashMap<&str, &str> = HashMap::from([
            ("QUICKKART_CATALOG_URL", catalog.url.as_str()),
            ("QUICKKART_CATALOG_TIMEOUT_SECS", "5"),
            ("QUICKKART_PAYMENT_DELAY_MS", payment_delay.as_str()),
            ("QUICKKART_CONTACT_DELAY_MS", "10"),
        ]);
        let config =
            QuickKartConfig::from_lookup(|key| vars.get(key).map(ToString::to_string)).unwrap();
        let app = quickkart_storefront::app(AppState::new(config).unwrap());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap();

        let ctx = Self {
            client,
            base_url,
            catalog,
        };
        let home = ctx.get("/").await;
        assert_eq!(home.status(), StatusCode::OK);
        ctx
    }

    /// Absolute URL for a storefront path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET` a storefront path.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    #[allow(clippy::unwrap_used)]
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    /// `POST` a form to a storefront path.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    #[allow(clippy::unwrap_used)]
    pub async fn post(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .unwrap()
    }

    /// `GET` a path and return its body.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the body cannot be read.
    #[allow(clippy::unwrap_used)]
    pub async fn get_text(&self, path: &str) -> String {
        self.get(path).await.text().await.unwrap()
    }

    /// Current value of the cart count badge (0 when hidden).
    ///
    /// # Panics
    ///
    /// Panics if the badge cannot be fetched or parsed.
    #[allow(clippy::unwrap_used)]
    pub async fn cart_count(&self) -> u64 {
        let badge = self.get_text("/cart/count").await;
        let start = badge.find('>').unwrap() + 1;
        let end = badge.rfind("</span>").unwrap();
        let text = badge.get(start..end).unwrap().trim();
        if text.is_empty() { 0 } else { text.parse().unwrap() }
    }

    /// Add a product to the cart the way the product modal does.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn add_to_cart(&self, product_id: u32, quantity: u32, size: &str) -> reqwest::Response {
        let product_id = product_id.to_string();
        let quantity = quantity.to_string();
        self.post(
            "/cart/add",
            &[
                ("product_id", product_id.as_str()),
                ("quantity", quantity.as_str()),
                ("size", size),
            ],
        )
        .await
    }
}

/// Pull the value of the first `attr="..."` in `html`.
#[must_use]
pub fn attribute<'a>(html: &'a str, attr: &str) -> Option<&'a str> {
    let needle = format!("{attr}=\"");
    let start = html.find(&needle)? + needle.len();
    let len = html.get(start..)?.find('"')?;
    html.get(start..start + len)
}
