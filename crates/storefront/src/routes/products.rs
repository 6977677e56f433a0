//! Product route handlers.
//!
//! The grid and the detail modal are fetched fresh from the catalog on every
//! request. Failures render as visible states inside the fragment; only
//! session errors become error responses.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use quickkart_core::{FetchState, ProductId, ProductRecord};
use tower_sessions::Session;
use tracing::{debug, instrument, warn};

use crate::error::Result;
use crate::models::session;
use crate::state::AppState;

/// Quantities offered in the product modal.
pub const QUANTITY_OPTIONS: [u32; 5] = [1, 2, 3, 4, 5];

/// Sizes offered in the product modal. The first one is preselected.
pub const SIZE_OPTIONS: [&str; 4] = ["S", "M", "L", "XL"];

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: String,
    pub image_url: String,
    pub stars: Vec<bool>,
    pub rating_count: u32,
}

impl From<&ProductRecord> for ProductView {
    fn from(product: &ProductRecord) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            price: product.display_price().display(),
            image_url: product.image_url.clone(),
            stars: product.rating.stars(),
            rating_count: product.rating.count,
        }
    }
}

/// Catalog grid fragment template (for HTMX).
///
/// `Loading` renders the placeholder that requests the grid on load.
#[derive(Template, WebTemplate)]
#[template(path = "partials/product_grid.html")]
pub struct ProductGridTemplate {
    pub products: FetchState<Vec<ProductView>>,
}

/// Product modal fragment template (for HTMX).
///
/// `retry_id` is set when a failed fetch is worth retrying; a product the
/// catalog does not know gets the message only.
#[derive(Template, WebTemplate)]
#[template(path = "partials/product_modal.html")]
pub struct ProductModalTemplate {
    pub product: FetchState<ProductView>,
    pub retry_id: Option<ProductId>,
    pub quantity_options: &'static [u32],
    pub size_options: &'static [&'static str],
    pub scroll_locked: bool,
}

/// Render the catalog grid.
#[instrument(skip(state))]
pub async fn grid(State(state): State<AppState>) -> ProductGridTemplate {
    let result = state.catalog().list_products().await.map_err(|e| {
        warn!(error = %e, "Failed to load product grid");
        e.user_message()
    });

    let products = FetchState::from_result(result)
        .map(|products| products.iter().map(ProductView::from).collect::<Vec<_>>());

    if let Some(products) = products.data() {
        debug!(count = products.len(), "Rendering product grid");
    }

    ProductGridTemplate { products }
}

/// Open a product in the detail modal.
///
/// The selection is stored before the catalog is asked for the product, so
/// a failed fetch still shows an open (and closable) modal.
#[instrument(skip(state, session))]
pub async fn quick_view(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
) -> Result<ProductModalTemplate> {
    let mut selection = session::load_selection(&session).await?;
    let change = selection.select(id);
    session::save_selection(&session, &selection).await?;
    debug!(product_id = %id, ?change, "Product selected");

    let (product, retry_id) = match state.catalog().get_product(id).await {
        Ok(product) => (FetchState::Ready(ProductView::from(&product)), None),
        Err(e) => {
            warn!(product_id = %id, error = %e, "Failed to load product details");
            (
                FetchState::Failed(e.user_message().to_string()),
                e.is_retryable().then_some(id),
            )
        }
    };

    Ok(ProductModalTemplate {
        product,
        retry_id,
        quantity_options: &QUANTITY_OPTIONS,
        size_options: &SIZE_OPTIONS,
        scroll_locked: selection.scroll_locked(),
    })
}
