//! Catalog route handler.

use axum::{Json, extract::State};
use cartwheel_core::Product;
use serde::Serialize;

use crate::state::AppState;

/// Response body of `GET /catalog`.
#[derive(Debug, Serialize)]
pub struct CatalogView {
    pub catalog: Vec<Product>,
}

/// List every product in catalog order.
pub async fn index(State(state): State<AppState>) -> Json<CatalogView> {
    let catalog = state.catalog().products().to_vec();
    tracing::info!(
        event = "catalog.view",
        products = catalog.len(),
        "Catalog viewed"
    );
    Json(CatalogView { catalog })
}
