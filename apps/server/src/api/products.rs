use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use policyhub_core::products::Product;

use crate::{error::ApiResult, main_lib::AppState};

#[utoipa::path(get, path = "/api/v1/products", responses((status = 200, description = "Product catalog")))]
pub async fn list_products(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.product_service.get_all_products()?))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{code}",
    params(("code" = String, Path, description = "Product code")),
    responses((status = 200, description = "Product"), (status = 404, description = "Unknown product"))
)]
pub async fn get_product(
    Path(code): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Product>> {
    Ok(Json(state.product_service.get_product(&code)?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/{code}", get(get_product))
}
