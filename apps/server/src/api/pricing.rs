use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use policyhub_core::pricing::{CalculationResult, PricingParams};

use crate::{error::ApiResult, main_lib::AppState};

#[utoipa::path(
    post,
    path = "/api/v1/pricing/calculate",
    responses((status = 200, description = "Premium per cover and total"), (status = 400, description = "Invalid parameters"))
)]
pub async fn calculate_price(
    State(state): State<Arc<AppState>>,
    Json(params): Json<PricingParams>,
) -> ApiResult<Json<CalculationResult>> {
    let result = state.pricing_service.calculate_price(params).await?;
    Ok(Json(result))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/pricing/calculate", post(calculate_price))
}
