use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use policyhub_core::dashboard::{
    AgentsSales, SalesFilter, SalesTrends, SalesTrendsQuery, TotalSales,
};

use crate::{error::ApiResult, main_lib::AppState};

async fn total_sales(
    State(state): State<Arc<AppState>>,
    Json(filter): Json<SalesFilter>,
) -> ApiResult<Json<TotalSales>> {
    Ok(Json(state.dashboard_service.total_sales(&filter)?))
}

async fn agents_sales(
    State(state): State<Arc<AppState>>,
    Json(filter): Json<SalesFilter>,
) -> ApiResult<Json<AgentsSales>> {
    Ok(Json(state.dashboard_service.agents_sales(&filter)?))
}

#[utoipa::path(post, path = "/api/v1/dashboard/sales-trends", responses((status = 200, description = "Sales per period"), (status = 400, description = "Invalid date range")))]
pub async fn sales_trends(
    State(state): State<Arc<AppState>>,
    Json(query): Json<SalesTrendsQuery>,
) -> ApiResult<Json<SalesTrends>> {
    Ok(Json(state.dashboard_service.sales_trends(&query)?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/dashboard/total-sales", post(total_sales))
        .route("/dashboard/agents-sales", post(agents_sales))
        .route("/dashboard/sales-trends", post(sales_trends))
}
