use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use policyhub_core::search::PolicySearchDocument;
use serde::Deserialize;

use crate::{error::ApiResult, main_lib::AppState};

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

async fn search_policies(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<PolicySearchDocument>>> {
    Ok(Json(state.search_service.search(&query.q)?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/search/policies", get(search_policies))
}
