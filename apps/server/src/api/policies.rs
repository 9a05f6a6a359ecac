use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use policyhub_core::policies::{
    CreateOffer, CreatePolicy, Offer, PolicyDetails, TerminatePolicy, TerminationResult,
};

use crate::{auth::Claims, error::ApiResult, main_lib::AppState};

#[utoipa::path(post, path = "/api/v1/offers", responses((status = 201, description = "Priced offer")))]
pub async fn create_offer(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(command): Json<CreateOffer>,
) -> ApiResult<(StatusCode, Json<Offer>)> {
    let offer = state.policy_service.create_offer(command, &claims.sub).await?;
    Ok((StatusCode::CREATED, Json(offer)))
}

async fn get_offer(
    Path(number): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Offer>> {
    Ok(Json(state.policy_service.get_offer(&number)?))
}

#[utoipa::path(post, path = "/api/v1/policies", responses((status = 201, description = "Policy created from an offer"), (status = 409, description = "Offer expired or already used")))]
pub async fn create_policy(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(command): Json<CreatePolicy>,
) -> ApiResult<(StatusCode, Json<PolicyDetails>)> {
    let policy = state
        .policy_service
        .create_policy(command, &claims.sub)
        .await?;
    Ok((StatusCode::CREATED, Json(policy)))
}

async fn get_policy(
    Path(number): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PolicyDetails>> {
    Ok(Json(state.policy_service.get_policy(&number)?))
}

#[utoipa::path(
    post,
    path = "/api/v1/policies/{number}/terminate",
    params(("number" = String, Path, description = "Policy number")),
    responses((status = 200, description = "Amount to return"), (status = 409, description = "Already terminated"))
)]
pub async fn terminate_policy(
    Path(number): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(command): Json<TerminatePolicy>,
) -> ApiResult<Json<TerminationResult>> {
    let result = state
        .policy_service
        .terminate_policy(&number, command)
        .await?;
    Ok(Json(result))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/offers", post(create_offer))
        .route("/offers/{number}", get(get_offer))
        .route("/policies", post(create_policy))
        .route("/policies/{number}", get(get_policy))
        .route("/policies/{number}/terminate", post(terminate_policy))
}
