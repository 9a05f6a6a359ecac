use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use policyhub_core::payments::{BankStatementImportResult, InPayment, PolicyAccountBalance};

use crate::{error::ApiResult, main_lib::AppState};

async fn get_account_balance(
    Path(policy_number): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PolicyAccountBalance>> {
    Ok(Json(state.payment_service.get_account_balance(&policy_number)?))
}

async fn register_in_payment(
    State(state): State<Arc<AppState>>,
    Json(payment): Json<InPayment>,
) -> ApiResult<Json<PolicyAccountBalance>> {
    Ok(Json(state.payment_service.register_in_payment(payment).await?))
}

/// Body is the raw CSV statement.
#[utoipa::path(post, path = "/api/v1/payments/bank-statements", responses((status = 200, description = "Imported and rejected lines")))]
pub async fn import_bank_statement(
    State(state): State<Arc<AppState>>,
    body: String,
) -> ApiResult<Json<BankStatementImportResult>> {
    Ok(Json(state.payment_service.import_bank_statement(&body).await?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/payments/accounts/{policy_number}", get(get_account_balance))
        .route("/payments/in-payments", post(register_in_payment))
        .route("/payments/bank-statements", post(import_bank_statement))
}
