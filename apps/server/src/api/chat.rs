use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use policyhub_core::chat::{ChatMessage, SendChatMessage};
use policyhub_core::constants::CHAT_HISTORY_LIMIT;
use serde::Deserialize;

use crate::{auth::Claims, error::ApiResult, main_lib::AppState};

#[derive(Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

async fn recent_messages(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<Vec<ChatMessage>>> {
    let limit = query.limit.unwrap_or(CHAT_HISTORY_LIMIT);
    Ok(Json(state.chat_service.recent(limit)?))
}

async fn send_message(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<SendChatMessage>,
) -> ApiResult<(StatusCode, Json<ChatMessage>)> {
    let message = state.chat_service.send(&claims.sub, &body.text).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/chat/messages", get(recent_messages).post(send_message))
}
