mod chat;
mod dashboard;
mod events;
mod payments;
mod policies;
mod pricing;
mod products;
mod search;

use std::sync::Arc;

use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{
    auth,
    config::{Config, ServiceRole},
    main_lib::AppState,
};

#[utoipa::path(get, path = "/api/v1/healthz", responses((status = 200, description = "Healthy")))]
pub async fn healthz() -> &'static str {
    "ok"
}

#[utoipa::path(get, path = "/api/v1/readyz", responses((status = 200, description = "Ready")))]
pub async fn readyz() -> &'static str {
    "ok"
}

#[derive(OpenApi)]
#[openapi(
    paths(
        healthz,
        readyz,
        products::list_products,
        products::get_product,
        pricing::calculate_price,
        policies::create_offer,
        policies::create_policy,
        policies::terminate_policy,
        payments::import_bank_statement,
        dashboard::sales_trends
    ),
    tags((name = "policyhub"))
)]
pub struct ApiDoc;

/// Routes of the services this process hosts.
fn service_routes(state: &AppState) -> Router<Arc<AppState>> {
    let mut router = Router::new()
        .route("/auth/me", get(auth::me))
        .merge(events::router());
    let mounts: [(ServiceRole, fn() -> Router<Arc<AppState>>); 7] = [
        (ServiceRole::Products, products::router),
        (ServiceRole::Pricing, pricing::router),
        (ServiceRole::Policies, policies::router),
        (ServiceRole::Payments, payments::router),
        (ServiceRole::Dashboard, dashboard::router),
        (ServiceRole::Search, search::router),
        (ServiceRole::Chat, chat::router),
    ];
    for (role, routes) in mounts {
        if state.hosts(role) {
            router = router.merge(routes());
        }
    }
    router
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin {}", o);
                    None
                }
            })
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(origins)
    };
    let cors = cors.allow_methods(Any).allow_headers(Any);

    let openapi = ApiDoc::openapi();

    let protected = service_routes(&state).route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth::require_jwt,
    ));

    let api = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/auth/login", post(auth::login))
        .merge(protected);

    Router::new()
        .nest("/api/v1", api)
        .route("/openapi.json", get(move || async move { Json(openapi) }))
        .with_state(state)
        .layer(cors)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}
