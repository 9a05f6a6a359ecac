#![allow(dead_code)]

use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use policyhub_server::{api::app_router, build_state, config::Config};
use serde_json::Value;
use tower::ServiceExt;

pub const PASSWORD: &str = "pa55word";

pub async fn build_test_router(config: Config) -> Router {
    let config = Config {
        demo_password: PASSWORD.to_string(),
        ..config
    };
    let state = build_state(&config).await.unwrap();
    app_router(state, &config)
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, json)
}

pub async fn login(app: &Router, login: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(serde_json::json!({ "login": login, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["accessToken"].as_str().unwrap().to_string()
}

/// Polls `uri` until `ready` accepts the JSON body or two seconds pass.
pub async fn eventually<F>(app: &Router, method: Method, uri: &str, token: &str, body: Option<Value>, ready: F) -> Value
where
    F: Fn(&Value) -> bool,
{
    let mut last = Value::Null;
    for _ in 0..100 {
        let (status, json) = send(app, method.clone(), uri, Some(token), body.clone()).await;
        if status.is_success() && ready(&json) {
            return json;
        }
        last = json;
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("{uri} never became ready, last response: {last}");
}

pub fn travel_offer() -> Value {
    serde_json::json!({
        "productCode": "TRI",
        "policyFrom": "2024-07-01",
        "policyTo": "2024-07-11",
        "selectedCovers": ["C1", "C2"],
        "answers": [
            { "questionCode": "NUM_OF_ADULTS", "answer": 2 },
            { "questionCode": "NUM_OF_CHILDREN", "answer": 2 },
            { "questionCode": "DESTINATION", "answer": "EUR" }
        ]
    })
}

pub fn buy(offer_number: &str) -> Value {
    serde_json::json!({
        "offerNumber": offer_number,
        "policyHolder": { "firstName": "Anna", "lastName": "Nowak", "taxId": "11111111116" },
        "address": { "country": "PL", "zipCode": "00-001", "city": "Warsaw", "street": "Chmielna 1" }
    })
}

pub fn money(value: &Value) -> f64 {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
        .unwrap_or_else(|| panic!("not an amount: {value}"))
}

pub fn assert_amount(value: &Value, expected: f64) {
    let actual = money(value);
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected amount {expected}, got {actual}"
    );
}
