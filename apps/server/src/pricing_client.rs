//! HTTP client for a pricing service running in another process.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use policyhub_core::errors::{Error, Result, ValidationError};
use policyhub_core::pricing::{CalculationResult, PricingParams, PricingServiceTrait};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::auth::AuthManager;

const CALCULATE_PATH: &str = "/api/v1/pricing/calculate";

#[derive(Deserialize)]
struct RemoteErrorBody {
    message: Option<String>,
}

pub struct RemotePricingClient {
    client: reqwest::Client,
    base_url: String,
    auth: Arc<AuthManager>,
    service_name: String,
}

impl RemotePricingClient {
    pub fn new(
        base_url: &str,
        auth: Arc<AuthManager>,
        service_name: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Unexpected(format!("Failed to initialize HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
            service_name: service_name.to_string(),
        })
    }

    async fn parse_response(
        &self,
        product_code: &str,
        response: reqwest::Response,
    ) -> Result<CalculationResult> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Remote(format!("Failed to read pricing response: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<RemoteErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| body.chars().take(200).collect());
            return Err(remote_error(status, product_code, message));
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::Remote(format!("Failed to parse pricing response: {}", e)))
    }
}

/// Maps a failed pricing response onto the error the local service would
/// have raised. Server-side failures stay remote errors.
fn remote_error(status: StatusCode, product_code: &str, message: String) -> Error {
    match status {
        StatusCode::BAD_REQUEST => ValidationError::InvalidInput(message).into(),
        StatusCode::NOT_FOUND => Error::not_found("Tariff", product_code),
        StatusCode::CONFLICT => Error::ConstraintViolation(message),
        _ => Error::Remote(format!("Pricing returned {}: {}", status, message)),
    }
}

#[async_trait]
impl PricingServiceTrait for RemotePricingClient {
    async fn calculate_price(&self, params: PricingParams) -> Result<CalculationResult> {
        let token = self
            .auth
            .issue_service_token(&self.service_name)
            .map_err(|e| Error::Unexpected(format!("Failed to sign service token: {:?}", e)))?;
        let url = format!("{}{}", self.base_url, CALCULATE_PATH);
        let product_code = params.product_code.clone();
        tracing::debug!("POST {} for product {}", url, product_code);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&params)
            .send()
            .await
            .map_err(|e| Error::Remote(format!("Pricing request failed: {}", e)))?;

        self.parse_response(&product_code, response).await
    }
}
