//! Stripe charges API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;

use super::payment::{ChargeRequest, ChargeResult, PaymentGateway};
use crate::error::PaymentError;

pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";

#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Secret key (`sk_...`).
    pub secret_key: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl StripeConfig {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            api_base: DEFAULT_STRIPE_API_BASE.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct ChargeResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    code: Option<String>,
}

/// Payment gateway backed by Stripe's `POST /v1/charges`.
pub struct StripePaymentGateway {
    config: StripeConfig,
    client: reqwest::Client,
}

impl StripePaymentGateway {
    pub fn new(config: StripeConfig) -> Result<Self, PaymentError> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", config.secret_key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|e| PaymentError::Configuration(e.to_string()))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self { config, client })
    }

    fn charges_url(&self) -> String {
        format!("{}/v1/charges", self.config.api_base.trim_end_matches('/'))
    }
}

fn decline_message(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            error: ErrorBody { message, code },
        }) => match (message, code) {
            (Some(message), Some(code)) => format!("{message} ({code})"),
            (Some(message), None) => message,
            (None, Some(code)) => code,
            (None, None) => "unknown error".to_string(),
        },
        Err(_) => body.to_string(),
    }
}

#[async_trait]
impl PaymentGateway for StripePaymentGateway {
    #[tracing::instrument(skip(self, request), fields(amount = request.amount_minor_units, currency = %request.currency))]
    async fn charge(&self, request: ChargeRequest) -> Result<ChargeResult, PaymentError> {
        let amount = request.amount_minor_units.to_string();
        let form = [
            ("amount", amount.as_str()),
            ("currency", request.currency.as_str()),
            ("source", request.token.as_str()),
            ("description", request.description.as_str()),
        ];

        let response = self
            .client
            .post(self.charges_url())
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(%status, "stripe rejected charge");
            return Err(PaymentError::Declined(decline_message(&body)));
        }

        let charge: ChargeResponse = response.json().await?;
        Ok(ChargeResult {
            charge_id: charge.id,
        })
    }
}
