//! Hosted-checkout initiation against the payment provider.
//!
//! The provider owns the whole payment flow; this service only creates a
//! checkout session for a known price id and hands the redirect URL back.

use crate::error::CampusError;
use backon::{ExponentialBuilder, Retryable};
use serde::Deserialize;
use std::time::Duration;
use tracing::error;
use url::Url;

#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub secret_key: String,
    pub endpoint: Url,
    pub success_url: Url,
    pub cancel_url: Url,
}

impl CheckoutConfig {
    pub fn from_config(cfg: &crate::config::Config) -> Result<Self, CampusError> {
        Ok(Self {
            secret_key: cfg.checkout_secret_key.clone(),
            endpoint: cfg.checkout_endpoint.clone(),
            success_url: cfg.base_url.join("checkout/success")?,
            cancel_url: cfg.base_url.join("checkout/cancelled")?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CheckoutSessionResponse {
    url: String,
}

fn default_retry_policy() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_secs(1))
        .with_max_delay(Duration::from_secs(3))
        .with_max_times(3)
        .with_jitter()
}

/// Create a hosted checkout session for `price_id` and return the URL the
/// browser should be redirected to. Server errors from the provider are
/// retried; client errors are surfaced as upstream failures.
pub async fn create_checkout_session(
    client: &reqwest::Client,
    cfg: &CheckoutConfig,
    price_id: &str,
    customer_email: &str,
) -> Result<Url, CampusError> {
    let form = [
        ("mode", "subscription"),
        ("line_items[0][price]", price_id),
        ("line_items[0][quantity]", "1"),
        ("customer_email", customer_email),
        ("success_url", cfg.success_url.as_str()),
        ("cancel_url", cfg.cancel_url.as_str()),
    ];

    let resp = (|| async {
        let resp = client
            .post(cfg.endpoint.clone())
            .bearer_auth(&cfg.secret_key)
            .form(&form)
            .send()
            .await?;
        if resp.status().is_server_error() {
            let status = resp.status();
            let err = resp.error_for_status().unwrap_err();
            error!("checkout provider server error (will retry): {}", status);
            return Err(err);
        }
        Ok(resp)
    })
    .retry(default_retry_policy())
    .await?;

    if !resp.status().is_success() {
        return Err(CampusError::UpstreamStatus(resp.status()));
    }

    let session: CheckoutSessionResponse = resp.json().await?;
    Ok(Url::parse(&session.url)?)
}
