//! Bot-challenge token verification for the public lead form.

use crate::error::CampusError;
use serde::Deserialize;
use tracing::warn;
use url::Url;

#[derive(Debug, Clone)]
pub struct BotcheckConfig {
    pub verify_endpoint: Url,
    pub secret: String,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// Verify a challenge token with the provider. A transport failure is an
/// upstream error, not a silent pass.
pub async fn verify_token(
    client: &reqwest::Client,
    cfg: &BotcheckConfig,
    token: &str,
    remote_ip: Option<&str>,
) -> Result<bool, CampusError> {
    let mut form = vec![
        ("secret", cfg.secret.as_str()),
        ("response", token),
    ];
    if let Some(ip) = remote_ip {
        form.push(("remoteip", ip));
    }

    let resp = client
        .post(cfg.verify_endpoint.clone())
        .form(&form)
        .send()
        .await?;
    if !resp.status().is_success() {
        return Err(CampusError::UpstreamStatus(resp.status()));
    }

    let verdict: VerifyResponse = resp.json().await?;
    if !verdict.success {
        warn!(errors = ?verdict.error_codes, "bot challenge verification rejected a token");
    }
    Ok(verdict.success)
}
