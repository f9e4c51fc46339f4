use axum::{Json, extract::State, http::HeaderMap, http::StatusCode};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use std::str::FromStr;
use tracing::info;

use crate::db::models::Lead;
use crate::error::CampusError;
use crate::middleware::locale::Locale;
use crate::router::CampusState;
use crate::service::botcheck;

#[derive(Debug, Deserialize)]
pub struct LeadForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub consent: bool,
    #[serde(default)]
    pub challenge_token: String,
    #[serde(default)]
    pub locale: Option<String>,
}

/// POST /api/leads -> public lead capture. Consent gates everything; the
/// bot-challenge token is verified when a challenge secret is configured.
pub async fn submit_lead(
    State(state): State<CampusState>,
    headers: HeaderMap,
    Json(form): Json<LeadForm>,
) -> Result<(StatusCode, Json<Value>), CampusError> {
    if !form.consent {
        return Err(CampusError::Validation(
            "consent is required to submit the form".to_string(),
        ));
    }
    let name = form.name.trim();
    if name.is_empty() {
        return Err(CampusError::Validation("name is required".to_string()));
    }
    let email = form.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(CampusError::Validation(
            "a valid email is required".to_string(),
        ));
    }

    let client_ip = client_ip(&headers);
    let limiter_key = client_ip.clone().unwrap_or_else(|| "local".to_string());
    if state.lead_limiter.check_key(&limiter_key).is_err() {
        return Err(CampusError::RateLimited);
    }

    if let Some(cfg) = &state.botcheck {
        let token = form.challenge_token.trim();
        if token.is_empty() {
            return Err(CampusError::Validation(
                "bot challenge token is required".to_string(),
            ));
        }
        let passed =
            botcheck::verify_token(&state.http, cfg, token, client_ip.as_deref()).await?;
        if !passed {
            return Err(CampusError::Validation(
                "bot challenge verification failed".to_string(),
            ));
        }
    }

    let locale = form
        .locale
        .as_deref()
        .and_then(|s| Locale::from_str(s).ok())
        .unwrap_or_default();

    let lead = Lead {
        id: uuid::Uuid::new_v4().to_string(),
        name: name.to_string(),
        email: email.to_string(),
        locale: locale.as_str().to_string(),
        message: form.message.filter(|m| !m.trim().is_empty()),
        consent: true,
        created_at: Utc::now(),
    };
    state.storage.insert_lead(&lead).await?;
    info!(lead_id = %lead.id, locale = %lead.locale, "lead captured");
    Ok((StatusCode::CREATED, Json(json!({ "id": lead.id }))))
}

fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
