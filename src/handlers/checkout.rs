use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::error::CampusError;
use crate::middleware::auth::AuthUser;
use crate::router::CampusState;
use crate::service::{billing, pricing};

#[derive(Debug, Deserialize)]
pub struct CreateCheckoutRequest {
    pub price_id: String,
}

/// POST /api/create-checkout -> URL of the provider's hosted checkout page.
pub async fn create_checkout(
    State(state): State<CampusState>,
    AuthUser(profile): AuthUser,
    Json(req): Json<CreateCheckoutRequest>,
) -> Result<Json<Value>, CampusError> {
    let price_id = req.price_id.trim();
    if price_id.is_empty() {
        return Err(CampusError::Validation("price_id is required".to_string()));
    }
    let Some(package) = state.storage.package_by_price_id(price_id).await? else {
        return Err(CampusError::Validation("unknown price id".to_string()));
    };
    let Some(months) = package.duration_for_price_id(price_id) else {
        return Err(CampusError::Validation("unknown price id".to_string()));
    };
    let total_cents = pricing::duration_total_cents(package.monthly_price_cents, months);

    let url = billing::create_checkout_session(
        &state.http,
        &state.checkout,
        price_id,
        &profile.email,
    )
    .await?;

    info!(
        profile_id = %profile.id,
        package = %package.name,
        price_id = %price_id,
        months,
        "hosted checkout session created"
    );
    Ok(Json(json!({
        "url": url.as_str(),
        "months": months,
        "total_cents": total_cents,
    })))
}
