use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::info;

use crate::db::models::Profile;
use crate::error::CampusError;
use crate::middleware::auth::AuthUser;
use crate::router::CampusState;

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: String,
}

/// POST /api/account/update-profile -> the caller's updated profile.
pub async fn update_profile(
    State(state): State<CampusState>,
    AuthUser(mut profile): AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<Profile>, CampusError> {
    let full_name = req.full_name.trim();
    if full_name.is_empty() {
        return Err(CampusError::Validation("full_name is required".to_string()));
    }
    if full_name.chars().count() > 200 {
        return Err(CampusError::Validation(
            "full_name is limited to 200 characters".to_string(),
        ));
    }

    state.storage.update_full_name(&profile.id, full_name).await?;
    profile.full_name = full_name.to_string();
    info!(profile_id = %profile.id, "profile updated");
    Ok(Json(profile))
}
