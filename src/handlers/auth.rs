use axum::{
    Json,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::db::models::Role;
use crate::error::CampusError;
use crate::middleware::auth::{SESSION_COOKIE, session_token, verify_password};
use crate::router::CampusState;

const TOKEN_TTL_DAYS: i64 = 30;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
    pub full_name: String,
}

/// POST /api/auth/login -> bearer token plus a session cookie for page routes.
pub async fn login(
    State(state): State<CampusState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, CampusError> {
    let profile = state
        .storage
        .profile_by_email(req.email.trim())
        .await?
        .ok_or(CampusError::Unauthorized)?;
    if !verify_password(&req.password, &profile.password_hash) {
        return Err(CampusError::Unauthorized);
    }

    let token = uuid::Uuid::new_v4().to_string();
    let expires_at = Utc::now() + Duration::days(TOKEN_TTL_DAYS);
    state
        .storage
        .insert_token(&token, &profile.id, expires_at)
        .await?;

    let jar = jar.add(session_cookie(token.clone()));
    info!(profile_id = %profile.id, role = %profile.role, "session opened");
    Ok((
        jar,
        Json(LoginResponse {
            token,
            role: profile.role,
            full_name: profile.full_name,
        }),
    ))
}

/// POST /api/auth/logout -> revokes the presented token.
pub async fn logout(
    State(state): State<CampusState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<impl IntoResponse, CampusError> {
    let Some(token) = session_token(&headers) else {
        return Err(CampusError::Unauthorized);
    };
    state.storage.delete_token(&token).await?;
    let jar = jar.remove(clear_cookie());
    Ok((jar, Json(json!({ "ok": true }))))
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build(Cookie::new(SESSION_COOKIE.to_string(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(TOKEN_TTL_DAYS))
        .build()
}

fn clear_cookie() -> Cookie<'static> {
    Cookie::build(Cookie::new(SESSION_COOKIE.to_string(), ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}
