use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use axum_extra::extract::cookie::CookieJar;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::db::models::{Profile, Role};
use crate::error::CampusError;
use crate::router::CampusState;

/// Cookie set at login so campus pages work without an Authorization header.
pub const SESSION_COOKIE: &str = "campus_session";

/// Pull the session token off a request: `Authorization: Bearer <token>`
/// wins, the session cookie is the browser fallback.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        let auth = auth.trim();
        if let Some(token) = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
        {
            return Some(token.to_string());
        }
    }
    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
}

/// Any authenticated campus account.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Profile);

impl FromRequestParts<CampusState> for AuthUser {
    type Rejection = CampusError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &CampusState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers) else {
            return Err(CampusError::Unauthorized);
        };
        let profile = state
            .storage
            .profile_by_token(&token)
            .await?
            .ok_or(CampusError::Unauthorized)?;
        Ok(Self(profile))
    }
}

/// Authenticated-or-not, for page routes that redirect instead of failing.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<Profile>);

impl FromRequestParts<CampusState> for MaybeAuthUser {
    type Rejection = CampusError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &CampusState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers) else {
            return Ok(Self(None));
        };
        Ok(Self(state.storage.profile_by_token(&token).await?))
    }
}

/// Admin-only gate for the management endpoints.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Profile);

impl FromRequestParts<CampusState> for RequireAdmin {
    type Rejection = CampusError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &CampusState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(profile) = AuthUser::from_request_parts(parts, state).await?;
        if profile.role != Role::Admin {
            return Err(CampusError::Forbidden);
        }
        Ok(Self(profile))
    }
}

/// Teacher-or-admin gate for scheduling operations.
#[derive(Debug, Clone)]
pub struct RequireStaff(pub Profile);

impl FromRequestParts<CampusState> for RequireStaff {
    type Rejection = CampusError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &CampusState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(profile) = AuthUser::from_request_parts(parts, state).await?;
        if !matches!(profile.role, Role::Admin | Role::Teacher) {
            return Err(CampusError::Forbidden);
        }
        Ok(Self(profile))
    }
}

pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let candidate = hash_password(password);
    bool::from(candidate.as_bytes().ct_eq(stored_hash.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_roundtrip() {
        let hash = hash_password("correct horse");
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer tok-header".parse().unwrap());
        headers.insert("cookie", "campus_session=tok-cookie".parse().unwrap());
        assert_eq!(session_token(&headers).as_deref(), Some("tok-header"));
    }

    #[test]
    fn cookie_is_the_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", "campus_session=tok-cookie".parse().unwrap());
        assert_eq!(session_token(&headers).as_deref(), Some("tok-cookie"));
        assert_eq!(session_token(&HeaderMap::new()), None);
    }
}
