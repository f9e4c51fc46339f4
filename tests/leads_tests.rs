mod common;

use axum::http::StatusCode;
use common::{error_code, spawn_app, spawn_app_with};
use serde_json::json;

#[tokio::test]
async fn leads_require_consent() {
    let app = spawn_app().await;

    let (status, body) = app
        .request(
            "POST",
            "/api/leads",
            None,
            Some(json!({
                "name": "Iván Petrov",
                "email": "ivan@example.com",
                "consent": false
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "BAD_REQUEST");

    let stored = app
        .storage
        .leads_by_email("ivan@example.com")
        .await
        .expect("leads query");
    assert!(stored.is_empty());
}

#[tokio::test]
async fn leads_validate_name_and_email() {
    let app = spawn_app().await;

    let (status, _) = app
        .request(
            "POST",
            "/api/leads",
            None,
            Some(json!({ "name": "  ", "email": "a@b.c", "consent": true })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(
            "POST",
            "/api/leads",
            None,
            Some(json!({ "name": "Iván", "email": "not-an-email", "consent": true })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn a_consenting_lead_is_stored_with_its_locale() {
    let app = spawn_app().await;

    let (status, body) = app
        .request(
            "POST",
            "/api/leads",
            None,
            Some(json!({
                "name": "Iván Petrov",
                "email": "ivan@example.com",
                "message": "Хочу учить испанский",
                "consent": true,
                "locale": "ru"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].as_str().is_some());

    let stored = app
        .storage
        .leads_by_email("ivan@example.com")
        .await
        .expect("leads query");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].locale, "ru");
    assert_eq!(stored[0].message.as_deref(), Some("Хочу учить испанский"));
}

#[tokio::test]
async fn unknown_locales_fall_back_to_the_default() {
    let app = spawn_app().await;

    let (status, _) = app
        .request(
            "POST",
            "/api/leads",
            None,
            Some(json!({
                "name": "Jan Kowalski",
                "email": "jan@example.com",
                "consent": true,
                "locale": "pl"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let stored = app
        .storage
        .leads_by_email("jan@example.com")
        .await
        .expect("leads query");
    assert_eq!(stored[0].locale, "es");
}

#[tokio::test]
async fn a_missing_challenge_token_fails_when_verification_is_on() {
    let app = spawn_app_with(common::botcheck_options()).await;

    let (status, body) = app
        .request(
            "POST",
            "/api/leads",
            None,
            Some(json!({
                "name": "Iván Petrov",
                "email": "ivan@example.com",
                "consent": true
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "BAD_REQUEST");
}

#[tokio::test]
async fn lead_submissions_are_rate_limited_per_client() {
    let app = spawn_app().await;

    for i in 0..5 {
        let (status, _) = app
            .request(
                "POST",
                "/api/leads",
                None,
                Some(json!({
                    "name": "Iván Petrov",
                    "email": format!("ivan+{i}@example.com"),
                    "consent": true
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "submission {i}");
    }

    let (status, body) = app
        .request(
            "POST",
            "/api/leads",
            None,
            Some(json!({
                "name": "Iván Petrov",
                "email": "ivan+burst@example.com",
                "consent": true
            })),
        )
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(error_code(&body), "RATE_LIMITED");
}
