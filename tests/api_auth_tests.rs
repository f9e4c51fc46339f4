mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{TEST_PASSWORD, error_code, spawn_app};
use lingua_campus::db::models::Role;
use serde_json::json;

#[tokio::test]
async fn every_protected_api_route_returns_401_without_a_token() {
    let app = spawn_app().await;

    let cases: Vec<(&str, &str, Option<serde_json::Value>)> = vec![
        ("POST", "/api/auth/logout", None),
        ("GET", "/api/packages", None),
        (
            "POST",
            "/api/create-checkout",
            Some(json!({ "price_id": "price_x" })),
        ),
        (
            "POST",
            "/api/account/update-profile",
            Some(json!({ "full_name": "Ana" })),
        ),
        (
            "POST",
            "/api/admin/assign-teacher",
            Some(json!({ "student_id": "s", "teacher_id": "t" })),
        ),
        (
            "POST",
            "/api/admin/remove-teacher",
            Some(json!({ "student_id": "s", "teacher_id": "t" })),
        ),
        (
            "GET",
            "/api/calendar/available-slots?teacher_id=t&date=2026-09-07&duration=60",
            None,
        ),
        (
            "POST",
            "/api/calendar/sessions",
            Some(json!({
                "teacher_id": "t",
                "scheduled_at": "2026-09-07T09:00:00Z",
                "duration_minutes": 60
            })),
        ),
        (
            "POST",
            "/api/calendar/sessions/bulk",
            Some(json!({
                "student_id": "s",
                "teacher_id": "t",
                "start_at": "2026-09-07T09:00:00Z",
                "duration_minutes": 60,
                "count": 4
            })),
        ),
        ("POST", "/api/calendar/sessions/some-id/cancel", None),
        (
            "POST",
            "/api/calendar/sessions/some-id/complete",
            Some(json!({})),
        ),
        (
            "GET",
            "/api/calendar/sessions?from=2026-09-01&to=2026-09-30",
            None,
        ),
        ("GET", "/api/calendar/month?year=2026&month=9", None),
        ("GET", "/api/cron/send-reminders", None),
    ];

    for (method, uri, body) in cases {
        let (status, value) = app.request(method, uri, None, body).await;
        assert_eq!(
            status,
            StatusCode::UNAUTHORIZED,
            "{method} {uri} should 401 unauthenticated"
        );
        assert_eq!(error_code(&value), "UNAUTHORIZED", "{method} {uri}");
    }
}

#[tokio::test]
async fn login_issues_a_working_token() {
    let app = spawn_app().await;
    let (_, _) = app
        .create_account(Role::Student, "Ana García", "ana@example.com")
        .await;

    let (status, body) = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "ana@example.com", "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "student");
    let token = body["token"].as_str().expect("token in login response");

    let (status, _) = app.request("GET", "/api/packages", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn login_rejects_a_wrong_password() {
    let app = spawn_app().await;
    app.create_account(Role::Student, "Ana García", "ana@example.com")
        .await;

    let (status, body) = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "ana@example.com", "password": "not-it" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "UNAUTHORIZED");
}

#[tokio::test]
async fn expired_tokens_stop_working() {
    let app = spawn_app().await;
    let (profile, _) = app
        .create_account(Role::Student, "Ana García", "ana@example.com")
        .await;

    let stale = uuid::Uuid::new_v4().to_string();
    app.storage
        .insert_token(&stale, &profile.id, Utc::now() - Duration::hours(1))
        .await
        .expect("insert stale token");

    let (status, _) = app.request("GET", "/api/packages", Some(&stale), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let app = spawn_app().await;
    let (_, token) = app
        .create_account(Role::Student, "Ana García", "ana@example.com")
        .await;

    let (status, _) = app
        .request("POST", "/api/auth/logout", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.request("GET", "/api/packages", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_json_bodies_are_rejected_as_bad_requests() {
    let app = spawn_app().await;
    let (_, token) = app
        .create_account(Role::Student, "Ana García", "ana@example.com")
        .await;

    // missing required field
    let (status, _) = app
        .request(
            "POST",
            "/api/account/update-profile",
            Some(&token),
            Some(json!({})),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
