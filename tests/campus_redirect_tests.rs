mod common;

use axum::http::{StatusCode, header};
use common::spawn_app;
use lingua_campus::db::models::Role;

fn location(resp: &axum::http::Response<axum::body::Body>) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

fn cookie_header(token: &str) -> (&'static str, String) {
    ("cookie", format!("campus_session={token}"))
}

#[tokio::test]
async fn anonymous_visitors_are_sent_to_login() {
    let app = spawn_app().await;

    let resp = app.raw("GET", "/campus/student", &[]).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/es/login");

    let resp = app.raw("GET", "/ru/campus/teacher", &[]).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/ru/login");
}

#[tokio::test]
async fn a_student_is_redirected_home_from_staff_areas() {
    let app = spawn_app().await;
    let (_, token) = app
        .create_account(Role::Student, "Ana García", "ana@example.com")
        .await;
    let headers = [cookie_header(&token)];

    for area in ["teacher", "admin"] {
        let resp = app.raw("GET", &format!("/campus/{area}"), &headers).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "/campus/{area}");
        assert_eq!(location(&resp), "/es/campus/student");
    }

    // the locale of the request is preserved in the redirect
    let resp = app.raw("GET", "/ru/campus/admin", &headers).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/ru/campus/student");
}

#[tokio::test]
async fn a_teacher_is_redirected_home_from_other_areas() {
    let app = spawn_app().await;
    let (_, token) = app
        .create_account(Role::Teacher, "Marta Ruiz", "marta@example.com")
        .await;
    let headers = [cookie_header(&token)];

    let resp = app.raw("GET", "/en/campus/student", &headers).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/en/campus/teacher");
}

#[tokio::test]
async fn matching_role_gets_its_dashboard() {
    let app = spawn_app().await;
    let (_, token) = app
        .create_account(Role::Student, "Ana García", "ana@example.com")
        .await;

    let resp = app
        .raw("GET", "/campus/student", &[cookie_header(&token)])
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let (_, admin_token) = app
        .create_account(Role::Admin, "Dirección", "admin@example.com")
        .await;
    let resp = app
        .raw("GET", "/en/campus/admin", &[cookie_header(&admin_token)])
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn bearer_tokens_also_work_on_pages() {
    let app = spawn_app().await;
    let (_, token) = app
        .create_account(Role::Teacher, "Marta Ruiz", "marta@example.com")
        .await;

    let resp = app
        .raw(
            "GET",
            "/campus/teacher",
            &[("authorization", format!("Bearer {token}"))],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_locales_and_areas_are_404s() {
    let app = spawn_app().await;
    let (_, token) = app
        .create_account(Role::Student, "Ana García", "ana@example.com")
        .await;
    let headers = [cookie_header(&token)];

    let resp = app.raw("GET", "/de/campus/student", &headers).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app.raw("GET", "/campus/principal", &headers).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app.raw("GET", "/de/login", &[]).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn login_page_renders_for_every_locale() {
    let app = spawn_app().await;

    for uri in ["/login", "/es/login", "/en/login", "/ru/login"] {
        let resp = app.raw("GET", uri, &[]).await;
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
    }
}
