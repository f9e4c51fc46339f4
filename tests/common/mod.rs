#![allow(dead_code)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode};
use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc, Weekday};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;

use lingua_campus::db::CampusStorage;
use lingua_campus::db::models::{
    AvailabilityBlock, Package, Profile, Role, Subscription, SubscriptionStatus,
};
use lingua_campus::middleware::auth::hash_password;
use lingua_campus::router::{CampusOptions, CampusState, campus_router};
use lingua_campus::service::billing::CheckoutConfig;
use lingua_campus::service::botcheck::BotcheckConfig;
use lingua_campus::service::reminders::ReminderDispatcher;

pub const CRON_SECRET: &str = "test-cron-secret";
pub const TEST_PASSWORD: &str = "passw0rd";

pub struct TestApp {
    pub router: Router,
    pub storage: CampusStorage,
}

pub fn default_options() -> CampusOptions {
    CampusOptions {
        checkout: CheckoutConfig {
            secret_key: "sk_test_local".to_string(),
            // unroutable on purpose: no test may reach the provider
            endpoint: "http://127.0.0.1:1/v1/checkout/sessions".parse().expect("static URL"),
            success_url: "http://localhost:8000/checkout/success".parse().expect("static URL"),
            cancel_url: "http://localhost:8000/checkout/cancelled".parse().expect("static URL"),
        },
        botcheck: None,
        cron_secret: CRON_SECRET.to_string(),
        reminder_window_hours: 24,
        lead_rate_per_minute: 5,
    }
}

pub fn botcheck_options() -> CampusOptions {
    let mut opts = default_options();
    opts.botcheck = Some(BotcheckConfig {
        verify_endpoint: "http://127.0.0.1:1/siteverify".parse().expect("static URL"),
        secret: "bot-secret".to_string(),
    });
    opts
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(default_options()).await
}

pub async fn spawn_app_with(opts: CampusOptions) -> TestApp {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();
    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "lingua-campus-test-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));
    let database_url = format!("sqlite:{}", temp_path.display());

    let storage = CampusStorage::connect(&database_url)
        .await
        .expect("open test database");
    let reminders = ReminderDispatcher::spawn(2);
    let state = CampusState::new(storage.clone(), reminders, opts);
    TestApp {
        router: campus_router(state),
        storage,
    }
}

impl TestApp {
    /// Create a profile and an already-valid session token for it.
    pub async fn create_account(&self, role: Role, name: &str, email: &str) -> (Profile, String) {
        let profile = self
            .storage
            .create_profile(role, name, email, &hash_password(TEST_PASSWORD))
            .await
            .expect("create profile");
        let token = uuid::Uuid::new_v4().to_string();
        self.storage
            .insert_token(&token, &profile.id, Utc::now() + Duration::days(1))
            .await
            .expect("insert token");
        (profile, token)
    }

    pub async fn seed_package(&self) -> Package {
        let tag = uuid::Uuid::new_v4().simple().to_string();
        let package = Package {
            id: uuid::Uuid::new_v4().to_string(),
            name: "Estándar".to_string(),
            sessions_per_month: 8,
            monthly_price_cents: 16_000,
            price_id_1m: format!("price_1m_{tag}"),
            price_id_3m: format!("price_3m_{tag}"),
            price_id_6m: format!("price_6m_{tag}"),
            active: true,
        };
        self.storage
            .insert_package(&package)
            .await
            .expect("insert package");
        package
    }

    pub async fn seed_subscription(
        &self,
        student_id: &str,
        package_id: &str,
        sessions_total: i64,
    ) -> Subscription {
        let today = Utc::now().date_naive();
        let sub = Subscription {
            id: uuid::Uuid::new_v4().to_string(),
            student_id: student_id.to_string(),
            package_id: package_id.to_string(),
            status: SubscriptionStatus::Active,
            duration_months: 6,
            starts_at: today - Duration::days(7),
            ends_at: today + Duration::days(180),
            sessions_total,
            sessions_used: 0,
        };
        self.storage
            .insert_subscription(&sub)
            .await
            .expect("insert subscription");
        sub
    }

    pub async fn set_weekday_availability(
        &self,
        teacher_id: &str,
        weekday: u8,
        start_minute: u16,
        end_minute: u16,
    ) {
        self.storage
            .set_availability(&AvailabilityBlock {
                teacher_id: teacher_id.to_string(),
                weekday,
                start_minute,
                end_minute,
            })
            .await
            .expect("set availability");
    }

    /// JSON request helper: status plus parsed body (Null for empty bodies).
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(v) => builder
                .header("content-type", "application/json")
                .body(Body::from(v.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("failed to build request");

        let resp = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    /// Raw request for tests that inspect headers (redirects, cookies).
    pub async fn raw(
        &self,
        method: &str,
        uri: &str,
        headers: &[(&str, String)],
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, value.as_str());
        }
        let request = builder.body(Body::empty()).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed")
    }
}

pub fn error_code(body: &Value) -> &str {
    body.get("error")
        .and_then(|e| e.get("code"))
        .and_then(|c| c.as_str())
        .unwrap_or("")
}

/// A Monday at `hour`:00 UTC, at least a week out so nothing lands in the
/// past while a test runs.
pub fn next_monday_at(hour: u32) -> DateTime<Utc> {
    let mut day = Utc::now().date_naive() + Duration::days(7);
    while day.weekday() != Weekday::Mon {
        day += Duration::days(1);
    }
    day.and_time(NaiveTime::from_hms_opt(hour, 0, 0).expect("valid time"))
        .and_utc()
}
