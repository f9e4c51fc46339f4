use axum::{
    Router,
    routing::{get, post},
};
use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::db::CampusStorage;
use crate::error::CampusError;
use crate::handlers;
use crate::service::billing::CheckoutConfig;
use crate::service::botcheck::BotcheckConfig;
use crate::service::reminders::ReminderDispatcher;

pub type LeadLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Everything the handlers need, assembled once at startup (or per test).
#[derive(Clone)]
pub struct CampusState {
    pub storage: CampusStorage,
    pub http: reqwest::Client,
    pub reminders: ReminderDispatcher,
    pub checkout: Arc<CheckoutConfig>,
    pub botcheck: Option<Arc<BotcheckConfig>>,
    pub cron_secret: Arc<str>,
    pub reminder_window: chrono::Duration,
    pub lead_limiter: Arc<LeadLimiter>,
}

/// Knobs that differ between production config and tests.
pub struct CampusOptions {
    pub checkout: CheckoutConfig,
    pub botcheck: Option<BotcheckConfig>,
    pub cron_secret: String,
    pub reminder_window_hours: i64,
    pub lead_rate_per_minute: u32,
}

impl CampusOptions {
    pub fn from_config(cfg: &Config) -> Result<Self, CampusError> {
        let botcheck = cfg.botcheck_secret.as_ref().map(|secret| BotcheckConfig {
            verify_endpoint: cfg.botcheck_verify_url.clone(),
            secret: secret.clone(),
        });
        Ok(Self {
            checkout: CheckoutConfig::from_config(cfg)?,
            botcheck,
            cron_secret: cfg.cron_secret.clone(),
            reminder_window_hours: cfg.reminder_window_hours,
            lead_rate_per_minute: cfg.lead_rate_per_minute,
        })
    }
}

impl CampusState {
    pub fn new(storage: CampusStorage, reminders: ReminderDispatcher, opts: CampusOptions) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("lingua-campus/0.3")
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()
            .expect("FATAL: initialize campus HTTP client failed");

        let quota = Quota::per_minute(
            NonZeroU32::new(opts.lead_rate_per_minute).unwrap_or(NonZeroU32::MIN),
        );

        Self {
            storage,
            http,
            reminders,
            checkout: Arc::new(opts.checkout),
            botcheck: opts.botcheck.map(Arc::new),
            cron_secret: Arc::from(opts.cron_secret),
            reminder_window: chrono::Duration::hours(opts.reminder_window_hours),
            lead_limiter: Arc::new(RateLimiter::keyed(quota)),
        }
    }
}

pub fn campus_router(state: CampusState) -> Router {
    Router::new()
        // session handling
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout))
        // catalog and checkout
        .route("/api/packages", get(handlers::packages::list_packages))
        .route("/api/create-checkout", post(handlers::checkout::create_checkout))
        // account
        .route(
            "/api/account/update-profile",
            post(handlers::account::update_profile),
        )
        // admin pairings
        .route(
            "/api/admin/assign-teacher",
            post(handlers::admin::assign_teacher),
        )
        .route(
            "/api/admin/remove-teacher",
            post(handlers::admin::remove_teacher),
        )
        // scheduling and sessions
        .route(
            "/api/calendar/available-slots",
            get(handlers::calendar::available_slots),
        )
        .route(
            "/api/calendar/sessions",
            get(handlers::calendar::list_sessions).post(handlers::calendar::create_session),
        )
        .route("/api/calendar/month", get(handlers::calendar::month_view))
        .route(
            "/api/calendar/sessions/bulk",
            post(handlers::calendar::create_sessions_bulk),
        )
        .route(
            "/api/calendar/sessions/{id}/cancel",
            post(handlers::calendar::cancel_session),
        )
        .route(
            "/api/calendar/sessions/{id}/complete",
            post(handlers::calendar::complete_session),
        )
        // public surface
        .route("/api/leads", post(handlers::leads::submit_lead))
        .route("/api/cron/send-reminders", get(handlers::cron::send_reminders))
        // pages: unprefixed paths are the default locale, prefixed ones are
        // validated in the handler so unknown prefixes fall through to 404
        .route("/login", get(handlers::campus::login_page))
        .route("/{locale}/login", get(handlers::campus::login_page_localized))
        .route("/campus/{area}", get(handlers::campus::campus_page))
        .route(
            "/{locale}/campus/{area}",
            get(handlers::campus::campus_page_localized),
        )
        .with_state(state)
}
