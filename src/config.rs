use figment::{Figment, providers::Env};
use serde::Deserialize;
use std::sync::LazyLock;
use url::Url;

/// Runtime configuration, resolved once from the environment.
/// Every variable is read with the `CAMPUS_` prefix, e.g. `CAMPUS_DATABASE_URL`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Public base URL of the deployment; checkout return links derive from it.
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    #[serde(default = "default_loglevel")]
    pub loglevel: String,

    /// Bearer secret expected by the reminder endpoint.
    #[serde(default = "default_cron_secret")]
    pub cron_secret: String,

    /// Secret key for the hosted payment provider.
    #[serde(default = "default_checkout_secret")]
    pub checkout_secret_key: String,

    /// Provider endpoint that creates a hosted checkout session.
    #[serde(default = "default_checkout_endpoint")]
    pub checkout_endpoint: Url,

    /// Bot-challenge secret; verification is skipped entirely when unset
    /// (local development and tests).
    #[serde(default)]
    pub botcheck_secret: Option<String>,

    #[serde(default = "default_botcheck_verify_url")]
    pub botcheck_verify_url: Url,

    /// How far ahead the reminder endpoint looks for upcoming sessions.
    #[serde(default = "default_reminder_window_hours")]
    pub reminder_window_hours: i64,

    /// Concurrent reminder sends in the dispatch pipeline.
    #[serde(default = "default_reminder_concurrency")]
    pub reminder_concurrency: usize,

    /// Lead submissions accepted per client per minute.
    #[serde(default = "default_lead_rate_per_minute")]
    pub lead_rate_per_minute: u32,

    /// When both are set, an admin profile is seeded on startup.
    #[serde(default)]
    pub admin_email: Option<String>,
    #[serde(default)]
    pub admin_password: Option<String>,
}

fn default_database_url() -> String {
    "sqlite:campus.sqlite".to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_base_url() -> Url {
    Url::parse("http://localhost:8000").expect("static URL")
}

fn default_loglevel() -> String {
    "info".to_string()
}

fn default_cron_secret() -> String {
    "dev-cron-secret".to_string()
}

fn default_checkout_secret() -> String {
    "sk_test_placeholder".to_string()
}

fn default_checkout_endpoint() -> Url {
    Url::parse("https://api.stripe.com/v1/checkout/sessions").expect("static URL")
}

fn default_botcheck_verify_url() -> Url {
    Url::parse("https://challenges.cloudflare.com/turnstile/v0/siteverify").expect("static URL")
}

fn default_reminder_window_hours() -> i64 {
    24
}

fn default_reminder_concurrency() -> usize {
    4
}

fn default_lead_rate_per_minute() -> u32 {
    5
}

impl Config {
    pub fn from_env() -> Result<Self, figment::Error> {
        Figment::new().merge(Env::prefixed("CAMPUS_")).extract()
    }
}

pub static CONFIG: LazyLock<Config> =
    LazyLock::new(|| Config::from_env().expect("invalid CAMPUS_* configuration"));

