use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use lingua_campus::db::CampusStorage;
use lingua_campus::middleware::auth::hash_password;
use lingua_campus::service::reminders::ReminderDispatcher;
use lingua_campus::{CampusOptions, CampusState, campus_router};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &lingua_campus::config::CONFIG;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.database_url,
        listen_addr = %cfg.listen_addr,
        base_url = %cfg.base_url,
        loglevel = %cfg.loglevel
    );

    let storage = CampusStorage::connect(&cfg.database_url).await?;

    match (cfg.admin_email.as_ref(), cfg.admin_password.as_ref()) {
        (Some(email), Some(password)) => {
            match storage.ensure_admin(email, &hash_password(password)).await? {
                Some(profile) => info!(profile_id = %profile.id, "seeded admin account"),
                None => info!(email = %email, "admin account already present"),
            }
        }
        (None, None) => {}
        _ => warn!("CAMPUS_ADMIN_EMAIL and CAMPUS_ADMIN_PASSWORD must be set together; skipping admin seed"),
    }

    let reminders = ReminderDispatcher::spawn(cfg.reminder_concurrency);
    let state = CampusState::new(storage, reminders, CampusOptions::from_config(cfg)?);
    let app = campus_router(state);

    let listener = TcpListener::bind(cfg.listen_addr.as_str()).await?;
    info!("HTTP server listening on {}", cfg.listen_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
