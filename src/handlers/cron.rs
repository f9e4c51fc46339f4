use axum::{Json, extract::State};
use axum_extra::TypedHeader;
use chrono::Utc;
use headers::{Authorization, authorization::Bearer};
use serde_json::{Value, json};
use subtle::ConstantTimeEq;
use tracing::info;

use crate::error::CampusError;
use crate::router::CampusState;

/// GET /api/cron/send-reminders -> sweep for sessions starting inside the
/// reminder window, queue one reminder each, and stamp them so a rerun is a
/// no-op. Guarded by the shared cron bearer secret.
pub async fn send_reminders(
    State(state): State<CampusState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<Json<Value>, CampusError> {
    let Some(TypedHeader(bearer)) = bearer else {
        return Err(CampusError::Unauthorized);
    };
    if !bool::from(
        bearer
            .token()
            .as_bytes()
            .ct_eq(state.cron_secret.as_bytes()),
    ) {
        return Err(CampusError::Unauthorized);
    }

    let now = Utc::now();
    let due = state
        .storage
        .due_reminders(now, now + state.reminder_window)
        .await?;
    let session_ids: Vec<String> = due.iter().map(|d| d.session_id.clone()).collect();

    for job in due {
        state.reminders.enqueue(job).await;
    }
    state.storage.mark_reminders_sent(&session_ids, now).await?;

    info!(queued = session_ids.len(), "reminder sweep complete");
    Ok(Json(json!({ "queued": session_ids.len() })))
}
