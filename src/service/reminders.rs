//! Reminder dispatch pipeline.
//!
//! The cron endpoint only selects and stamps due sessions; actual delivery
//! happens here, behind a channel, so a slow mail hop never holds a request
//! open. Sends run with bounded concurrency under a per-minute quota.

use crate::db::models::DueReminder;
use futures::stream::StreamExt;
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

/// Mail-provider friendly ceiling on outbound reminder traffic.
const SENDS_PER_MINUTE: u32 = 60;

#[derive(Clone)]
pub struct ReminderDispatcher {
    job_tx: mpsc::Sender<DueReminder>,
}

impl ReminderDispatcher {
    /// Spawn the background send worker and return a cloneable handle.
    pub fn spawn(concurrency: usize) -> Self {
        let (job_tx, job_rx) = mpsc::channel::<DueReminder>(1024);
        let limiter = Arc::new(RateLimiter::direct(Quota::per_minute(
            NonZeroU32::new(SENDS_PER_MINUTE).unwrap_or(NonZeroU32::MIN),
        )));
        let concurrency = concurrency.max(1);

        tokio::spawn(async move {
            info!(
                concurrency,
                rate_per_minute = SENDS_PER_MINUTE,
                "reminder pipeline started"
            );
            let mut pipeline = ReceiverStream::new(job_rx)
                .map(|job| {
                    let lim = limiter.clone();
                    async move {
                        lim.until_ready().await;
                        deliver(job).await;
                    }
                })
                .buffer_unordered(concurrency);

            while pipeline.next().await.is_some() {}
            info!("reminder pipeline stopped");
        });

        Self { job_tx }
    }

    /// Queue one reminder; never blocks the calling handler.
    pub async fn enqueue(&self, job: DueReminder) {
        let tx = self.job_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tx.send(job).await {
                warn!("failed to enqueue reminder (channel closed): {}", e);
            }
        });
    }
}

/// Delivery sink. A real mail provider slots in here; the endpoint contract
/// does not change.
async fn deliver(job: DueReminder) {
    info!(
        session_id = %job.session_id,
        student = %job.student_email,
        teacher = %job.teacher_name,
        scheduled_at = %job.scheduled_at.to_rfc3339(),
        meet_link = %job.meet_link.as_deref().unwrap_or("<none>"),
        "session reminder dispatched"
    );
}
