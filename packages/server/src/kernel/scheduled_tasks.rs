//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! Expired codes are already rejected lazily on verify; this sweep only keeps
//! the in-memory store from accumulating codes nobody came back for.

use anyhow::Result;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::domains::auth::OtpService;

/// Start the expired-code sweep on the given cron schedule
pub async fn start_scheduler(otp: Arc<OtpService>, sweep_cron: &str) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let sweep_job = Job::new_async(sweep_cron, move |_uuid, _lock| {
        let otp = otp.clone();
        Box::pin(async move {
            run_sweep(&otp).await;
        })
    })?;

    scheduler.add(sweep_job).await?;
    scheduler.start().await?;

    tracing::info!("Scheduled tasks started (expired OTP sweep: {})", sweep_cron);
    Ok(scheduler)
}

/// Run one sweep of expired codes
async fn run_sweep(otp: &OtpService) {
    let removed = otp.sweep_expired().await;
    let remaining = otp.pending_count().await;
    tracing::debug!(removed, remaining, "Expired OTP sweep complete");
}
