use crate::state::AppState;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

/// Register the periodic jobs: the per-minute transaction expiry sweep and
/// the nightly gadget/OTP/refresh-token cleanup. Both run outside the
/// request path on bounded batches.
pub async fn start_scheduler(state: AppState) -> Result<(), Box<dyn std::error::Error>> {
    let scheduler = JobScheduler::new().await?;

    let expiry_state = state.clone();
    let expiry_job = Job::new_async("0 * * * * *", move |_uuid, _l| {
        let state = expiry_state.clone();

        Box::pin(async move {
            match state.transaction_service.expire_overdue().await {
                Ok(expired) if !expired.is_empty() => {
                    info!("expired {} overdue transaction(s)", expired.len());
                }
                Ok(_) => {}
                Err(e) => error!("expiry sweep failed: {:?}", e),
            }
        })
    })?;
    scheduler.add(expiry_job).await?;

    let cleanup_state = state.clone();
    let cleanup_job = Job::new_async("0 0 3 * * *", move |_uuid, _l| {
        let state = cleanup_state.clone();

        Box::pin(async move {
            match state
                .gadget_service
                .cleanup(state.config.gadget_retention_days)
                .await
            {
                Ok((gadgets, codes)) => {
                    info!("cleanup removed {} stale gadget(s), {} expired code(s)", gadgets, codes);
                }
                Err(e) => error!("cleanup failed: {:?}", e),
            }

            match state.refresh_token_repository.delete_expired().await {
                Ok(tokens) if tokens > 0 => {
                    info!("cleanup removed {} expired refresh token(s)", tokens);
                }
                Ok(_) => {}
                Err(e) => error!("refresh token cleanup failed: {:?}", e),
            }
        })
    })?;
    scheduler.add(cleanup_job).await?;

    scheduler.start().await?;

    info!("Scheduler started");
    Ok(())
}
