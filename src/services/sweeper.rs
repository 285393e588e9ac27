//! Periodic completion of elapsed bookings and purge of stale verification codes

use std::time::Duration;

use tokio::{task::JoinHandle, time::MissedTickBehavior};

use super::{bookings::local_now, Services};

/// Spawn the background sweep. Runs once immediately, then every `interval`.
pub fn spawn(services: Services, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            run_once(&services).await;
        }
    })
}

/// One sweep pass; errors are logged and the next tick retries
pub async fn run_once(services: &Services) {
    if let Err(e) = services.bookings.complete_elapsed(local_now()).await {
        tracing::error!(error = %e, "Booking sweep failed");
    }

    match services.repository.verification_purge_expired().await {
        Ok(0) => {}
        Ok(purged) => tracing::debug!(purged, "Expired verification codes purged"),
        Err(e) => tracing::warn!(error = %e, "Verification code purge failed"),
    }
}
