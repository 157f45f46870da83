use tracing::{error, info};

use crate::adapters::http::app_state::AppState;

/// Spawn the periodic expiration sweep. Each tick expires every ACTIVE
/// subscription whose end date has passed; a failed run is logged and the
/// next tick tries again.
pub fn spawn_expiration_sweep(app_state: AppState) {
    let sweep_every = app_state.config.sweep_interval_secs;
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(tokio::time::Duration::from_secs(sweep_every.max(1)));
        loop {
            interval.tick().await;
            match app_state.subscription_use_cases.expire_subscriptions().await {
                Ok(0) => {}
                Ok(expired) => info!(expired, "Expiration sweep transitioned subscriptions"),
                Err(err) => error!(error = ?err, "Expiration sweep failed"),
            }
        }
    });
}
