use std::sync::Arc;

use chrono::Utc;

use crate::state::AppState;

/// Finishes auctions whose end time has passed, until the task is aborted.
pub async fn run_expiry_sweeper(state: Arc<AppState>) {
    tracing::info!(
        interval = ?state.config.sweep_interval(),
        "Starting expiry sweeper..."
    );
    let mut interval = tokio::time::interval(state.config.sweep_interval());
    loop {
        interval.tick().await;
        let finished = state.gateway.finish_expired(Utc::now());
        if !finished.is_empty() {
            tracing::info!(count = finished.len(), "Finished expired auctions");
        }
    }
}
