use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Respond with a static health payload while logging storage issues.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.snapshot_store().await {
        Some(store) => {
            if let Err(err) = store.health_check().await {
                warn!(error = %err, "snapshot store health check failed");
            }
        }
        None => warn!("snapshot store unavailable (degraded mode)"),
    }

    if state.is_degraded().await {
        HealthResponse::degraded()
    } else {
        HealthResponse::ok()
    }
}
