use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{snapshot_store::SnapshotStore, storage::StorageError},
    services::sse_events,
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Keep a snapshot store installed, flipping degraded mode as its health changes.
///
/// The store is opened through `connect` (re-invoked with exponential backoff
/// while it fails) and then health-polled; a failing probe drops the store and
/// re-enters degraded mode until a reconnect succeeds. Every transition is
/// broadcast so connected windows can surface the storage status.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn SnapshotStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        if let Some(store) = state.snapshot_store().await {
            match store.health_check().await {
                Ok(()) => {
                    delay = INITIAL_DELAY;
                    sleep(HEALTH_POLL_INTERVAL).await;
                }
                Err(err) => {
                    warn!(error = %err, "snapshot store health check failed; entering degraded mode");
                    state.clear_snapshot_store().await;
                    sse_events::broadcast_system_status(&state, true);
                    sleep(delay).await;
                    delay = (delay * 2).min(MAX_DELAY);
                }
            }
            continue;
        }

        match connect().await {
            Ok(store) => {
                info!("snapshot store ready; leaving degraded mode");
                state.install_snapshot_store(store).await;
                sse_events::broadcast_system_status(&state, false);
                delay = INITIAL_DELAY;
            }
            Err(err) => {
                warn!(error = %err, "snapshot store connection attempt failed");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}
