use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::{
    dto::sse::{ControllerHandshake, Handshake, ServerEvent},
    error::ServiceError,
    services::display_service,
    state::{SharedState, SseHub},
};

/// Subscribe to the shared clock SSE stream every window listens on.
pub fn subscribe_clock(state: &SharedState) -> broadcast::Receiver<ServerEvent> {
    state.clock_sse().subscribe()
}

/// Subscribe to the controller-only SSE stream, claiming the control token.
pub async fn subscribe_controller(
    state: &SharedState,
) -> Result<(broadcast::Receiver<ServerEvent>, String), ServiceError> {
    let token = claim_controller_token(state).await?;
    let receiver = state.controller_sse().subscribe();
    Ok((receiver, token))
}

/// Subscribe a spectator display, claiming the single display slot.
///
/// The returned id names the stream; the forwarder teardown uses it to
/// release the slot, which flips the operator back to master.
pub async fn subscribe_display(
    state: &SharedState,
) -> Result<(broadcast::Receiver<ServerEvent>, Uuid), ServiceError> {
    let stream_id = Uuid::new_v4();
    display_service::attach(state, stream_id).await?;
    let receiver = state.clock_sse().subscribe();
    Ok((receiver, stream_id))
}

/// Identifies the target SSE stream so we can perform stream-specific
/// bookkeeping when the connection is torn down.
#[derive(Clone)]
pub enum StreamKind {
    Clock,
    /// Carries a clone of the shared application state so teardown logic can
    /// reset the control token after the spawned task completes. Cloning
    /// `SharedState` is cheap because it is just bumping the inner `Arc`.
    Controller(SharedState),
    /// Carries the state plus the stream id holding the display slot.
    Display(SharedState, Uuid),
}

/// Convert a broadcast receiver into an SSE response, forwarding events and
/// cleaning up once the client disconnects.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<ServerEvent>,
    kind: StreamKind,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    // forwarder task: reads from broadcast and pushes into mpsc
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            let mut event = Event::default().data(payload.data);
                            if let Some(name) = payload.event {
                                event = event.event(name);
                            }

                            if tx.send(Ok(event)).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(_)) => {
                            // Skip lagged messages but keep the stream alive.
                            continue;
                        }
                    }
                }
            }
        }

        match kind {
            StreamKind::Clock => tracing::info!("clock SSE stream disconnected"),
            StreamKind::Controller(state) => {
                // Own the necessary state inside the spawned task so we can
                // clean up even if the request context has already dropped.
                reset_controller_token(state).await;
                tracing::info!("controller SSE stream disconnected")
            }
            StreamKind::Display(state, stream_id) => {
                display_service::detach(&state, stream_id).await;
                tracing::info!(%stream_id, "display SSE stream disconnected")
            }
        }
    });

    // response stream reads from mpsc; when client disconnects axum drops this stream
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Reserve the control token for a new stream, generating one when none exists
/// and failing if another connection already holds it.
async fn claim_controller_token(state: &SharedState) -> Result<String, ServiceError> {
    let mut guard = state.controller_token().lock().await;
    match &mut *guard {
        slot @ None => {
            let token = Uuid::new_v4().simple().to_string();
            slot.replace(token.clone());
            Ok(token)
        }
        Some(_) => Err(ServiceError::Unauthorized(
            "another controller SSE stream is already active".into(),
        )),
    }
}

/// Broadcast the control token to the controller stream.
pub fn broadcast_controller_handshake(hub: &SseHub, token: &str) {
    if let Ok(event) = ServerEvent::json(
        Some("controller_token".to_string()),
        &ControllerHandshake {
            token: token.to_string(),
        },
    ) {
        hub.broadcast(event);
    }
}

/// Broadcast a connection handshake on the clock stream.
pub fn broadcast_handshake(hub: &SseHub, stream: &str, degraded: bool) {
    if let Ok(event) = ServerEvent::json(
        Some("handshake".to_string()),
        &Handshake {
            stream: stream.to_string(),
            message: format!("{stream} stream connected"),
            degraded,
        },
    ) {
        hub.broadcast(event);
    }
}

/// Clear any stored control token so the next controller connection
/// negotiates a fresh credential.
async fn reset_controller_token(state: SharedState) {
    let mut guard = state.controller_token().lock().await;
    guard.take();
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{audio::NullSoundEngine, config::AppConfig, state::AppState};

    #[tokio::test]
    async fn only_one_controller_token_exists_at_a_time() {
        let state = AppState::new(AppConfig::default(), Arc::new(NullSoundEngine));

        let (_receiver, token) = subscribe_controller(&state).await.unwrap();
        assert!(!token.is_empty());
        assert!(subscribe_controller(&state).await.is_err());

        reset_controller_token(state.clone()).await;
        assert!(subscribe_controller(&state).await.is_ok());
    }

    #[tokio::test]
    async fn display_subscription_claims_and_releases_the_slot() {
        let state = AppState::new(AppConfig::default(), Arc::new(NullSoundEngine));

        let (_receiver, stream_id) = subscribe_display(&state).await.unwrap();
        assert!(subscribe_display(&state).await.is_err());

        display_service::detach(&state, stream_id).await;
        assert!(subscribe_display(&state).await.is_ok());
    }
}
