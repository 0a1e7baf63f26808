use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{
    error::AppError,
    services::sse_service::{self, StreamKind},
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/sse/clock",
    tag = "sse",
    responses((status = 200, description = "Clock SSE stream", content_type = "text/event-stream", body = String))
)]
/// Stream realtime clock events to any connected window.
pub async fn clock_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let receiver = sse_service::subscribe_clock(&state);
    info!("new clock SSE connection");
    sse_service::broadcast_handshake(state.clock_sse(), "clock", state.is_degraded().await);
    sse_service::to_sse_stream(receiver, StreamKind::Clock)
}

#[utoipa::path(
    get,
    path = "/sse/controller",
    tag = "sse",
    responses(
        (status = 200, description = "Controller SSE stream", content_type = "text/event-stream", body = String),
        (status = 401, description = "Another controller stream is already active")
    )
)]
/// Stream controller-only events, establishing the control token.
pub async fn controller_stream(
    State(state): State<SharedState>,
) -> Result<Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>>, AppError> {
    let (receiver, token) = sse_service::subscribe_controller(&state).await?;
    info!("new controller SSE connection");
    sse_service::broadcast_controller_handshake(state.controller_sse(), &token);
    Ok(sse_service::to_sse_stream(
        receiver,
        StreamKind::Controller(state),
    ))
}

#[utoipa::path(
    get,
    path = "/sse/display",
    tag = "sse",
    responses(
        (status = 200, description = "Display SSE stream", content_type = "text/event-stream", body = String),
        (status = 409, description = "Another display is already attached")
    )
)]
/// Stream clock events to the single spectator display.
///
/// Connecting claims the display slot and demotes the operator window to a
/// mirror; the stream teardown releases the slot again.
pub async fn display_stream(
    State(state): State<SharedState>,
) -> Result<Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>>, AppError> {
    let (receiver, stream_id) = sse_service::subscribe_display(&state).await?;
    info!(%stream_id, "new display SSE connection");
    sse_service::broadcast_handshake(state.clock_sse(), "display", state.is_degraded().await);
    Ok(sse_service::to_sse_stream(
        receiver,
        StreamKind::Display(state, stream_id),
    ))
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/sse/clock", get(clock_stream))
        .route("/sse/controller", get(controller_stream))
        .route("/sse/display", get(display_stream))
}
