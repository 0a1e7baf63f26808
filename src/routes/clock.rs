use axum::{
    Json, Router,
    extract::State,
    middleware,
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::clock::{ActionResponse, ClockSnapshot, SeekRequest, SoundRequest},
    error::AppError,
    routes::require_control_token,
    services::clock_service,
    state::SharedState,
};

/// Read and control endpoints for the tournament clock.
///
/// Every mutating route requires the control token issued by the
/// `/sse/controller` stream.
pub fn router(state: SharedState) -> Router<SharedState> {
    let controlled = Router::new()
        .route("/clock/start", post(start_clock))
        .route("/clock/pause", post(pause_clock))
        .route("/clock/next", post(next_level))
        .route("/clock/previous", post(previous_level))
        .route("/clock/seek", post(seek_clock))
        .route("/clock/sound", post(set_sound))
        .route("/clock/sound/reload", post(reload_sound))
        .route_layer(middleware::from_fn_with_state(state, require_control_token));

    Router::new()
        .route("/clock", get(get_clock))
        .merge(controlled)
}

/// Full snapshot of the clock for a late-joining window.
#[utoipa::path(
    get,
    path = "/clock",
    tag = "clock",
    responses((status = 200, description = "Current clock snapshot", body = ClockSnapshot))
)]
pub async fn get_clock(State(state): State<SharedState>) -> Json<ClockSnapshot> {
    Json(clock_service::snapshot(&state).await)
}

/// Start (or restart) the clock.
#[utoipa::path(
    post,
    path = "/clock/start",
    tag = "clock",
    params(("X-Control-Token" = String, Header, description = "Token issued by the /sse/controller stream")),
    responses((status = 200, description = "Clock started", body = ActionResponse))
)]
pub async fn start_clock(
    State(state): State<SharedState>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(clock_service::start(&state).await?))
}

/// Pause the clock.
#[utoipa::path(
    post,
    path = "/clock/pause",
    tag = "clock",
    params(("X-Control-Token" = String, Header, description = "Token issued by the /sse/controller stream")),
    responses((status = 200, description = "Clock paused", body = ActionResponse))
)]
pub async fn pause_clock(
    State(state): State<SharedState>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(clock_service::pause(&state).await?))
}

/// Jump to the next blind level.
#[utoipa::path(
    post,
    path = "/clock/next",
    tag = "clock",
    params(("X-Control-Token" = String, Header, description = "Token issued by the /sse/controller stream")),
    responses((status = 200, description = "Navigation applied", body = ActionResponse))
)]
pub async fn next_level(State(state): State<SharedState>) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(clock_service::next_level(&state).await?))
}

/// Jump back to the previous blind level.
#[utoipa::path(
    post,
    path = "/clock/previous",
    tag = "clock",
    params(("X-Control-Token" = String, Header, description = "Token issued by the /sse/controller stream")),
    responses((status = 200, description = "Navigation applied", body = ActionResponse))
)]
pub async fn previous_level(
    State(state): State<SharedState>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(clock_service::previous_level(&state).await?))
}

/// Seek to a completion percentage within the current level.
#[utoipa::path(
    post,
    path = "/clock/seek",
    tag = "clock",
    params(("X-Control-Token" = String, Header, description = "Token issued by the /sse/controller stream")),
    request_body = SeekRequest,
    responses((status = 200, description = "Seek applied", body = ActionResponse))
)]
pub async fn seek_clock(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<SeekRequest>>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(clock_service::seek(&state, payload).await?))
}

/// Toggle whether audio cues are produced.
#[utoipa::path(
    post,
    path = "/clock/sound",
    tag = "clock",
    params(("X-Control-Token" = String, Header, description = "Token issued by the /sse/controller stream")),
    request_body = SoundRequest,
    responses((status = 200, description = "Sound preference applied", body = ActionResponse))
)]
pub async fn set_sound(
    State(state): State<SharedState>,
    Json(payload): Json<SoundRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(clock_service::set_sound(&state, payload).await?))
}

/// Tear down and re-acquire the audio output device.
#[utoipa::path(
    post,
    path = "/clock/sound/reload",
    tag = "clock",
    params(("X-Control-Token" = String, Header, description = "Token issued by the /sse/controller stream")),
    responses((status = 200, description = "Audio reload attempted", body = ActionResponse))
)]
pub async fn reload_sound(State(state): State<SharedState>) -> Json<ActionResponse> {
    Json(clock_service::reload_sound(&state))
}
