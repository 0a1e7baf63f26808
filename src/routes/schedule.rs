use axum::{
    Json, Router,
    extract::State,
    middleware,
    routing::{get, put},
};
use axum_valid::Valid;

use crate::{
    dto::schedule::{BreakInfoResponse, InstallScheduleRequest, ScheduleSummary},
    error::AppError,
    routes::require_control_token,
    services::schedule_service,
    state::SharedState,
};

/// Blind structure management endpoints.
pub fn router(state: SharedState) -> Router<SharedState> {
    let controlled = Router::new()
        .route("/schedule", put(install_schedule))
        .route_layer(middleware::from_fn_with_state(state, require_control_token));

    Router::new()
        .route("/schedule", get(get_schedule))
        .route("/schedule/next-break", get(get_next_break))
        .merge(controlled)
}

/// Install the blind structure for a season/game.
#[utoipa::path(
    put,
    path = "/schedule",
    tag = "schedule",
    params(("X-Control-Token" = String, Header, description = "Token issued by the /sse/controller stream")),
    request_body = InstallScheduleRequest,
    responses((status = 200, description = "Schedule installed", body = ScheduleSummary))
)]
pub async fn install_schedule(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<InstallScheduleRequest>>,
) -> Result<Json<ScheduleSummary>, AppError> {
    Ok(Json(schedule_service::install(&state, payload).await?))
}

/// The installed blind structure.
#[utoipa::path(
    get,
    path = "/schedule",
    tag = "schedule",
    responses(
        (status = 200, description = "Installed schedule", body = ScheduleSummary),
        (status = 404, description = "No schedule installed yet")
    )
)]
pub async fn get_schedule(
    State(state): State<SharedState>,
) -> Result<Json<ScheduleSummary>, AppError> {
    Ok(Json(schedule_service::summary(&state).await?))
}

/// Break lookahead from the clock's current position.
#[utoipa::path(
    get,
    path = "/schedule/next-break",
    tag = "schedule",
    responses((status = 200, description = "Next break projection", body = BreakInfoResponse))
)]
pub async fn get_next_break(State(state): State<SharedState>) -> Json<BreakInfoResponse> {
    Json(schedule_service::next_break(&state).await)
}
