use axum::{
    Json, Router,
    extract::State,
    middleware,
    routing::{delete, get, post},
};

use crate::{
    dto::{
        clock::ActionResponse,
        recovery::{RecoveryReport, RestoreResponse},
    },
    error::AppError,
    routes::require_control_token,
    services::recovery_service,
    state::SharedState,
};

/// Snapshot persistence and recovery endpoints.
pub fn router(state: SharedState) -> Router<SharedState> {
    let controlled = Router::new()
        .route("/recovery/recover", post(recover_clock))
        .route("/recovery/backup", post(backup_snapshot))
        .route("/recovery/restore", post(restore_backup))
        .route("/recovery", delete(clear_snapshots))
        .route_layer(middleware::from_fn_with_state(state, require_control_token));

    Router::new()
        .route("/recovery", get(recovery_report))
        .merge(controlled)
}

/// Diagnose whether the stored snapshot could be recovered right now.
#[utoipa::path(
    get,
    path = "/recovery",
    tag = "recovery",
    responses(
        (status = 200, description = "Recovery diagnosis", body = RecoveryReport),
        (status = 503, description = "No durable storage available")
    )
)]
pub async fn recovery_report(
    State(state): State<SharedState>,
) -> Result<Json<RecoveryReport>, AppError> {
    Ok(Json(recovery_service::report(&state).await?))
}

/// Apply the primary snapshot to the live clock when it passes every gate.
#[utoipa::path(
    post,
    path = "/recovery/recover",
    tag = "recovery",
    params(("X-Control-Token" = String, Header, description = "Token issued by the /sse/controller stream")),
    responses((status = 200, description = "Recovery attempt outcome", body = RestoreResponse))
)]
pub async fn recover_clock(
    State(state): State<SharedState>,
) -> Result<Json<RestoreResponse>, AppError> {
    Ok(Json(recovery_service::recover(&state).await?))
}

/// Copy the primary snapshot into the backup slot.
#[utoipa::path(
    post,
    path = "/recovery/backup",
    tag = "recovery",
    params(("X-Control-Token" = String, Header, description = "Token issued by the /sse/controller stream")),
    responses(
        (status = 200, description = "Backup written", body = ActionResponse),
        (status = 404, description = "No primary snapshot to back up")
    )
)]
pub async fn backup_snapshot(
    State(state): State<SharedState>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(recovery_service::backup(&state).await?))
}

/// Apply the backup snapshot to the live clock when it passes every gate.
#[utoipa::path(
    post,
    path = "/recovery/restore",
    tag = "recovery",
    params(("X-Control-Token" = String, Header, description = "Token issued by the /sse/controller stream")),
    responses((status = 200, description = "Restore attempt outcome", body = RestoreResponse))
)]
pub async fn restore_backup(
    State(state): State<SharedState>,
) -> Result<Json<RestoreResponse>, AppError> {
    Ok(Json(recovery_service::restore_backup(&state).await?))
}

/// Remove both stored snapshot slots.
#[utoipa::path(
    delete,
    path = "/recovery",
    tag = "recovery",
    params(("X-Control-Token" = String, Header, description = "Token issued by the /sse/controller stream")),
    responses((status = 200, description = "Snapshots cleared", body = ActionResponse))
)]
pub async fn clear_snapshots(
    State(state): State<SharedState>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(recovery_service::clear(&state).await?))
}
