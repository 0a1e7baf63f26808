use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::display::{DisplayUrlResponse, OpenDisplayRequest},
    error::AppError,
    services::display_service,
    state::SharedState,
};

/// Spectator display endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/display/open", post(open_display))
}

/// Resolve the URL for a spectator display window.
#[utoipa::path(
    post,
    path = "/display/open",
    tag = "display",
    request_body = OpenDisplayRequest,
    responses(
        (status = 200, description = "Display URL resolved", body = DisplayUrlResponse),
        (status = 404, description = "No game id could be resolved")
    )
)]
pub async fn open_display(
    State(state): State<SharedState>,
    Json(payload): Json<OpenDisplayRequest>,
) -> Result<Json<DisplayUrlResponse>, AppError> {
    Ok(Json(display_service::open_display(&state, payload).await?))
}
