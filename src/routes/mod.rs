use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, state::SharedState};

pub mod clock;
pub mod display;
pub mod docs;
pub mod health;
pub mod recovery;
pub mod schedule;
pub mod sse;

const CONTROL_TOKEN_HEADER: &str = "x-control-token";

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(clock::router(state.clone()))
        .merge(schedule::router(state.clone()))
        .merge(recovery::router(state.clone()))
        .merge(display::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}

/// Gate mutating endpoints on the control token issued to the single active
/// controller stream. One logical writer drives the clock at a time; mirrors
/// and spectator displays never hold a token.
pub(crate) async fn require_control_token(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get(CONTROL_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_owned())
        .ok_or_else(|| {
            AppError::Unauthorized("missing control token header `X-Control-Token`".into())
        })?;

    let expected = {
        let guard = state.controller_token().lock().await;
        guard.clone()
    };

    match expected {
        Some(token) if token == provided => Ok(next.run(req).await),
        Some(_) => Err(AppError::Unauthorized("invalid control token".into())),
        None => Err(AppError::Unauthorized(
            "controller SSE stream not initialised yet".into(),
        )),
    }
}
