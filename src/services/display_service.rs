//! Spectator display window management: URL resolution and attach/detach.
//!
//! At most one display stream is attached at a time. Its liveness is the SSE
//! connection itself: the slot is claimed when the stream connects and
//! released by the forwarder teardown, and the operator's role mirrors that.

use tracing::warn;
use uuid::Uuid;

use crate::{
    dto::display::{DisplayUrlResponse, OpenDisplayRequest},
    error::ServiceError,
    services::sse_events,
    state::{SharedState, role::RoleEvent},
};

/// Resolve the URL the operator should open for the spectator display.
pub async fn open_display(
    state: &SharedState,
    request: OpenDisplayRequest,
) -> Result<DisplayUrlResponse, ServiceError> {
    let game_id = resolve_game_id(state, &request).await?;
    Ok(DisplayUrlResponse {
        url: format!("{}?game={}", state.config().display_base(), game_id),
        game_id,
    })
}

/// Claim the display slot for a newly connected display stream.
pub async fn attach(state: &SharedState, stream_id: Uuid) -> Result<(), ServiceError> {
    {
        let mut slot = state.display_slot().occupant().lock().await;
        if slot.is_some() {
            return Err(ServiceError::InvalidState(
                "another display is already attached".into(),
            ));
        }
        *slot = Some(stream_id);
    }

    let role = state.role().apply(RoleEvent::DisplayAttached)?;
    state.set_role(role);
    sse_events::broadcast_role_changed(state, role);
    Ok(())
}

/// Release the display slot when its stream tears down.
///
/// A teardown for a stream that no longer holds the slot is ignored, so a
/// stale disconnect can never kick out a newer display.
pub async fn detach(state: &SharedState, stream_id: Uuid) {
    {
        let mut slot = state.display_slot().occupant().lock().await;
        if *slot != Some(stream_id) {
            return;
        }
        slot.take();
    }

    match state.role().apply(RoleEvent::DisplayDetached) {
        Ok(role) => {
            state.set_role(role);
            sse_events::broadcast_role_changed(state, role);
        }
        Err(err) => warn!(error = %err, "display detached without a matching attach"),
    }
}

/// Pick the game to display, in priority order: the explicit id, an id parsed
/// out of the given route path, the game of the installed schedule, then the
/// most recently played game on record.
async fn resolve_game_id(
    state: &SharedState,
    request: &OpenDisplayRequest,
) -> Result<Uuid, ServiceError> {
    if let Some(id) = request.game_id {
        return Ok(id);
    }
    if let Some(id) = request.path.as_deref().and_then(game_id_from_path) {
        return Ok(id);
    }
    if let Some(id) = (*state.context().read().await).and_then(|context| context.game_id) {
        return Ok(id);
    }
    if let Some(store) = state.snapshot_store().await {
        match store.last_game().await {
            Ok(Some(id)) => return Ok(id),
            Ok(None) => {}
            Err(err) => warn!(error = %err, "failed reading the last played game"),
        }
    }
    Err(ServiceError::NotFound(
        "no game id could be resolved for the display".into(),
    ))
}

/// First path segment that parses as a UUID, if any.
fn game_id_from_path(path: &str) -> Option<Uuid> {
    path.split('/')
        .find_map(|segment| Uuid::parse_str(segment).ok())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        audio::NullSoundEngine,
        config::AppConfig,
        state::{AppState, GameContext, role::ClockRole},
    };

    fn test_state() -> SharedState {
        AppState::new(AppConfig::default(), Arc::new(NullSoundEngine))
    }

    #[test]
    fn path_parsing_finds_the_first_uuid_segment() {
        let id = Uuid::new_v4();
        let path = format!("/games/{id}/clock");
        assert_eq!(game_id_from_path(&path), Some(id));
        assert_eq!(game_id_from_path("/games/current/clock"), None);
    }

    #[tokio::test]
    async fn explicit_game_id_wins_over_everything() {
        let state = test_state();
        let explicit = Uuid::new_v4();
        *state.context().write().await = Some(GameContext {
            season_id: Uuid::new_v4(),
            game_id: Some(Uuid::new_v4()),
        });

        let response = open_display(
            &state,
            OpenDisplayRequest {
                game_id: Some(explicit),
                path: Some(format!("/games/{}/clock", Uuid::new_v4())),
            },
        )
        .await
        .unwrap();

        assert_eq!(response.game_id, explicit);
        assert_eq!(response.url, format!("/display?game={explicit}"));
    }

    #[tokio::test]
    async fn falls_back_to_the_installed_context() {
        let state = test_state();
        let current = Uuid::new_v4();
        *state.context().write().await = Some(GameContext {
            season_id: Uuid::new_v4(),
            game_id: Some(current),
        });

        let response = open_display(&state, OpenDisplayRequest::default())
            .await
            .unwrap();
        assert_eq!(response.game_id, current);
    }

    #[tokio::test]
    async fn unresolvable_game_is_not_found() {
        let state = test_state();
        assert!(open_display(&state, OpenDisplayRequest::default())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn attach_and_detach_flip_the_operator_role() {
        let state = test_state();
        let stream = Uuid::new_v4();

        attach(&state, stream).await.unwrap();
        assert_eq!(state.role(), ClockRole::Mirror);

        // A second display cannot claim the occupied slot.
        assert!(attach(&state, Uuid::new_v4()).await.is_err());

        // A stale teardown from some other stream is ignored.
        detach(&state, Uuid::new_v4()).await;
        assert_eq!(state.role(), ClockRole::Mirror);

        detach(&state, stream).await;
        assert_eq!(state.role(), ClockRole::Master);
    }
}
