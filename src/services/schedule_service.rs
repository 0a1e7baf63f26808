//! Installing and querying the blind structure for a season/game.

use tracing::{info, warn};

use crate::{
    dto::{
        clock::VisibleClockPhase,
        schedule::{BreakInfoResponse, InstallScheduleRequest, ScheduleSummary},
    },
    error::ServiceError,
    services::{recovery_service, sse_events},
    state::{GameContext, SharedState, schedule::LevelSchedule},
};

/// Install the blind structure for a season/game.
///
/// The schedule is immutable per session: when the incoming structure or
/// season differs from what is installed, the clock is stopped and reset to
/// level 0 before a stored snapshot is considered. Re-installing the identical
/// structure leaves the running clock untouched.
pub async fn install(
    state: &SharedState,
    request: InstallScheduleRequest,
) -> Result<ScheduleSummary, ServiceError> {
    let incoming = LevelSchedule::new(request.levels.into_iter().map(Into::into).collect());
    let context = GameContext {
        season_id: request.season_id,
        game_id: request.game_id,
    };

    let identity_changed = {
        let current_schedule = state.schedule().read().await;
        let current_context = *state.context().read().await;
        current_schedule.hash() != incoming.hash()
            || current_context.map(|ctx| ctx.season_id) != Some(context.season_id)
    };

    if identity_changed {
        // Stop the ticker before the structure underneath it changes.
        state.ticker().lock().await.take();

        let mut schedule = state.schedule().write().await;
        let mut clock = state.clock().write().await;
        *schedule = incoming;
        clock.reset();
        state.alerts().lock().await.rearm();
        *state.context().write().await = Some(context);

        sse_events::broadcast_tick(state, &clock, &schedule);
        sse_events::broadcast_level_changed(state, 0, &schedule);
        sse_events::broadcast_phase_changed(
            state,
            VisibleClockPhase::derive(clock.state(), &schedule),
        );
        info!(
            season_id = %context.season_id,
            levels = schedule.len(),
            "installed new blind structure"
        );
    } else {
        // Same structure, possibly a different game of the same season.
        *state.context().write().await = Some(context);
    }

    record_last_game(state, &context).await;

    if identity_changed {
        // A reload of the same season picks up where it left off; anything
        // ineligible silently starts fresh at level 0.
        match recovery_service::recover(state).await {
            Ok(response) if response.restored => {
                info!("resumed clock from stored snapshot");
            }
            Ok(_) | Err(ServiceError::Degraded) => {}
            Err(err) => warn!(error = %err, "snapshot recovery failed during install"),
        }
        recovery_service::persist_in_background(state.clone());
    }

    let summary = summary(state).await?;
    sse_events::broadcast_schedule_installed(state, &summary);
    Ok(summary)
}

/// Summary of the installed schedule, or not-found before any install.
pub async fn summary(state: &SharedState) -> Result<ScheduleSummary, ServiceError> {
    let context = (*state.context().read().await)
        .ok_or_else(|| ServiceError::NotFound("no blind structure installed".into()))?;
    let schedule = state.schedule().read().await;
    Ok(ScheduleSummary::from_schedule(
        &schedule,
        context.season_id,
        context.game_id,
    ))
}

/// Break lookahead from the clock's current position.
pub async fn next_break(state: &SharedState) -> BreakInfoResponse {
    let schedule = state.schedule().read().await;
    let index = state.clock().read().await.state().current_level_index;
    schedule.next_break_from(index).into()
}

async fn record_last_game(state: &SharedState, context: &GameContext) {
    let Some(game_id) = context.game_id else {
        return;
    };
    let Some(store) = state.snapshot_store().await else {
        return;
    };
    if let Err(err) = store.record_last_game(game_id).await {
        warn!(error = %err, "failed recording the last played game");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use uuid::Uuid;

    use super::*;
    use crate::{
        audio::NullSoundEngine,
        config::AppConfig,
        dto::schedule::BlindLevelInput,
        state::AppState,
    };

    fn input(level: u32, minutes: u32, is_break: bool) -> BlindLevelInput {
        BlindLevelInput {
            level,
            small_blind: 25 * u64::from(level),
            big_blind: 50 * u64::from(level),
            ante: 0,
            duration_minutes: minutes,
            is_break,
        }
    }

    fn request(season_id: Uuid, levels: Vec<BlindLevelInput>) -> InstallScheduleRequest {
        InstallScheduleRequest {
            season_id,
            game_id: None,
            levels,
        }
    }

    #[tokio::test]
    async fn install_sorts_levels_and_records_the_context() {
        let state = AppState::new(AppConfig::default(), Arc::new(NullSoundEngine));
        let season = Uuid::new_v4();

        let summary = install(
            &state,
            request(season, vec![input(3, 20, false), input(1, 20, false), input(2, 10, true)]),
        )
        .await
        .unwrap();

        assert_eq!(summary.season_id, season);
        let numbers: Vec<u32> = summary.levels.iter().map(|level| level.level).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn install_announces_the_new_schedule_to_subscribers() {
        let state = AppState::new(AppConfig::default(), Arc::new(NullSoundEngine));
        let mut events = state.clock_sse().subscribe();

        install(&state, request(Uuid::new_v4(), vec![input(1, 20, false)]))
            .await
            .unwrap();

        let mut installed = None;
        while let Ok(event) = events.try_recv() {
            if event.event.as_deref() == Some("schedule.installed") {
                installed = Some(event);
            }
        }
        let event = installed.unwrap();
        assert!(event.data.contains("\"levels\""));
    }

    #[tokio::test]
    async fn changed_structure_resets_the_clock() {
        let state = AppState::new(AppConfig::default(), Arc::new(NullSoundEngine));
        let season = Uuid::new_v4();
        install(&state, request(season, vec![input(1, 20, false), input(2, 20, false)]))
            .await
            .unwrap();

        {
            let schedule = state.schedule().read().await;
            let mut clock = state.clock().write().await;
            clock.mark_running();
            for _ in 0..100 {
                clock.tick(&schedule);
            }
        }

        install(&state, request(season, vec![input(1, 15, false), input(2, 15, false)]))
            .await
            .unwrap();

        let clock = state.clock().read().await;
        assert_eq!(clock.state().current_level_index, 0);
        assert_eq!(clock.state().elapsed_in_level, 0);
        assert!(!clock.state().is_running);
    }

    #[tokio::test]
    async fn identical_structure_keeps_the_clock_position() {
        let state = AppState::new(AppConfig::default(), Arc::new(NullSoundEngine));
        let season = Uuid::new_v4();
        let levels = || vec![input(1, 20, false), input(2, 20, false)];
        install(&state, request(season, levels())).await.unwrap();

        {
            let schedule = state.schedule().read().await;
            let mut clock = state.clock().write().await;
            clock.mark_running();
            for _ in 0..100 {
                clock.tick(&schedule);
            }
        }

        install(&state, request(season, levels())).await.unwrap();

        let clock = state.clock().read().await;
        assert_eq!(clock.state().total_elapsed, 100);
        assert!(clock.state().is_running);
    }

    #[tokio::test]
    async fn next_break_scans_strictly_ahead_of_the_clock() {
        let state = AppState::new(AppConfig::default(), Arc::new(NullSoundEngine));
        install(
            &state,
            request(
                Uuid::new_v4(),
                vec![input(1, 20, false), input(2, 20, false), input(3, 10, true)],
            ),
        )
        .await
        .unwrap();

        let lookahead = next_break(&state).await;
        assert_eq!(lookahead.levels_until_break, Some(2));
        assert!(lookahead.next_break.is_some_and(|level| level.is_break));
    }

    #[tokio::test]
    async fn summary_before_install_is_not_found() {
        let state = AppState::new(AppConfig::default(), Arc::new(NullSoundEngine));
        assert!(summary(&state).await.is_err());
    }
}
