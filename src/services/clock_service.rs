//! Control operations on the shared clock: start, pause, navigation, sound.
//!
//! Every mutation broadcasts what changed on the SSE hubs and persists a
//! fresh snapshot in the background, so mirrors and the durable store both
//! track the live state without the routes having to remember either.

use crate::{
    audio::PlaybackOutcome,
    dto::clock::{ActionResponse, ClockSnapshot, SeekRequest, SoundRequest, VisibleClockPhase},
    error::ServiceError,
    services::{recovery_service, sse_events, ticker},
    state::SharedState,
};

/// Build the full snapshot a late-joining window needs to render.
pub async fn snapshot(state: &SharedState) -> ClockSnapshot {
    let schedule = state.schedule().read().await;
    let clock = state.clock().read().await;
    let current = clock.state();

    ClockSnapshot {
        phase: VisibleClockPhase::derive(current, &schedule),
        current_level: schedule.get(current.current_level_index).map(Into::into),
        next_level: schedule.get(current.current_level_index + 1).map(Into::into),
        current_level_index: current.current_level_index,
        elapsed_in_level: current.elapsed_in_level,
        time_remaining: clock.time_remaining(&schedule),
        progress_percent: clock.progress_percent(&schedule),
        total_elapsed: current.total_elapsed,
        show_alert: current.show_alert,
        sound_enabled: current.sound_enabled,
        break_info: schedule.next_break_from(current.current_level_index).into(),
        role: state.role().into(),
        degraded: state.is_degraded().await,
    }
}

/// Start (or restart) the ticker and mark the clock running.
pub async fn start(state: &SharedState) -> Result<ActionResponse, ServiceError> {
    let mut guard = state.ticker().lock().await;
    {
        let schedule = state.schedule().read().await;
        if schedule.is_empty() {
            return Err(ServiceError::InvalidState(
                "no blind structure installed".into(),
            ));
        }

        let mut clock = state.clock().write().await;
        if VisibleClockPhase::derive(clock.state(), &schedule) == VisibleClockPhase::Finished {
            return Err(ServiceError::InvalidState(
                "blind structure already finished".into(),
            ));
        }
        clock.mark_running();
        sse_events::broadcast_phase_changed(
            state,
            VisibleClockPhase::derive(clock.state(), &schedule),
        );
    }

    // Replacing the guard aborts any previous interval task, so repeated
    // start calls never stack tickers.
    *guard = Some(ticker::spawn(state.clone()));
    drop(guard);

    recovery_service::persist_in_background(state.clone());
    Ok(ActionResponse::new("clock started"))
}

/// Pause the clock and release the ticker resource.
pub async fn pause(state: &SharedState) -> Result<ActionResponse, ServiceError> {
    {
        let schedule = state.schedule().read().await;
        let mut clock = state.clock().write().await;
        clock.mark_paused();
        sse_events::broadcast_phase_changed(
            state,
            VisibleClockPhase::derive(clock.state(), &schedule),
        );
    }

    // The running flag flips before the task is aborted: a straggler tick
    // that already fired observes a paused clock and does nothing.
    state.ticker().lock().await.take();

    recovery_service::persist_in_background(state.clone());
    Ok(ActionResponse::new("clock paused"))
}

/// Jump to the next level. Already at the end is an acknowledged no-op.
pub async fn next_level(state: &SharedState) -> Result<ActionResponse, ServiceError> {
    let moved = {
        let schedule = state.schedule().read().await;
        let mut clock = state.clock().write().await;
        let moved = clock.next_level(&schedule);
        if moved {
            after_navigation(state, &clock, &schedule).await;
        }
        moved
    };

    if moved {
        recovery_service::persist_in_background(state.clone());
        Ok(ActionResponse::new("moved to the next level"))
    } else {
        Ok(ActionResponse::new("already at the last level"))
    }
}

/// Jump back to the previous level. At the bottom this is a no-op.
pub async fn previous_level(state: &SharedState) -> Result<ActionResponse, ServiceError> {
    let moved = {
        let schedule = state.schedule().read().await;
        let mut clock = state.clock().write().await;
        let moved = clock.previous_level();
        if moved {
            after_navigation(state, &clock, &schedule).await;
        }
        moved
    };

    if moved {
        recovery_service::persist_in_background(state.clone());
        Ok(ActionResponse::new("moved to the previous level"))
    } else {
        Ok(ActionResponse::new("already at the first level"))
    }
}

/// Seek to a completion percentage within the current level.
pub async fn seek(
    state: &SharedState,
    request: SeekRequest,
) -> Result<ActionResponse, ServiceError> {
    let elapsed = {
        let schedule = state.schedule().read().await;
        let mut clock = state.clock().write().await;
        let elapsed = clock.set_level_progress(&schedule, request.percentage)?;
        sse_events::broadcast_tick(state, &clock, &schedule);
        elapsed
    };

    recovery_service::persist_in_background(state.clone());
    Ok(ActionResponse::new(format!(
        "seeked to {elapsed} seconds into the current level"
    )))
}

/// Toggle whether audio cues are produced.
pub async fn set_sound(
    state: &SharedState,
    request: SoundRequest,
) -> Result<ActionResponse, ServiceError> {
    {
        let mut clock = state.clock().write().await;
        clock.set_sound_enabled(request.enabled);
    }
    sse_events::broadcast_sound_changed(state, request.enabled);

    recovery_service::persist_in_background(state.clone());
    Ok(ActionResponse::new(if request.enabled {
        "sound enabled"
    } else {
        "sound muted"
    }))
}

/// Tear down and re-acquire the audio output device.
///
/// Audio stays best-effort: a dead device is reported in the message, never
/// as an HTTP error.
pub fn reload_sound(state: &SharedState) -> ActionResponse {
    match state.sound().reload() {
        PlaybackOutcome::Played => ActionResponse::new("audio device reacquired"),
        PlaybackOutcome::Denied => ActionResponse::new("audio is unavailable in this build"),
        PlaybackOutcome::DeviceError => ActionResponse::new("audio device could not be reacquired"),
    }
}

/// Shared tail of both navigation operations.
async fn after_navigation(
    state: &SharedState,
    clock: &crate::state::clock::BlindClock,
    schedule: &crate::state::schedule::LevelSchedule,
) {
    // Manual jumps re-arm every alert threshold for the new level and drop
    // any flash left over from the old one.
    state.alerts().lock().await.rearm();
    sse_events::broadcast_alert_flash(state, false);
    sse_events::broadcast_tick(state, clock, schedule);
    sse_events::broadcast_level_changed(state, clock.state().current_level_index, schedule);
}
