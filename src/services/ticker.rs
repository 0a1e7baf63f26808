//! The single 1 Hz interval task advancing the shared clock.
//!
//! Exactly one ticker exists at a time: the guard owning the spawned task
//! lives in [`AppState::ticker`](crate::state::AppState::ticker), and
//! replacing or dropping it aborts the task. Everything a tick causes beyond
//! the state change itself (audio cues, SSE broadcasts, persistence, the
//! alert flash timeout) happens here so manual navigation and the interval
//! path share one code path.

use std::time::Duration;

use tokio::{
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{
    audio::PlaybackOutcome,
    dto::clock::VisibleClockPhase,
    services::{recovery_service, sse_events},
    state::{SharedState, alerts::AlertCue, clock::TickOutcome},
};

/// How long the UI alert flash stays raised after a level rollover.
const ALERT_FLASH_DURATION: Duration = Duration::from_secs(3);

/// Owner handle for the spawned interval task; dropping it aborts the task.
pub struct TickerGuard {
    handle: JoinHandle<()>,
}

impl Drop for TickerGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawn the interval task driving the shared clock at one tick per second.
pub fn spawn(state: SharedState) -> TickerGuard {
    let handle = tokio::spawn(async move {
        let mut interval = time::interval(Duration::from_secs(1));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // An interval's first tick completes immediately; consume it so the
        // clock advances only after a full second has passed.
        interval.tick().await;
        loop {
            interval.tick().await;
            run_tick(&state).await;
        }
    });
    TickerGuard { handle }
}

/// Advance the shared clock by one second, with every tick side effect.
///
/// A tick against a paused clock or a degenerate schedule is a silent no-op,
/// which also neutralizes any straggler interval firing that races a pause.
pub async fn run_tick(state: &SharedState) {
    let (outcome, flash_raised) = {
        let schedule = state.schedule().read().await;
        let mut clock = state.clock().write().await;
        let mut alerts = state.alerts().lock().await;

        let pending = clock.peek_tick(&schedule);
        let completed = matches!(pending, TickOutcome::LevelCompleted { .. });
        // The completion chime fires before the index change commits so the
        // audible boundary still belongs to the finishing level.
        if alerts.observe_completion(completed) {
            play_cue(state, clock.state().sound_enabled, AlertCue::LevelComplete);
        }

        let outcome = clock.tick(&schedule);
        if outcome == TickOutcome::Idle {
            return;
        }

        let mut flash_raised = matches!(outcome, TickOutcome::LevelCompleted { .. });
        for cue in alerts.observe_remaining(clock.time_remaining(&schedule)) {
            play_cue(state, clock.state().sound_enabled, cue);
            sse_events::broadcast_alert(state, cue);
            if cue == AlertCue::OneMinuteWarning {
                flash_raised = true;
            }
        }
        if flash_raised {
            clock.raise_alert();
            sse_events::broadcast_alert_flash(state, true);
        }

        sse_events::broadcast_tick(state, &clock, &schedule);
        match outcome {
            TickOutcome::LevelCompleted { .. } => {
                sse_events::broadcast_alert(state, AlertCue::LevelComplete);
                sse_events::broadcast_level_changed(
                    state,
                    clock.state().current_level_index,
                    &schedule,
                );
            }
            TickOutcome::ScheduleFinished => {
                sse_events::broadcast_phase_changed(
                    state,
                    VisibleClockPhase::derive(clock.state(), &schedule),
                );
            }
            _ => {}
        }
        (outcome, flash_raised)
    };

    recovery_service::persist_in_background(state.clone());
    if flash_raised {
        schedule_alert_flash_clear(state.clone());
    }

    match outcome {
        TickOutcome::LevelCompleted { finished_index } => {
            info!(finished_index, "level completed");
        }
        TickOutcome::ScheduleFinished => {
            info!("blind structure exhausted; clock stopped");
            // Release the guard last: dropping it aborts this very task. A
            // clock restarted in the meantime owns a fresh guard, which must
            // stay in the slot.
            let mut slot = state.ticker().lock().await;
            if !state.clock().read().await.state().is_running {
                slot.take();
            }
        }
        _ => {}
    }
}

/// Render a cue through the audio engine, honoring the sound toggle.
fn play_cue(state: &SharedState, sound_enabled: bool, cue: AlertCue) {
    if !sound_enabled {
        return;
    }
    match state.sound().play(cue) {
        PlaybackOutcome::Played => {}
        PlaybackOutcome::Denied => debug!(?cue, "audio unavailable; cue skipped"),
        PlaybackOutcome::DeviceError => warn!(?cue, "audio device error while playing cue"),
    }
}

/// Lower the alert flash flag again after a short delay.
fn schedule_alert_flash_clear(state: SharedState) {
    tokio::spawn(async move {
        time::sleep(ALERT_FLASH_DURATION).await;
        let mut clock = state.clock().write().await;
        if clock.state().show_alert {
            clock.clear_alert();
            sse_events::broadcast_alert_flash(&state, false);
        }
    });
}
