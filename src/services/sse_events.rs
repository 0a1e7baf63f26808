use serde::Serialize;
use tracing::warn;

use crate::{
    dto::{
        clock::VisibleClockPhase,
        schedule::{BlindLevelDto, BreakInfoResponse, ScheduleSummary},
        sse::{
            AlertEvent, AlertFlashEvent, LevelChangedEvent, PhaseChangedEvent, RoleChangedEvent,
            ServerEvent, SoundChangedEvent, SystemStatus, TickEvent,
        },
    },
    state::{SharedState, alerts::AlertCue, clock::BlindClock, role::ClockRole, schedule::LevelSchedule},
};

const EVENT_TICK: &str = "clock.tick";
const EVENT_PHASE_CHANGED: &str = "phase_changed";
const EVENT_LEVEL_CHANGED: &str = "level.changed";
const EVENT_ALERT: &str = "alert.cue";
const EVENT_ALERT_FLASH: &str = "alert.flash";
const EVENT_ROLE_CHANGED: &str = "role_changed";
const EVENT_SOUND_CHANGED: &str = "sound.changed";
const EVENT_SCHEDULE_INSTALLED: &str = "schedule.installed";
const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Broadcast the per-second position update to every window.
pub fn broadcast_tick(state: &SharedState, clock: &BlindClock, schedule: &LevelSchedule) {
    let snapshot = clock.state();
    let payload = TickEvent {
        current_level_index: snapshot.current_level_index,
        elapsed_in_level: snapshot.elapsed_in_level,
        time_remaining: clock.time_remaining(schedule),
        progress_percent: clock.progress_percent(schedule),
        total_elapsed: snapshot.total_elapsed,
    };
    send_clock_event(state, EVENT_TICK, &payload);
}

/// Broadcast a visible phase transition (running, paused, finished).
pub fn broadcast_phase_changed(state: &SharedState, phase: VisibleClockPhase) {
    send_clock_event(state, EVENT_PHASE_CHANGED, &PhaseChangedEvent(phase));
}

/// Broadcast that the clock now sits on a different level.
///
/// Sent both for natural rollovers and for manual navigation, carrying the
/// break lookahead so mirrors never have to recompute it.
pub fn broadcast_level_changed(state: &SharedState, index: usize, schedule: &LevelSchedule) {
    let Some(level) = schedule.get(index) else {
        return;
    };
    let payload = LevelChangedEvent {
        current_level_index: index,
        level: BlindLevelDto::from(level),
        break_info: BreakInfoResponse::from(schedule.next_break_from(index)),
    };
    send_clock_event(state, EVENT_LEVEL_CHANGED, &payload);
}

/// Broadcast a fired alert cue so windows can render it visually.
pub fn broadcast_alert(state: &SharedState, cue: AlertCue) {
    let payload = match cue {
        AlertCue::OneMinuteWarning => AlertEvent {
            kind: "one_minute_warning".to_string(),
            remaining: Some(60),
        },
        AlertCue::FinalCountdown(remaining) => AlertEvent {
            kind: "final_countdown".to_string(),
            remaining: Some(remaining),
        },
        AlertCue::LevelComplete => AlertEvent {
            kind: "level_complete".to_string(),
            remaining: None,
        },
    };
    send_clock_event(state, EVENT_ALERT, &payload);
}

/// Broadcast a change of the transient alert flash flag.
pub fn broadcast_alert_flash(state: &SharedState, show_alert: bool) {
    send_clock_event(state, EVENT_ALERT_FLASH, &AlertFlashEvent { show_alert });
}

/// Broadcast the operator window's new role to every stream.
pub fn broadcast_role_changed(state: &SharedState, role: ClockRole) {
    let payload = RoleChangedEvent { role: role.into() };
    send_clock_event(state, EVENT_ROLE_CHANGED, &payload);
    send_controller_event(state, EVENT_ROLE_CHANGED, &payload);
}

/// Broadcast the new sound preference.
pub fn broadcast_sound_changed(state: &SharedState, sound_enabled: bool) {
    send_clock_event(
        state,
        EVENT_SOUND_CHANGED,
        &SoundChangedEvent { sound_enabled },
    );
}

/// Broadcast that a new schedule was installed.
pub fn broadcast_schedule_installed(state: &SharedState, summary: &ScheduleSummary) {
    send_clock_event(state, EVENT_SCHEDULE_INSTALLED, summary);
}

/// Broadcast a degraded-mode transition.
pub fn broadcast_system_status(state: &SharedState, degraded: bool) {
    let payload = SystemStatus { degraded };
    send_clock_event(state, EVENT_SYSTEM_STATUS, &payload);
    send_controller_event(state, EVENT_SYSTEM_STATUS, &payload);
}

fn send_clock_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.clock_sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize clock SSE payload"),
    }
}

fn send_controller_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.controller_sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize controller SSE payload"),
    }
}
