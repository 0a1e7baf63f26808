use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::{
        schedule::{BlindLevelDto, BreakInfoResponse},
        validation::validate_percentage,
    },
    state::{
        clock::ClockState,
        role::ClockRole,
        schedule::LevelSchedule,
    },
};

/// Publicly visible clock phase exposed to clients (REST/SSE).
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibleClockPhase {
    /// No schedule installed yet.
    Idle,
    /// The ticker is driving the clock.
    Running,
    /// The clock is stopped but resumable.
    Paused,
    /// The last level was exhausted; terminal until reset.
    Finished,
}

impl VisibleClockPhase {
    /// Derive the visible phase from the clock state and schedule.
    pub fn derive(state: &ClockState, schedule: &LevelSchedule) -> Self {
        if schedule.is_empty() {
            return VisibleClockPhase::Idle;
        }
        if state.is_running {
            return VisibleClockPhase::Running;
        }

        let at_last_level = state.current_level_index + 1 == schedule.len();
        let exhausted = schedule
            .get(state.current_level_index)
            .is_some_and(|level| state.elapsed_in_level >= level.duration_seconds());
        if at_last_level && exhausted {
            VisibleClockPhase::Finished
        } else {
            VisibleClockPhase::Paused
        }
    }
}

/// Role exposed to clients.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClockRoleDto {
    /// Authoritative controller window.
    Master,
    /// Passive mirror while a display is attached.
    Mirror,
}

impl From<ClockRole> for ClockRoleDto {
    fn from(value: ClockRole) -> Self {
        match value {
            ClockRole::Master => ClockRoleDto::Master,
            ClockRole::Mirror => ClockRoleDto::Mirror,
        }
    }
}

/// Full snapshot of the clock, enough for a late-joining mirror to render.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClockSnapshot {
    /// Current visible phase.
    pub phase: VisibleClockPhase,
    /// Current level, when a schedule is installed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_level: Option<BlindLevelDto>,
    /// The level after the current one, when it exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_level: Option<BlindLevelDto>,
    /// Zero-based index of the current level.
    pub current_level_index: usize,
    /// Seconds elapsed within the current level.
    pub elapsed_in_level: u64,
    /// Seconds remaining in the current level.
    pub time_remaining: u64,
    /// Completion percentage of the current level.
    pub progress_percent: f64,
    /// Seconds elapsed across the whole session.
    pub total_elapsed: u64,
    /// Transient alert flash flag.
    pub show_alert: bool,
    /// Whether audio cues are produced.
    pub sound_enabled: bool,
    /// Break lookahead from the current position.
    pub break_info: BreakInfoResponse,
    /// Role of the operator window.
    pub role: ClockRoleDto,
    /// True when the backend runs without durable storage.
    pub degraded: bool,
}

/// Request seeking to a completion percentage within the current level.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SeekRequest {
    /// Target completion percentage, `0..=100`.
    pub percentage: f64,
}

impl Validate for SeekRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(err) = validate_percentage(self.percentage) {
            errors.add("percentage", err);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Request toggling audio cue production.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SoundRequest {
    /// Whether cues should be produced.
    pub enabled: bool,
}

/// Generic acknowledgement returned by control endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    /// Human-readable confirmation of what happened.
    pub message: String,
}

impl ActionResponse {
    /// Acknowledge with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::schedule::BlindLevel;

    fn schedule() -> LevelSchedule {
        LevelSchedule::new(vec![BlindLevel {
            level: 1,
            small_blind: 25,
            big_blind: 50,
            ante: 0,
            duration_minutes: 1,
            is_break: false,
        }])
    }

    #[test]
    fn phase_is_idle_without_schedule() {
        let state = ClockState::initial(true);
        assert_eq!(
            VisibleClockPhase::derive(&state, &LevelSchedule::empty()),
            VisibleClockPhase::Idle
        );
    }

    #[test]
    fn phase_tracks_running_flag() {
        let mut state = ClockState::initial(true);
        assert_eq!(
            VisibleClockPhase::derive(&state, &schedule()),
            VisibleClockPhase::Paused
        );

        state.is_running = true;
        assert_eq!(
            VisibleClockPhase::derive(&state, &schedule()),
            VisibleClockPhase::Running
        );
    }

    #[test]
    fn phase_is_finished_when_last_level_exhausted() {
        let mut state = ClockState::initial(true);
        state.elapsed_in_level = 60;
        assert_eq!(
            VisibleClockPhase::derive(&state, &schedule()),
            VisibleClockPhase::Finished
        );
    }

    #[test]
    fn seek_request_validates_percentage() {
        assert!(SeekRequest { percentage: 50.0 }.validate().is_ok());
        assert!(SeekRequest { percentage: -1.0 }.validate().is_err());
        assert!(SeekRequest { percentage: f64::NAN }.validate().is_err());
    }
}
