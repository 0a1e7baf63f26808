use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::{
    clock::{ClockRoleDto, VisibleClockPhase},
    schedule::{BlindLevelDto, BreakInfoResponse},
};

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Build an event carrying a pre-rendered data payload.
    pub fn new<E>(event: E, data: String) -> Self
    where
        E: Into<Option<String>>,
    {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Identifier of the SSE stream (`clock`, `controller`, or `display`).
    pub stream: String,
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Whether the backend is running without a snapshot store.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Token handed to the single master controller stream.
pub struct ControllerHandshake {
    /// Control token required by mutating endpoints.
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the backend enters or leaves degraded mode.
pub struct SystemStatus {
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast once per second while the clock runs.
pub struct TickEvent {
    pub current_level_index: usize,
    pub elapsed_in_level: u64,
    pub time_remaining: u64,
    pub progress_percent: f64,
    pub total_elapsed: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// Broadcast whenever the visible clock phase changes.
pub struct PhaseChangedEvent(pub VisibleClockPhase);

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the clock moves to a different level (tick or navigation).
pub struct LevelChangedEvent {
    pub current_level_index: usize,
    pub level: BlindLevelDto,
    pub break_info: BreakInfoResponse,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when an alert threshold fires.
pub struct AlertEvent {
    /// Alert kind (`one_minute_warning`, `final_countdown`, `level_complete`).
    pub kind: String,
    /// Remaining seconds for countdown alerts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the transient alert flash flag changes.
pub struct AlertFlashEvent {
    pub show_alert: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the operator window's role flips.
pub struct RoleChangedEvent {
    pub role: ClockRoleDto,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the sound toggle changes.
pub struct SoundChangedEvent {
    pub sound_enabled: bool,
}
