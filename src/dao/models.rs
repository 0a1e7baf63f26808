use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::clock::ClockState;

/// Serialized mirror of [`ClockState`] as written to durable storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockStateEntity {
    pub is_running: bool,
    pub current_level_index: usize,
    pub elapsed_in_level: u64,
    pub total_elapsed: u64,
    pub sound_enabled: bool,
}

/// Snapshot wrapper persisted under the fixed primary/backup keys.
///
/// A snapshot is only eligible for recovery when its season and schedule hash
/// match the live context and it is younger than the staleness window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedClockEntity {
    /// Full copy of the clock state at snapshot time.
    pub state: ClockStateEntity,
    /// Snapshot creation time as Unix epoch milliseconds.
    pub timestamp_ms: u64,
    /// Season the schedule belonged to when the snapshot was taken.
    pub season_id: Uuid,
    /// Game being clocked, when known.
    pub game_id: Option<Uuid>,
    /// Content hash of the level schedule the state was ticked against.
    pub blind_levels_hash: String,
}

/// Record of the most recently played game, used by the display URL fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastGameEntity {
    /// Identifier of the last game a schedule was installed for.
    pub game_id: Uuid,
    /// When the record was written, Unix epoch milliseconds.
    pub updated_ms: u64,
}

impl From<ClockState> for ClockStateEntity {
    fn from(value: ClockState) -> Self {
        Self {
            is_running: value.is_running,
            current_level_index: value.current_level_index,
            elapsed_in_level: value.elapsed_in_level,
            total_elapsed: value.total_elapsed,
            sound_enabled: value.sound_enabled,
        }
    }
}

impl From<ClockStateEntity> for ClockState {
    fn from(value: ClockStateEntity) -> Self {
        Self {
            is_running: value.is_running,
            current_level_index: value.current_level_index,
            elapsed_in_level: value.elapsed_in_level,
            total_elapsed: value.total_elapsed,
            // Transient UI flag, never persisted.
            show_alert: false,
            sound_enabled: value.sound_enabled,
        }
    }
}
