use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{dao::models::PersistedClockEntity, dto::format_unix_millis};

/// Diagnostic report on whether a persisted snapshot can be recovered.
#[derive(Debug, Serialize, ToSchema)]
pub struct RecoveryReport {
    /// True when a matching, fresh snapshot exists.
    pub recoverable: bool,
    /// Why the snapshot was rejected, when it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Details of the stored snapshot, when one exists at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<SnapshotInfo>,
}

/// Metadata describing a stored snapshot.
#[derive(Debug, Serialize, ToSchema)]
pub struct SnapshotInfo {
    /// Season the snapshot was scoped to.
    pub season_id: Uuid,
    /// Game the snapshot was scoped to, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_id: Option<Uuid>,
    /// When the snapshot was written, RFC 3339.
    pub created_at: String,
    /// Level index recorded in the snapshot.
    pub current_level_index: usize,
    /// Total elapsed seconds recorded in the snapshot.
    pub total_elapsed: u64,
}

impl From<&PersistedClockEntity> for SnapshotInfo {
    fn from(value: &PersistedClockEntity) -> Self {
        Self {
            season_id: value.season_id,
            game_id: value.game_id,
            created_at: format_unix_millis(value.timestamp_ms),
            current_level_index: value.state.current_level_index,
            total_elapsed: value.state.total_elapsed,
        }
    }
}

/// Result of restoring the live clock from the backup slot.
#[derive(Debug, Serialize, ToSchema)]
pub struct RestoreResponse {
    /// Whether the live state was overwritten.
    pub restored: bool,
    /// Human-readable outcome.
    pub message: String,
}
