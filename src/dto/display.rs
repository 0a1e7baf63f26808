use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Request to resolve a spectator display URL.
///
/// The game identifier is resolved in priority order: the explicit `game_id`,
/// then a game id parsed out of `path`, then the game of the installed
/// schedule, then the most recently played game on record.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OpenDisplayRequest {
    /// Explicit game identifier, highest priority.
    #[serde(default)]
    pub game_id: Option<Uuid>,
    /// Route path to parse a game id out of (e.g. `/games/<id>/clock`).
    #[serde(default)]
    pub path: Option<String>,
}

/// Resolved display URL for the spectator window.
#[derive(Debug, Serialize, ToSchema)]
pub struct DisplayUrlResponse {
    /// URL the operator should open in the new window.
    pub url: String,
    /// The game the display will show.
    pub game_id: Uuid,
}
