use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    dto::validation::validate_level_entry,
    state::schedule::{BlindLevel, BreakInfo, LevelSchedule},
};

/// Payload installing the blind structure for a season/game.
#[derive(Debug, Deserialize, ToSchema)]
pub struct InstallScheduleRequest {
    /// Season the structure belongs to; scopes persisted snapshots.
    pub season_id: Uuid,
    /// Game being clocked, when already known.
    #[serde(default)]
    pub game_id: Option<Uuid>,
    /// Blind levels in any order; the backend sorts by level number.
    pub levels: Vec<BlindLevelInput>,
}

impl Validate for InstallScheduleRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.levels.is_empty() {
            let mut err = ValidationError::new("levels_empty");
            err.message = Some("A schedule requires at least one level".into());
            errors.add("levels", err);
        }

        let mut seen = HashSet::new();
        for entry in &self.levels {
            if let Err(err) = validate_level_entry(entry.level, entry.duration_minutes) {
                errors.add("levels", err);
            }
            if !seen.insert(entry.level) {
                let mut err = ValidationError::new("level_duplicate");
                err.message = Some(format!("Duplicate level number {}", entry.level).into());
                errors.add("levels", err);
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Incoming blind level definition.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BlindLevelInput {
    /// Positive level number, unique within the schedule.
    pub level: u32,
    /// Small blind chip amount; ignored for breaks.
    #[serde(default)]
    pub small_blind: u64,
    /// Big blind chip amount; ignored for breaks.
    #[serde(default)]
    pub big_blind: u64,
    /// Ante chip amount; ignored for breaks.
    #[serde(default)]
    pub ante: u64,
    /// Level duration in minutes, strictly positive.
    pub duration_minutes: u32,
    /// Whether this level is a break.
    #[serde(default)]
    pub is_break: bool,
}

impl From<BlindLevelInput> for BlindLevel {
    fn from(value: BlindLevelInput) -> Self {
        Self {
            level: value.level,
            small_blind: value.small_blind,
            big_blind: value.big_blind,
            ante: value.ante,
            duration_minutes: value.duration_minutes,
            is_break: value.is_break,
        }
    }
}

/// Snapshot of a single blind level for API payloads.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BlindLevelDto {
    pub level: u32,
    pub small_blind: u64,
    pub big_blind: u64,
    pub ante: u64,
    pub duration_minutes: u32,
    pub is_break: bool,
}

impl From<&BlindLevel> for BlindLevelDto {
    fn from(value: &BlindLevel) -> Self {
        Self {
            level: value.level,
            small_blind: value.small_blind,
            big_blind: value.big_blind,
            ante: value.ante,
            duration_minutes: value.duration_minutes,
            is_break: value.is_break,
        }
    }
}

/// Summary of the installed schedule.
#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduleSummary {
    /// Season the structure belongs to.
    pub season_id: Uuid,
    /// Game being clocked, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_id: Option<Uuid>,
    /// Content hash identifying this exact structure.
    pub blind_levels_hash: String,
    /// Sorted levels.
    pub levels: Vec<BlindLevelDto>,
}

impl ScheduleSummary {
    /// Build a summary from the installed schedule and its scoping context.
    pub fn from_schedule(
        schedule: &LevelSchedule,
        season_id: Uuid,
        game_id: Option<Uuid>,
    ) -> Self {
        Self {
            season_id,
            game_id,
            blind_levels_hash: schedule.hash().to_string(),
            levels: schedule.levels().iter().map(Into::into).collect(),
        }
    }
}

/// Break lookahead projection returned to display components.
#[derive(Debug, Serialize, ToSchema)]
pub struct BreakInfoResponse {
    /// The next break level, when one lies ahead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_break: Option<BlindLevelDto>,
    /// How many levels away that break is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub levels_until_break: Option<usize>,
}

impl From<BreakInfo> for BreakInfoResponse {
    fn from(value: BreakInfo) -> Self {
        Self {
            next_break: value.next_break.as_ref().map(Into::into),
            levels_until_break: value.levels_until_break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(level: u32, minutes: u32) -> BlindLevelInput {
        BlindLevelInput {
            level,
            small_blind: 25,
            big_blind: 50,
            ante: 0,
            duration_minutes: minutes,
            is_break: false,
        }
    }

    #[test]
    fn valid_request_passes() {
        let request = InstallScheduleRequest {
            season_id: Uuid::new_v4(),
            game_id: None,
            levels: vec![entry(1, 20), entry(2, 20)],
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn empty_levels_rejected() {
        let request = InstallScheduleRequest {
            season_id: Uuid::new_v4(),
            game_id: None,
            levels: vec![],
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn duplicate_level_numbers_rejected() {
        let request = InstallScheduleRequest {
            season_id: Uuid::new_v4(),
            game_id: None,
            levels: vec![entry(1, 20), entry(1, 15)],
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn zero_duration_rejected() {
        let request = InstallScheduleRequest {
            season_id: Uuid::new_v4(),
            game_id: None,
            levels: vec![entry(1, 0)],
        };
        assert!(request.validate().is_err());
    }
}
