use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One entry of the tournament blind structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlindLevel {
    /// Positive level number, unique within a schedule, defines ordering.
    pub level: u32,
    /// Small blind chip amount (meaningless on break levels).
    pub small_blind: u64,
    /// Big blind chip amount (meaningless on break levels).
    pub big_blind: u64,
    /// Ante chip amount (meaningless on break levels).
    pub ante: u64,
    /// How long the level lasts, in minutes.
    pub duration_minutes: u32,
    /// Break levels carry no blind values, only a duration.
    pub is_break: bool,
}

impl BlindLevel {
    /// Level duration expressed in seconds, the unit the clock ticks in.
    pub fn duration_seconds(&self) -> u64 {
        u64::from(self.duration_minutes) * 60
    }
}

/// Derived projection locating the next break relative to a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakInfo {
    /// The first break level strictly after the current position, if any.
    pub next_break: Option<BlindLevel>,
    /// How many levels away that break is (1 = the very next level).
    pub levels_until_break: Option<usize>,
}

impl BreakInfo {
    /// Projection used when no break lies ahead or the inputs are invalid.
    pub fn none() -> Self {
        Self {
            next_break: None,
            levels_until_break: None,
        }
    }
}

/// Ordered, immutable-per-session blind structure the clock ticks through.
///
/// Levels are sorted by level number at construction; every other component
/// addresses the schedule by zero-based index into that sorted order. The
/// content hash scopes persisted snapshots so editing the structure
/// invalidates prior state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelSchedule {
    levels: Vec<BlindLevel>,
    hash: String,
}

impl LevelSchedule {
    /// Build a schedule from arbitrary level entries, sorting them by level number.
    pub fn new(mut levels: Vec<BlindLevel>) -> Self {
        levels.sort_by_key(|entry| entry.level);
        let hash = content_hash(&levels);
        Self { levels, hash }
    }

    /// Empty schedule; every clock operation degrades to a no-op against it.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Sorted levels backing this schedule.
    pub fn levels(&self) -> &[BlindLevel] {
        &self.levels
    }

    /// Number of levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Whether the schedule holds no levels at all.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level at the given zero-based index into the sorted order.
    pub fn get(&self, index: usize) -> Option<&BlindLevel> {
        self.levels.get(index)
    }

    /// Hex-encoded content hash identifying this exact structure.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Scan forward from `index` for the first level flagged as a break.
    ///
    /// The scan starts strictly after the current position; a break level the
    /// clock is already sitting on does not count as "next". Invalid inputs
    /// (empty schedule, out-of-range index) yield the null projection.
    pub fn next_break_from(&self, index: usize) -> BreakInfo {
        if self.levels.is_empty() || index >= self.levels.len() {
            return BreakInfo::none();
        }

        for (offset, candidate) in self.levels[index + 1..].iter().enumerate() {
            if candidate.is_break {
                return BreakInfo {
                    next_break: Some(candidate.clone()),
                    levels_until_break: Some(offset + 1),
                };
            }
        }

        BreakInfo::none()
    }
}

/// Hash the fields that affect displayed or ticked behavior, level by level.
///
/// Ante participates: any edit that changes what players see or how long a
/// level runs must invalidate previously persisted clock snapshots.
fn content_hash(levels: &[BlindLevel]) -> String {
    let mut hasher = Sha256::new();
    write_u64(&mut hasher, levels.len() as u64);
    for entry in levels {
        write_u64(&mut hasher, u64::from(entry.level));
        write_u64(&mut hasher, entry.small_blind);
        write_u64(&mut hasher, entry.big_blind);
        write_u64(&mut hasher, entry.ante);
        write_u64(&mut hasher, u64::from(entry.duration_minutes));
        write_bool(&mut hasher, entry.is_break);
    }
    format!("{:x}", hasher.finalize())
}

fn write_u64(hasher: &mut Sha256, value: u64) {
    hasher.update(value.to_be_bytes());
}

fn write_bool(hasher: &mut Sha256, value: bool) {
    hasher.update([u8::from(value)]);
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn level(number: u32, minutes: u32, is_break: bool) -> BlindLevel {
        BlindLevel {
            level: number,
            small_blind: 25 * u64::from(number),
            big_blind: 50 * u64::from(number),
            ante: 0,
            duration_minutes: minutes,
            is_break,
        }
    }

    #[test]
    fn levels_are_sorted_by_level_number() {
        let schedule = LevelSchedule::new(vec![level(3, 20, false), level(1, 20, false), level(2, 10, true)]);
        let numbers: Vec<u32> = schedule.levels().iter().map(|l| l.level).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn break_lookahead_finds_nearest_break() {
        let schedule = LevelSchedule::new(vec![
            level(1, 20, false),
            level(2, 10, true),
            level(3, 20, false),
        ]);

        let info = schedule.next_break_from(0);
        assert_eq!(info.next_break.map(|b| b.level), Some(2));
        assert_eq!(info.levels_until_break, Some(1));
    }

    #[test]
    fn break_lookahead_past_last_break_is_null() {
        let schedule = LevelSchedule::new(vec![
            level(1, 20, false),
            level(2, 10, true),
            level(3, 20, false),
        ]);

        assert_eq!(schedule.next_break_from(2), BreakInfo::none());
    }

    #[test]
    fn break_lookahead_ignores_current_break_level() {
        let schedule = LevelSchedule::new(vec![level(1, 10, true), level(2, 20, false)]);
        assert_eq!(schedule.next_break_from(0), BreakInfo::none());
    }

    #[test]
    fn break_lookahead_rejects_invalid_inputs() {
        assert_eq!(LevelSchedule::empty().next_break_from(0), BreakInfo::none());

        let schedule = LevelSchedule::new(vec![level(1, 20, false)]);
        assert_eq!(schedule.next_break_from(5), BreakInfo::none());
    }

    #[test]
    fn hash_is_stable_for_identical_structures() {
        let a = LevelSchedule::new(vec![level(1, 20, false), level(2, 20, false)]);
        let b = LevelSchedule::new(vec![level(2, 20, false), level(1, 20, false)]);
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn hash_changes_when_ante_changes() {
        let base = LevelSchedule::new(vec![level(1, 20, false)]);

        let mut edited_level = level(1, 20, false);
        edited_level.ante = 100;
        let edited = LevelSchedule::new(vec![edited_level]);

        assert_ne!(base.hash(), edited.hash());
    }

    #[test]
    fn hash_changes_when_duration_changes() {
        let a = LevelSchedule::new(vec![level(1, 20, false)]);
        let b = LevelSchedule::new(vec![level(1, 15, false)]);
        assert_ne!(a.hash(), b.hash());
    }
}
