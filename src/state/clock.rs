use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::schedule::LevelSchedule;

/// The single mutable state of the running tournament clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockState {
    /// Whether the 1 Hz ticker is (supposed to be) driving this clock.
    pub is_running: bool,
    /// Zero-based index into the sorted schedule; corrected to 0 when invalid.
    pub current_level_index: usize,
    /// Seconds elapsed within the current level, clamped to the level duration.
    pub elapsed_in_level: u64,
    /// Seconds elapsed across the whole session; never decreases.
    pub total_elapsed: u64,
    /// Transient flag driving the UI flash effect; cleared after a short delay.
    pub show_alert: bool,
    /// Gates whether audio cues are produced; never affects ticking.
    pub sound_enabled: bool,
}

impl ClockState {
    /// Fresh state at level 0 with nothing elapsed.
    pub fn initial(sound_enabled: bool) -> Self {
        Self {
            is_running: false,
            current_level_index: 0,
            elapsed_in_level: 0,
            total_elapsed: 0,
            show_alert: false,
            sound_enabled,
        }
    }
}

/// What a single tick did (or will do) to the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Degenerate input or paused clock; state unchanged.
    Idle,
    /// One more second elapsed within the current level.
    Advanced,
    /// The current level's duration was exhausted and the clock moved on.
    LevelCompleted {
        /// Index of the level that just finished.
        finished_index: usize,
    },
    /// The last level was exhausted; the clock stopped in a terminal state.
    ScheduleFinished,
}

/// Error returned when a seek request cannot be applied.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeekError {
    /// Percentage is NaN or outside `0..=100`.
    #[error("percentage {0} is outside the 0..=100 range")]
    InvalidPercentage(f64),
    /// The schedule holds no level at the clock's current position.
    #[error("no current level to seek within")]
    NoCurrentLevel,
}

/// Pure state machine advancing the blind structure one second at a time.
///
/// The clock never performs I/O and never throws across its boundary: invalid
/// schedules degrade every operation to a no-op. The surrounding service layer
/// owns the actual ticker task, the audio engine, and persistence.
#[derive(Debug, Clone)]
pub struct BlindClock {
    state: ClockState,
}

impl BlindClock {
    /// Create a paused clock positioned at the first level.
    pub fn new(sound_enabled: bool) -> Self {
        Self {
            state: ClockState::initial(sound_enabled),
        }
    }

    /// Current state, read-only.
    pub fn state(&self) -> &ClockState {
        &self.state
    }

    /// Mark the clock as running. The caller owns the ticker resource.
    pub fn mark_running(&mut self) {
        self.state.is_running = true;
    }

    /// Mark the clock as paused. The caller must have cancelled the ticker.
    pub fn mark_paused(&mut self) {
        self.state.is_running = false;
    }

    /// Reset to the initial state, keeping only the sound preference.
    pub fn reset(&mut self) {
        self.state = ClockState::initial(self.state.sound_enabled);
    }

    /// Toggle whether audio cues are produced.
    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.state.sound_enabled = enabled;
    }

    /// Raise the transient UI alert flag; the caller owns clearing it later.
    pub fn raise_alert(&mut self) {
        self.state.show_alert = true;
    }

    /// Clear the transient UI alert flag.
    pub fn clear_alert(&mut self) {
        self.state.show_alert = false;
    }

    /// Correct the state against the given schedule.
    ///
    /// An out-of-range level index is pulled back to 0 and the elapsed time
    /// within the level is clamped into its duration.
    pub fn validate(&mut self, schedule: &LevelSchedule) {
        if !schedule.is_empty() && self.state.current_level_index >= schedule.len() {
            self.state.current_level_index = 0;
            self.state.elapsed_in_level = 0;
        }
        if let Some(level) = schedule.get(self.state.current_level_index) {
            self.state.elapsed_in_level = self.state.elapsed_in_level.min(level.duration_seconds());
        }
    }

    /// Overwrite the live state with a recovered snapshot, then re-validate.
    ///
    /// `total_elapsed` is kept monotone: a snapshot cannot move it backwards
    /// below what this clock instance has already accumulated.
    pub fn restore(&mut self, mut snapshot: ClockState, schedule: &LevelSchedule) {
        snapshot.total_elapsed = snapshot.total_elapsed.max(self.state.total_elapsed);
        snapshot.is_running = false;
        self.state = snapshot;
        self.validate(schedule);
    }

    /// Compute what the next tick will do without committing it.
    ///
    /// The service layer uses this to fire the level-complete cue before the
    /// index change is committed, so observers keep the previous-level context.
    pub fn peek_tick(&self, schedule: &LevelSchedule) -> TickOutcome {
        if !self.state.is_running {
            return TickOutcome::Idle;
        }

        let Some(level) = schedule.get(self.state.current_level_index) else {
            return TickOutcome::Idle;
        };
        let limit = level.duration_seconds();
        if limit == 0 {
            return TickOutcome::Idle;
        }

        if self.state.elapsed_in_level + 1 < limit {
            TickOutcome::Advanced
        } else if self.state.current_level_index + 1 < schedule.len() {
            TickOutcome::LevelCompleted {
                finished_index: self.state.current_level_index,
            }
        } else {
            TickOutcome::ScheduleFinished
        }
    }

    /// Advance the clock by one second, committing the outcome of [`Self::peek_tick`].
    pub fn tick(&mut self, schedule: &LevelSchedule) -> TickOutcome {
        let outcome = self.peek_tick(schedule);
        match outcome {
            TickOutcome::Idle => {}
            TickOutcome::Advanced => {
                self.state.elapsed_in_level += 1;
                self.state.total_elapsed += 1;
            }
            TickOutcome::LevelCompleted { .. } => {
                self.state.current_level_index += 1;
                self.state.elapsed_in_level = 0;
                self.state.show_alert = true;
                self.state.total_elapsed += 1;
            }
            TickOutcome::ScheduleFinished => {
                self.state.elapsed_in_level = schedule
                    .get(self.state.current_level_index)
                    .map(|level| level.duration_seconds())
                    .unwrap_or(self.state.elapsed_in_level);
                self.state.is_running = false;
                self.state.total_elapsed += 1;
            }
        }
        outcome
    }

    /// Jump to the next level, resetting position within it. No-op at the end.
    pub fn next_level(&mut self, schedule: &LevelSchedule) -> bool {
        if self.state.current_level_index + 1 >= schedule.len() {
            return false;
        }
        self.state.current_level_index += 1;
        self.state.elapsed_in_level = 0;
        self.state.show_alert = false;
        true
    }

    /// Jump back to the previous level, resetting position within it.
    ///
    /// At the bottom this re-affirms index 0 instead of wrapping, which also
    /// repairs an externally corrupted index.
    pub fn previous_level(&mut self) -> bool {
        if self.state.current_level_index == 0 {
            self.state.current_level_index = 0;
            return false;
        }
        self.state.current_level_index -= 1;
        self.state.elapsed_in_level = 0;
        self.state.show_alert = false;
        true
    }

    /// Seek to a completion percentage within the current level.
    ///
    /// Only the position within the level moves; the index, the running flag,
    /// and the total elapsed time are untouched. Returns the new elapsed value.
    pub fn set_level_progress(
        &mut self,
        schedule: &LevelSchedule,
        percentage: f64,
    ) -> Result<u64, SeekError> {
        if !percentage.is_finite() || !(0.0..=100.0).contains(&percentage) {
            return Err(SeekError::InvalidPercentage(percentage));
        }
        let level = schedule
            .get(self.state.current_level_index)
            .ok_or(SeekError::NoCurrentLevel)?;

        let limit = level.duration_seconds();
        let target = ((limit as f64) * percentage / 100.0).round() as u64;
        self.state.elapsed_in_level = target.min(limit);
        Ok(self.state.elapsed_in_level)
    }

    /// Seconds remaining in the current level; 0 when the position is invalid.
    pub fn time_remaining(&self, schedule: &LevelSchedule) -> u64 {
        schedule
            .get(self.state.current_level_index)
            .map(|level| {
                level
                    .duration_seconds()
                    .saturating_sub(self.state.elapsed_in_level)
            })
            .unwrap_or(0)
    }

    /// Completion percentage of the current level, in `0.0..=100.0`.
    pub fn progress_percent(&self, schedule: &LevelSchedule) -> f64 {
        schedule
            .get(self.state.current_level_index)
            .map(|level| {
                let limit = level.duration_seconds();
                if limit == 0 {
                    0.0
                } else {
                    (self.state.elapsed_in_level as f64 / limit as f64) * 100.0
                }
            })
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::schedule::BlindLevel;

    fn minute_level(number: u32) -> BlindLevel {
        BlindLevel {
            level: number,
            small_blind: 25,
            big_blind: 50,
            ante: 0,
            duration_minutes: 1,
            is_break: false,
        }
    }

    fn two_minute_levels() -> LevelSchedule {
        LevelSchedule::new(vec![minute_level(1), minute_level(2)])
    }

    fn running_clock() -> BlindClock {
        let mut clock = BlindClock::new(true);
        clock.mark_running();
        clock
    }

    #[test]
    fn tick_advances_within_level() {
        let schedule = two_minute_levels();
        let mut clock = running_clock();

        assert_eq!(clock.tick(&schedule), TickOutcome::Advanced);
        assert_eq!(clock.state().elapsed_in_level, 1);
        assert_eq!(clock.state().total_elapsed, 1);
        assert_eq!(clock.state().current_level_index, 0);
    }

    #[test]
    fn level_rollover_resets_elapsed_and_flags_alert() {
        let schedule = two_minute_levels();
        let mut clock = running_clock();

        for _ in 0..59 {
            assert_eq!(clock.tick(&schedule), TickOutcome::Advanced);
        }
        assert_eq!(
            clock.tick(&schedule),
            TickOutcome::LevelCompleted { finished_index: 0 }
        );
        assert_eq!(clock.state().current_level_index, 1);
        assert_eq!(clock.state().elapsed_in_level, 0);
        assert!(clock.state().show_alert);
        assert!(clock.state().is_running);
        assert_eq!(clock.state().total_elapsed, 60);
    }

    #[test]
    fn last_level_exhaustion_is_terminal() {
        let schedule = two_minute_levels();
        let mut clock = running_clock();

        for _ in 0..60 {
            clock.tick(&schedule);
        }
        for _ in 0..59 {
            assert_eq!(clock.tick(&schedule), TickOutcome::Advanced);
        }
        assert_eq!(clock.tick(&schedule), TickOutcome::ScheduleFinished);
        assert!(!clock.state().is_running);
        assert_eq!(clock.state().current_level_index, 1);
        assert_eq!(clock.state().total_elapsed, 120);

        // Paused terminal state: further ticks change nothing.
        assert_eq!(clock.tick(&schedule), TickOutcome::Idle);
        assert_eq!(clock.state().total_elapsed, 120);
    }

    #[test]
    fn tick_on_empty_schedule_is_noop() {
        let schedule = LevelSchedule::empty();
        let mut clock = running_clock();

        assert_eq!(clock.tick(&schedule), TickOutcome::Idle);
        assert_eq!(clock.state().total_elapsed, 0);
    }

    #[test]
    fn tick_on_zero_duration_level_is_noop() {
        let schedule = LevelSchedule::new(vec![BlindLevel {
            level: 1,
            small_blind: 0,
            big_blind: 0,
            ante: 0,
            duration_minutes: 0,
            is_break: true,
        }]);
        let mut clock = running_clock();

        assert_eq!(clock.tick(&schedule), TickOutcome::Idle);
    }

    #[test]
    fn paused_clock_does_not_tick() {
        let schedule = two_minute_levels();
        let mut clock = BlindClock::new(true);

        assert_eq!(clock.tick(&schedule), TickOutcome::Idle);
        assert_eq!(clock.state().total_elapsed, 0);
    }

    #[test]
    fn navigation_moves_between_levels() {
        let schedule = two_minute_levels();
        let mut clock = BlindClock::new(true);

        assert!(clock.next_level(&schedule));
        assert_eq!(clock.state().current_level_index, 1);
        assert!(!clock.next_level(&schedule));

        assert!(clock.previous_level());
        assert_eq!(clock.state().current_level_index, 0);
        assert!(!clock.previous_level());
        assert_eq!(clock.state().current_level_index, 0);
    }

    #[test]
    fn navigation_resets_position_within_level() {
        let schedule = two_minute_levels();
        let mut clock = running_clock();
        for _ in 0..10 {
            clock.tick(&schedule);
        }

        clock.next_level(&schedule);
        assert_eq!(clock.state().elapsed_in_level, 0);
        assert_eq!(clock.state().total_elapsed, 10);
    }

    #[test]
    fn seek_places_elapsed_by_percentage() {
        let schedule = LevelSchedule::new(vec![BlindLevel {
            level: 1,
            small_blind: 25,
            big_blind: 50,
            ante: 0,
            duration_minutes: 20,
            is_break: false,
        }]);
        let mut clock = BlindClock::new(true);

        assert_eq!(clock.set_level_progress(&schedule, 50.0), Ok(600));
        assert_eq!(clock.set_level_progress(&schedule, 0.0), Ok(0));
        assert_eq!(clock.set_level_progress(&schedule, 100.0), Ok(1200));
    }

    #[test]
    fn seek_rejects_invalid_percentages() {
        let schedule = two_minute_levels();
        let mut clock = BlindClock::new(true);
        clock.set_level_progress(&schedule, 25.0).unwrap();

        for bad in [-1.0, 100.1, f64::NAN, f64::INFINITY] {
            assert!(clock.set_level_progress(&schedule, bad).is_err());
        }
        // Rejected seeks leave the state untouched.
        assert_eq!(clock.state().elapsed_in_level, 15);
    }

    #[test]
    fn seek_does_not_touch_index_or_totals() {
        let schedule = two_minute_levels();
        let mut clock = running_clock();
        for _ in 0..5 {
            clock.tick(&schedule);
        }

        clock.set_level_progress(&schedule, 75.0).unwrap();
        assert_eq!(clock.state().current_level_index, 0);
        assert_eq!(clock.state().total_elapsed, 5);
        assert!(clock.state().is_running);
    }

    #[test]
    fn validate_corrects_out_of_range_index() {
        let schedule = two_minute_levels();
        let mut clock = BlindClock::new(true);

        let mut corrupted = ClockState::initial(true);
        corrupted.current_level_index = 99;
        corrupted.elapsed_in_level = 999;
        clock.restore(corrupted, &schedule);

        assert_eq!(clock.state().current_level_index, 0);
        assert_eq!(clock.state().elapsed_in_level, 0);
    }

    #[test]
    fn restore_keeps_total_elapsed_monotone() {
        let schedule = two_minute_levels();
        let mut clock = running_clock();
        for _ in 0..30 {
            clock.tick(&schedule);
        }

        let mut older = clock.state().clone();
        older.total_elapsed = 5;
        clock.restore(older, &schedule);

        assert_eq!(clock.state().total_elapsed, 30);
        assert!(!clock.state().is_running);
    }

    #[test]
    fn peek_matches_commit() {
        let schedule = two_minute_levels();
        let mut clock = running_clock();

        for _ in 0..120 {
            let peeked = clock.peek_tick(&schedule);
            assert_eq!(clock.tick(&schedule), peeked);
        }
    }

    #[test]
    fn time_remaining_and_progress_derive_from_state() {
        let schedule = two_minute_levels();
        let mut clock = running_clock();
        for _ in 0..15 {
            clock.tick(&schedule);
        }

        assert_eq!(clock.time_remaining(&schedule), 45);
        assert_eq!(clock.progress_percent(&schedule), 25.0);
        assert_eq!(clock.time_remaining(&LevelSchedule::empty()), 0);
    }
}
