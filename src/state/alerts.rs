//! Threshold tracking that turns elapsed time into exactly-once audio cues.

/// Audio cue derived from the clock position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertCue {
    /// Low warning tone when exactly one minute remains in the level.
    OneMinuteWarning,
    /// Short tick tone for each of the final seconds (4 down to 1).
    FinalCountdown(u64),
    /// Two-tone chime when a level's duration is exhausted.
    LevelComplete,
}

/// Two-state cell guarding a threshold against repeat firing.
///
/// A cell fires at most once while the tracked value sits in its trigger zone
/// and re-arms only when the value moves safely out of it, so repeated
/// observations of the same second never double-fire a cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ThresholdCell {
    Armed,
    Fired,
}

impl ThresholdCell {
    /// Fire once while `in_zone`, re-arm once the value leaves the zone.
    fn observe(&mut self, in_zone: bool) -> bool {
        match (*self, in_zone) {
            (ThresholdCell::Armed, true) => {
                *self = ThresholdCell::Fired;
                true
            }
            (ThresholdCell::Fired, false) => {
                *self = ThresholdCell::Armed;
                false
            }
            _ => false,
        }
    }
}

/// Derives cues from the remaining time in the current level.
///
/// Each threshold keeps its own cell so consecutive levels can re-trigger the
/// same cues without thresholds leaking into each other.
#[derive(Debug, Clone)]
pub struct AlertEngine {
    one_minute: ThresholdCell,
    completion: ThresholdCell,
    last_countdown_second: Option<u64>,
}

impl Default for AlertEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertEngine {
    /// Engine with every threshold armed.
    pub fn new() -> Self {
        Self {
            one_minute: ThresholdCell::Armed,
            completion: ThresholdCell::Armed,
            last_countdown_second: None,
        }
    }

    /// Observe whether the current tick completes a level, before it commits.
    ///
    /// Returns `true` exactly once per level boundary; the caller fires the
    /// completion chime before committing the index change so listeners still
    /// see the finishing level.
    pub fn observe_completion(&mut self, level_completed: bool) -> bool {
        self.completion.observe(level_completed)
    }

    /// Observe the committed remaining time and collect cues to fire.
    pub fn observe_remaining(&mut self, remaining: u64) -> Vec<AlertCue> {
        let mut cues = Vec::new();

        if self.one_minute.observe(remaining == 60) {
            cues.push(AlertCue::OneMinuteWarning);
        }

        if (1..=4).contains(&remaining) {
            if self.last_countdown_second != Some(remaining) {
                self.last_countdown_second = Some(remaining);
                cues.push(AlertCue::FinalCountdown(remaining));
            }
        } else {
            self.last_countdown_second = None;
        }

        cues
    }

    /// Re-arm every threshold, used when the clock is reset or restored.
    pub fn rearm(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_minute_warning_fires_once_per_crossing() {
        let mut engine = AlertEngine::new();

        assert_eq!(
            engine.observe_remaining(60),
            vec![AlertCue::OneMinuteWarning]
        );
        // Re-observing the same second (e.g. a redundant refresh) stays quiet.
        assert!(engine.observe_remaining(60).is_empty());
        assert!(engine.observe_remaining(59).is_empty());

        // A later level re-arms the threshold once remaining exceeds it again.
        assert!(engine.observe_remaining(1200).is_empty());
        assert_eq!(
            engine.observe_remaining(60),
            vec![AlertCue::OneMinuteWarning]
        );
    }

    #[test]
    fn final_countdown_fires_once_per_distinct_second() {
        let mut engine = AlertEngine::new();

        assert!(engine.observe_remaining(5).is_empty());
        assert_eq!(engine.observe_remaining(4), vec![AlertCue::FinalCountdown(4)]);
        assert!(engine.observe_remaining(4).is_empty());
        assert_eq!(engine.observe_remaining(3), vec![AlertCue::FinalCountdown(3)]);
        assert_eq!(engine.observe_remaining(2), vec![AlertCue::FinalCountdown(2)]);
        assert_eq!(engine.observe_remaining(1), vec![AlertCue::FinalCountdown(1)]);
        assert!(engine.observe_remaining(0).is_empty());

        // Next level: the countdown memory was reset at 0.
        assert!(engine.observe_remaining(1200).is_empty());
        assert_eq!(engine.observe_remaining(4), vec![AlertCue::FinalCountdown(4)]);
    }

    #[test]
    fn completion_fires_once_per_boundary() {
        let mut engine = AlertEngine::new();

        assert!(engine.observe_completion(true));
        assert!(!engine.observe_completion(true));

        // An ordinary tick re-arms the completion cell.
        assert!(!engine.observe_completion(false));
        assert!(engine.observe_completion(true));
    }

    #[test]
    fn thresholds_are_independent() {
        let mut engine = AlertEngine::new();

        assert_eq!(
            engine.observe_remaining(60),
            vec![AlertCue::OneMinuteWarning]
        );
        assert_eq!(engine.observe_remaining(4), vec![AlertCue::FinalCountdown(4)]);
        assert!(engine.observe_completion(true));
    }

    #[test]
    fn rearm_resets_all_memory() {
        let mut engine = AlertEngine::new();
        engine.observe_remaining(60);
        engine.observe_remaining(4);
        engine.observe_completion(true);

        engine.rearm();

        assert_eq!(
            engine.observe_remaining(60),
            vec![AlertCue::OneMinuteWarning]
        );
        assert_eq!(engine.observe_remaining(4), vec![AlertCue::FinalCountdown(4)]);
        assert!(engine.observe_completion(true));
    }
}
