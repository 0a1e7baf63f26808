//! End-to-end tick flow over a realistic two-level blind structure.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use uuid::Uuid;

use blind_clock_back::{
    audio::{PlaybackOutcome, SoundEngine},
    config::AppConfig,
    dto::schedule::{BlindLevelInput, InstallScheduleRequest},
    services::{schedule_service, ticker},
    state::{AppState, SharedState, alerts::AlertCue},
};

/// Engine counting cues per kind instead of rendering them.
#[derive(Default)]
struct CountingEngine {
    chimes: AtomicUsize,
    warnings: AtomicUsize,
    countdowns: AtomicUsize,
}

impl SoundEngine for CountingEngine {
    fn play(&self, cue: AlertCue) -> PlaybackOutcome {
        match cue {
            AlertCue::LevelComplete => self.chimes.fetch_add(1, Ordering::SeqCst),
            AlertCue::OneMinuteWarning => self.warnings.fetch_add(1, Ordering::SeqCst),
            AlertCue::FinalCountdown(_) => self.countdowns.fetch_add(1, Ordering::SeqCst),
        };
        PlaybackOutcome::Played
    }

    fn reload(&self) -> PlaybackOutcome {
        PlaybackOutcome::Played
    }
}

fn twenty_minute_level(level: u32) -> BlindLevelInput {
    BlindLevelInput {
        level,
        small_blind: 100 * u64::from(level),
        big_blind: 200 * u64::from(level),
        ante: 0,
        duration_minutes: 20,
        is_break: false,
    }
}

async fn install_two_levels(state: &SharedState) {
    schedule_service::install(
        state,
        InstallScheduleRequest {
            season_id: Uuid::new_v4(),
            game_id: None,
            levels: vec![twenty_minute_level(1), twenty_minute_level(2)],
        },
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn twelve_hundred_ticks_cross_exactly_one_level_boundary() {
    let engine = Arc::new(CountingEngine::default());
    let state = AppState::new(AppConfig::default(), engine.clone());
    install_two_levels(&state).await;

    state.clock().write().await.mark_running();
    for _ in 0..1_200 {
        ticker::run_tick(&state).await;
    }

    let clock = state.clock().read().await;
    assert_eq!(clock.state().current_level_index, 1);
    assert_eq!(clock.state().elapsed_in_level, 0);
    assert_eq!(clock.state().total_elapsed, 1_200);
    assert!(clock.state().is_running);

    // One rollover chime, one one-minute warning, four countdown tones.
    assert_eq!(engine.chimes.load(Ordering::SeqCst), 1);
    assert_eq!(engine.warnings.load(Ordering::SeqCst), 1);
    assert_eq!(engine.countdowns.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn muting_sound_silences_cues_without_touching_the_clock() {
    let engine = Arc::new(CountingEngine::default());
    let state = AppState::new(AppConfig::default(), engine.clone());
    install_two_levels(&state).await;

    {
        let mut clock = state.clock().write().await;
        clock.set_sound_enabled(false);
        clock.mark_running();
    }
    for _ in 0..1_200 {
        ticker::run_tick(&state).await;
    }

    let clock = state.clock().read().await;
    assert_eq!(clock.state().current_level_index, 1);
    assert_eq!(clock.state().total_elapsed, 1_200);
    assert_eq!(engine.chimes.load(Ordering::SeqCst), 0);
    assert_eq!(engine.warnings.load(Ordering::SeqCst), 0);
    assert_eq!(engine.countdowns.load(Ordering::SeqCst), 0);
}
