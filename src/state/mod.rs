pub mod alerts;
pub mod clock;
pub mod role;
pub mod schedule;
mod sse;

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock, watch};
use uuid::Uuid;

use crate::{
    audio::SoundEngine,
    config::AppConfig,
    dao::snapshot_store::SnapshotStore,
    services::ticker::TickerGuard,
    state::{alerts::AlertEngine, clock::BlindClock, role::ClockRole, schedule::LevelSchedule},
};

pub use self::sse::{ControllerSseState, DisplaySlot, SseHub};
use self::sse::SseState;

/// Shared handle to the central application state.
pub type SharedState = Arc<AppState>;

/// Season/game identifier pair scoping persisted clock snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameContext {
    /// Season the installed schedule belongs to.
    pub season_id: Uuid,
    /// Game currently being clocked, when known.
    pub game_id: Option<Uuid>,
}

/// Central application state owning the clock, its schedule, and the hubs.
pub struct AppState {
    config: AppConfig,
    snapshot_store: RwLock<Option<Arc<dyn SnapshotStore>>>,
    sse: SseState,
    clock: RwLock<BlindClock>,
    alerts: Mutex<AlertEngine>,
    schedule: RwLock<LevelSchedule>,
    context: RwLock<Option<GameContext>>,
    role: watch::Sender<ClockRole>,
    degraded: watch::Sender<bool>,
    ticker: Mutex<Option<TickerGuard>>,
    sound: Arc<dyn SoundEngine>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts degraded (no snapshot store installed), paused,
    /// with an empty schedule and the operator window as master.
    pub fn new(config: AppConfig, sound: Arc<dyn SoundEngine>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        let (role_tx, _rx) = watch::channel(ClockRole::Master);
        let sound_enabled = config.sound_enabled_default();
        let sse = SseState::new(config.clock_sse_capacity(), config.controller_sse_capacity());
        Arc::new(Self {
            config,
            snapshot_store: RwLock::new(None),
            sse,
            clock: RwLock::new(BlindClock::new(sound_enabled)),
            alerts: Mutex::new(AlertEngine::new()),
            schedule: RwLock::new(LevelSchedule::empty()),
            context: RwLock::new(None),
            role: role_tx,
            degraded: degraded_tx,
            ticker: Mutex::new(None),
            sound,
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current snapshot store, if one is installed.
    pub async fn snapshot_store(&self) -> Option<Arc<dyn SnapshotStore>> {
        let guard = self.snapshot_store.read().await;
        guard.as_ref().cloned()
    }

    /// Install a snapshot store implementation and leave degraded mode.
    pub async fn install_snapshot_store(&self, store: Arc<dyn SnapshotStore>) {
        {
            let mut guard = self.snapshot_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current snapshot store and enter degraded mode.
    pub async fn clear_snapshot_store(&self) {
        {
            let mut guard = self.snapshot_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Whether the service currently runs without durable storage.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.snapshot_store.read().await;
        guard.is_none()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub(crate) fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            let changed = *current != value;
            *current = value;
            changed
        });
    }

    /// Broadcast hub fanning clock state out to every connected window.
    pub fn clock_sse(&self) -> &SseHub {
        self.sse.clock()
    }

    /// Broadcast hub used for controller-only events.
    pub fn controller_sse(&self) -> &SseHub {
        self.sse.controller().hub()
    }

    /// Token guard that ensures a single master controller at a time.
    pub fn controller_token(&self) -> &Mutex<Option<String>> {
        self.sse.controller().token()
    }

    /// Slot tracking the attached spectator display stream.
    pub fn display_slot(&self) -> &DisplaySlot {
        self.sse.display()
    }

    /// The operator window's current role.
    pub fn role(&self) -> ClockRole {
        *self.role.borrow()
    }

    /// Subscribe to role changes.
    pub fn role_watcher(&self) -> watch::Receiver<ClockRole> {
        self.role.subscribe()
    }

    /// Publish a new role, returning whether it changed.
    pub(crate) fn set_role(&self, role: ClockRole) -> bool {
        self.role.send_if_modified(|current| {
            let changed = *current != role;
            *current = role;
            changed
        })
    }

    /// The blind clock state machine.
    pub fn clock(&self) -> &RwLock<BlindClock> {
        &self.clock
    }

    /// Threshold memory for the alert engine.
    pub fn alerts(&self) -> &Mutex<AlertEngine> {
        &self.alerts
    }

    /// The installed level schedule (empty until a season is configured).
    pub fn schedule(&self) -> &RwLock<LevelSchedule> {
        &self.schedule
    }

    /// Season/game scoping for persistence, when configured.
    pub fn context(&self) -> &RwLock<Option<GameContext>> {
        &self.context
    }

    /// Slot owning the single active ticker resource.
    ///
    /// Replacing or taking the guard aborts the previous interval task, which
    /// is what makes `start()` idempotent and `pause()` leak-free.
    pub fn ticker(&self) -> &Mutex<Option<TickerGuard>> {
        &self.ticker
    }

    /// The audio engine producing synthesized cues.
    pub fn sound(&self) -> &Arc<dyn SoundEngine> {
        &self.sound
    }
}
