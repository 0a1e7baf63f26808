//! Snapshot persistence and crash recovery for the live clock.
//!
//! The primary slot is overwritten on every state change; the backup slot is
//! only written on demand, before risky operations. A stored snapshot is
//! applied to the live clock only when it passes three gates: same season,
//! same blind structure hash, and younger than the staleness window. Anything
//! else reads as "nothing to recover" rather than an error.

use std::{sync::Arc, time::Duration};

use tracing::{info, warn};

use crate::{
    dao::{
        models::PersistedClockEntity,
        snapshot_store::{SnapshotStore, file::unix_millis},
    },
    dto::{
        clock::{ActionResponse, VisibleClockPhase},
        recovery::{RecoveryReport, RestoreResponse, SnapshotInfo},
    },
    error::ServiceError,
    services::sse_events,
    state::{GameContext, SharedState},
};

/// Write the live clock into the primary snapshot slot.
pub async fn persist(state: &SharedState) -> Result<(), ServiceError> {
    let store = require_store(state).await?;
    let Some(entity) = scoped_entity(state).await else {
        // No schedule installed yet, so there is nothing worth scoping a
        // snapshot to.
        return Ok(());
    };
    store.save_primary(entity).await?;
    Ok(())
}

/// Persist the live clock without blocking the caller.
///
/// Degraded mode and storage failures are logged and swallowed: persistence
/// is always best-effort from the tick path's point of view.
pub fn persist_in_background(state: SharedState) {
    tokio::spawn(async move {
        match persist(&state).await {
            Ok(()) | Err(ServiceError::Degraded) => {}
            Err(err) => warn!(error = %err, "failed to persist clock snapshot"),
        }
    });
}

/// Diagnose whether the primary snapshot could be recovered right now.
pub async fn report(state: &SharedState) -> Result<RecoveryReport, ServiceError> {
    let store = require_store(state).await?;
    let stored = store.load_primary().await?;
    Ok(evaluate(state, stored.as_ref()).await)
}

/// Apply the primary snapshot to the live clock when it passes every gate.
pub async fn recover(state: &SharedState) -> Result<RestoreResponse, ServiceError> {
    let store = require_store(state).await?;
    let stored = store.load_primary().await?;
    apply_if_eligible(state, stored).await
}

/// Copy the primary snapshot into the backup slot.
pub async fn backup(state: &SharedState) -> Result<ActionResponse, ServiceError> {
    let store = require_store(state).await?;
    let Some(entity) = store.load_primary().await? else {
        return Err(ServiceError::NotFound(
            "no primary snapshot to back up".into(),
        ));
    };
    store.save_backup(entity).await?;
    Ok(ActionResponse::new("primary snapshot copied to backup"))
}

/// Apply the backup snapshot to the live clock when it passes every gate.
pub async fn restore_backup(state: &SharedState) -> Result<RestoreResponse, ServiceError> {
    let store = require_store(state).await?;
    let stored = store.load_backup().await?;
    apply_if_eligible(state, stored).await
}

/// Remove both snapshot slots.
pub async fn clear(state: &SharedState) -> Result<ActionResponse, ServiceError> {
    let store = require_store(state).await?;
    store.clear().await?;
    Ok(ActionResponse::new("stored snapshots cleared"))
}

/// Why a snapshot cannot be applied, or `Ok` when it can.
///
/// Kept pure so the gate logic is testable without a store or a runtime.
fn eligibility(
    entity: &PersistedClockEntity,
    context: &GameContext,
    schedule_hash: &str,
    staleness_window: Duration,
    now_ms: u64,
) -> Result<(), String> {
    if entity.season_id != context.season_id {
        return Err("snapshot belongs to a different season".into());
    }
    if entity.blind_levels_hash != schedule_hash {
        return Err("blind structure changed since the snapshot was taken".into());
    }
    let age_ms = now_ms.saturating_sub(entity.timestamp_ms);
    if age_ms > staleness_window.as_millis() as u64 {
        return Err("snapshot is older than the staleness window".into());
    }
    Ok(())
}

async fn apply_if_eligible(
    state: &SharedState,
    stored: Option<PersistedClockEntity>,
) -> Result<RestoreResponse, ServiceError> {
    let report = evaluate(state, stored.as_ref()).await;
    if !report.recoverable {
        return Ok(RestoreResponse {
            restored: false,
            message: report
                .reason
                .unwrap_or_else(|| "no snapshot stored".into()),
        });
    }

    // The gates only pass when a snapshot exists.
    let Some(entity) = stored else {
        return Ok(RestoreResponse {
            restored: false,
            message: "no snapshot stored".into(),
        });
    };

    apply(state, entity).await;
    Ok(RestoreResponse {
        restored: true,
        message: "clock state restored; the clock is paused".into(),
    })
}

/// Overwrite the live clock with a snapshot that already passed the gates.
pub(crate) async fn apply(state: &SharedState, entity: PersistedClockEntity) {
    {
        let schedule = state.schedule().read().await;
        let mut clock = state.clock().write().await;
        clock.restore(entity.state.into(), &schedule);
        state.alerts().lock().await.rearm();

        sse_events::broadcast_tick(state, &clock, &schedule);
        sse_events::broadcast_level_changed(state, clock.state().current_level_index, &schedule);
        sse_events::broadcast_phase_changed(
            state,
            VisibleClockPhase::derive(clock.state(), &schedule),
        );
    }
    // Recovery always lands paused; the ticker is never resumed implicitly.
    state.ticker().lock().await.take();
    info!("clock state recovered from snapshot");
}

async fn evaluate(state: &SharedState, stored: Option<&PersistedClockEntity>) -> RecoveryReport {
    let Some(entity) = stored else {
        return RecoveryReport {
            recoverable: false,
            reason: Some("no snapshot stored".into()),
            snapshot: None,
        };
    };
    let snapshot = Some(SnapshotInfo::from(entity));

    let Some(context) = *state.context().read().await else {
        return RecoveryReport {
            recoverable: false,
            reason: Some("no schedule installed".into()),
            snapshot,
        };
    };
    let schedule_hash = state.schedule().read().await.hash().to_string();

    match eligibility(
        entity,
        &context,
        &schedule_hash,
        state.config().staleness_window(),
        unix_millis(),
    ) {
        Ok(()) => RecoveryReport {
            recoverable: true,
            reason: None,
            snapshot,
        },
        Err(reason) => RecoveryReport {
            recoverable: false,
            reason: Some(reason),
            snapshot,
        },
    }
}

async fn scoped_entity(state: &SharedState) -> Option<PersistedClockEntity> {
    let context = (*state.context().read().await)?;
    let schedule_hash = state.schedule().read().await.hash().to_string();
    let clock_state = state.clock().read().await.state().clone();

    Some(PersistedClockEntity {
        state: clock_state.into(),
        timestamp_ms: unix_millis(),
        season_id: context.season_id,
        game_id: context.game_id,
        blind_levels_hash: schedule_hash,
    })
}

async fn require_store(state: &SharedState) -> Result<Arc<dyn SnapshotStore>, ServiceError> {
    state.snapshot_store().await.ok_or(ServiceError::Degraded)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use uuid::Uuid;

    use super::*;
    use crate::{
        audio::NullSoundEngine,
        config::AppConfig,
        dao::{models::ClockStateEntity, snapshot_store::file::FileSnapshotStore},
        state::{
            AppState,
            schedule::{BlindLevel, LevelSchedule},
        },
    };

    fn sample_entity(season_id: Uuid, hash: &str, timestamp_ms: u64) -> PersistedClockEntity {
        PersistedClockEntity {
            state: ClockStateEntity {
                is_running: true,
                current_level_index: 2,
                elapsed_in_level: 30,
                total_elapsed: 2430,
                sound_enabled: true,
            },
            timestamp_ms,
            season_id,
            game_id: None,
            blind_levels_hash: hash.to_string(),
        }
    }

    #[test]
    fn eligibility_gates_season_hash_and_age() {
        let season = Uuid::new_v4();
        let context = GameContext {
            season_id: season,
            game_id: None,
        };
        let window = Duration::from_secs(3_600);
        let now = 10_000_000;

        let fresh = sample_entity(season, "abc", now - 1_000);
        assert!(eligibility(&fresh, &context, "abc", window, now).is_ok());

        let other_season = sample_entity(Uuid::new_v4(), "abc", now - 1_000);
        assert!(eligibility(&other_season, &context, "abc", window, now).is_err());

        let other_hash = sample_entity(season, "def", now - 1_000);
        assert!(eligibility(&other_hash, &context, "abc", window, now).is_err());

        let stale = sample_entity(season, "abc", now - 3_600_001);
        assert!(eligibility(&stale, &context, "abc", window, now).is_err());

        let boundary = sample_entity(season, "abc", now - 3_600_000);
        assert!(eligibility(&boundary, &context, "abc", window, now).is_ok());
    }

    async fn state_with_store() -> SharedState {
        let state = AppState::new(AppConfig::default(), Arc::new(NullSoundEngine));
        let dir = std::env::temp_dir().join(format!("blind-clock-recovery-{}", Uuid::new_v4()));
        let store = FileSnapshotStore::open(dir).await.unwrap();
        state.install_snapshot_store(Arc::new(store)).await;
        state
    }

    async fn install_schedule(state: &SharedState, season_id: Uuid) {
        *state.schedule().write().await = LevelSchedule::new(vec![
            BlindLevel {
                level: 1,
                small_blind: 25,
                big_blind: 50,
                ante: 0,
                duration_minutes: 20,
                is_break: false,
            },
            BlindLevel {
                level: 2,
                small_blind: 50,
                big_blind: 100,
                ante: 100,
                duration_minutes: 20,
                is_break: false,
            },
        ]);
        *state.context().write().await = Some(GameContext {
            season_id,
            game_id: None,
        });
    }

    #[tokio::test]
    async fn persist_then_recover_round_trips_the_clock() {
        let state = state_with_store().await;
        install_schedule(&state, Uuid::new_v4()).await;

        {
            let schedule = state.schedule().read().await;
            let mut clock = state.clock().write().await;
            clock.mark_running();
            for _ in 0..90 {
                clock.tick(&schedule);
            }
        }
        persist(&state).await.unwrap();

        state.clock().write().await.reset();
        let response = recover(&state).await.unwrap();
        assert!(response.restored);

        let clock = state.clock().read().await;
        assert_eq!(clock.state().elapsed_in_level, 90);
        assert_eq!(clock.state().total_elapsed, 90);
        // Recovered state is always paused.
        assert!(!clock.state().is_running);
    }

    #[tokio::test]
    async fn recover_refuses_a_snapshot_from_another_structure() {
        let state = state_with_store().await;
        let season = Uuid::new_v4();
        install_schedule(&state, season).await;
        persist(&state).await.unwrap();

        // Editing the structure invalidates the stored snapshot.
        *state.schedule().write().await = LevelSchedule::new(vec![BlindLevel {
            level: 1,
            small_blind: 100,
            big_blind: 200,
            ante: 0,
            duration_minutes: 15,
            is_break: false,
        }]);

        let report = report(&state).await.unwrap();
        assert!(!report.recoverable);

        let response = recover(&state).await.unwrap();
        assert!(!response.restored);
    }

    #[tokio::test]
    async fn backup_and_restore_use_the_secondary_slot() {
        let state = state_with_store().await;
        install_schedule(&state, Uuid::new_v4()).await;

        {
            let schedule = state.schedule().read().await;
            let mut clock = state.clock().write().await;
            clock.mark_running();
            for _ in 0..10 {
                clock.tick(&schedule);
            }
        }
        persist(&state).await.unwrap();
        backup(&state).await.unwrap();

        // The live clock moves on; the backup keeps the earlier position.
        {
            let schedule = state.schedule().read().await;
            let mut clock = state.clock().write().await;
            for _ in 0..50 {
                clock.tick(&schedule);
            }
        }
        persist(&state).await.unwrap();

        let response = restore_backup(&state).await.unwrap();
        assert!(response.restored);
        assert_eq!(state.clock().read().await.state().elapsed_in_level, 10);
        // Total elapsed never moves backwards, even across a restore.
        assert_eq!(state.clock().read().await.state().total_elapsed, 60);
    }

    #[tokio::test]
    async fn operations_fail_cleanly_in_degraded_mode() {
        let state = AppState::new(AppConfig::default(), Arc::new(NullSoundEngine));
        assert!(matches!(
            recover(&state).await,
            Err(ServiceError::Degraded)
        ));
        assert!(matches!(report(&state).await, Err(ServiceError::Degraded)));
    }
}
