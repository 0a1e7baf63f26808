//! JSON-file snapshot store: one file per well-known key inside a data directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use futures::{FutureExt, future::BoxFuture};
use serde::{Serialize, de::DeserializeOwned};
use tokio::fs;
use tracing::warn;
use uuid::Uuid;

use crate::dao::{
    models::{LastGameEntity, PersistedClockEntity},
    snapshot_store::SnapshotStore,
    storage::{StorageError, StorageResult},
};

const PRIMARY_FILE: &str = "clock_state.json";
const BACKUP_FILE: &str = "clock_state.backup.json";
const LAST_GAME_FILE: &str = "last_game.json";
const PROBE_FILE: &str = ".probe";

/// Snapshot store backed by JSON files in a local data directory.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// Open (and create if needed) the data directory.
    pub async fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await.map_err(|source| {
            StorageError::unavailable(
                format!("cannot create data directory {}", dir.display()),
                source,
            )
        })?;
        Ok(Self { dir })
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

/// Read and parse a JSON key file.
///
/// A missing file and a corrupted payload both read as `None` (the latter with
/// a warning); only genuine I/O failures become storage errors.
async fn read_key<T: DeserializeOwned>(path: &Path) -> StorageResult<Option<T>> {
    let text = match fs::read_to_string(path).await {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StorageError::unavailable(
                format!("failed reading {}", path.display()),
                source,
            ));
        }
    };

    match serde_json::from_str::<T>(&text) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "discarding corrupted snapshot file");
            Ok(None)
        }
    }
}

async fn write_key<T: Serialize>(path: &Path, value: &T) -> StorageResult<()> {
    let payload = serde_json::to_string_pretty(value).map_err(|source| {
        StorageError::unavailable(format!("failed serializing {}", path.display()), source)
    })?;
    fs::write(path, payload).await.map_err(|source| {
        StorageError::unavailable(format!("failed writing {}", path.display()), source)
    })
}

async fn remove_key(path: &Path) -> StorageResult<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(StorageError::unavailable(
            format!("failed removing {}", path.display()),
            source,
        )),
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn save_primary(&self, snapshot: PersistedClockEntity) -> BoxFuture<'static, StorageResult<()>> {
        let path = self.path(PRIMARY_FILE);
        async move { write_key(&path, &snapshot).await }.boxed()
    }

    fn load_primary(&self) -> BoxFuture<'static, StorageResult<Option<PersistedClockEntity>>> {
        let path = self.path(PRIMARY_FILE);
        async move { read_key(&path).await }.boxed()
    }

    fn save_backup(&self, snapshot: PersistedClockEntity) -> BoxFuture<'static, StorageResult<()>> {
        let path = self.path(BACKUP_FILE);
        async move { write_key(&path, &snapshot).await }.boxed()
    }

    fn load_backup(&self) -> BoxFuture<'static, StorageResult<Option<PersistedClockEntity>>> {
        let path = self.path(BACKUP_FILE);
        async move { read_key(&path).await }.boxed()
    }

    fn clear(&self) -> BoxFuture<'static, StorageResult<()>> {
        let primary = self.path(PRIMARY_FILE);
        let backup = self.path(BACKUP_FILE);
        async move {
            remove_key(&primary).await?;
            remove_key(&backup).await
        }
        .boxed()
    }

    fn record_last_game(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<()>> {
        let path = self.path(LAST_GAME_FILE);
        async move {
            let record = LastGameEntity {
                game_id,
                updated_ms: unix_millis(),
            };
            write_key(&path, &record).await
        }
        .boxed()
    }

    fn last_game(&self) -> BoxFuture<'static, StorageResult<Option<Uuid>>> {
        let path = self.path(LAST_GAME_FILE);
        async move {
            Ok(read_key::<LastGameEntity>(&path)
                .await?
                .map(|record| record.game_id))
        }
        .boxed()
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let path = self.path(PROBE_FILE);
        async move {
            fs::write(&path, b"ok").await.map_err(|source| {
                StorageError::unavailable(
                    format!("data directory not writable ({})", path.display()),
                    source,
                )
            })?;
            remove_key(&path).await
        }
        .boxed()
    }
}

/// Current wall-clock time as Unix epoch milliseconds.
pub fn unix_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::ClockStateEntity;

    fn temp_store_dir() -> PathBuf {
        std::env::temp_dir().join(format!("blind-clock-store-{}", Uuid::new_v4()))
    }

    fn sample_snapshot() -> PersistedClockEntity {
        PersistedClockEntity {
            state: ClockStateEntity {
                is_running: true,
                current_level_index: 2,
                elapsed_in_level: 130,
                total_elapsed: 2530,
                sound_enabled: true,
            },
            timestamp_ms: unix_millis(),
            season_id: Uuid::new_v4(),
            game_id: Some(Uuid::new_v4()),
            blind_levels_hash: "abc123".into(),
        }
    }

    #[tokio::test]
    async fn primary_round_trips() {
        let store = FileSnapshotStore::open(temp_store_dir()).await.unwrap();
        let snapshot = sample_snapshot();

        store.save_primary(snapshot.clone()).await.unwrap();
        assert_eq!(store.load_primary().await.unwrap(), Some(snapshot));
    }

    #[tokio::test]
    async fn missing_keys_read_as_none() {
        let store = FileSnapshotStore::open(temp_store_dir()).await.unwrap();
        assert_eq!(store.load_primary().await.unwrap(), None);
        assert_eq!(store.load_backup().await.unwrap(), None);
        assert_eq!(store.last_game().await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupted_payload_reads_as_none() {
        let dir = temp_store_dir();
        let store = FileSnapshotStore::open(dir.clone()).await.unwrap();
        fs::write(dir.join(PRIMARY_FILE), b"{ not json").await.unwrap();

        assert_eq!(store.load_primary().await.unwrap(), None);
    }

    #[tokio::test]
    async fn clear_removes_both_slots() {
        let store = FileSnapshotStore::open(temp_store_dir()).await.unwrap();
        let snapshot = sample_snapshot();
        store.save_primary(snapshot.clone()).await.unwrap();
        store.save_backup(snapshot).await.unwrap();

        store.clear().await.unwrap();

        assert_eq!(store.load_primary().await.unwrap(), None);
        assert_eq!(store.load_backup().await.unwrap(), None);
    }

    #[tokio::test]
    async fn last_game_round_trips() {
        let store = FileSnapshotStore::open(temp_store_dir()).await.unwrap();
        let game = Uuid::new_v4();

        store.record_last_game(game).await.unwrap();
        assert_eq!(store.last_game().await.unwrap(), Some(game));
    }

    #[tokio::test]
    async fn health_check_probes_the_directory() {
        let store = FileSnapshotStore::open(temp_store_dir()).await.unwrap();
        store.health_check().await.unwrap();
    }
}
