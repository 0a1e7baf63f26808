pub mod file;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::models::PersistedClockEntity;
use crate::dao::storage::StorageResult;

/// Abstraction over the durable key-value store holding clock snapshots.
///
/// Snapshots live under two fixed well-known keys: the primary slot written on
/// every state change (latest wins, not a log) and a backup slot copied from
/// the primary before risky operations. A third small record tracks the most
/// recently played game for the display URL fallback.
pub trait SnapshotStore: Send + Sync {
    /// Overwrite the primary snapshot slot.
    fn save_primary(&self, snapshot: PersistedClockEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Read the primary snapshot slot; `None` when absent or unreadable.
    fn load_primary(&self) -> BoxFuture<'static, StorageResult<Option<PersistedClockEntity>>>;
    /// Overwrite the backup snapshot slot.
    fn save_backup(&self, snapshot: PersistedClockEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Read the backup snapshot slot; `None` when absent or unreadable.
    fn load_backup(&self) -> BoxFuture<'static, StorageResult<Option<PersistedClockEntity>>>;
    /// Remove both snapshot slots unconditionally.
    fn clear(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Record the most recently played game.
    fn record_last_game(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<()>>;
    /// Most recently played game, if any was recorded.
    fn last_game(&self) -> BoxFuture<'static, StorageResult<Option<Uuid>>>;
    /// Verify the backing medium is usable.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
