use uuid::Uuid;

use crate::error::StoreResult;
use crate::models::CompletionEvent;
use crate::timeline::SnapshotRecord;

pub trait CompletionLog {
    /// Stores every event or none of them.
    async fn append_all(&self, events: &[CompletionEvent]) -> StoreResult<()>;

    async fn history(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<CompletionEvent>>;
}

pub trait SnapshotLog {
    async fn append_snapshot(&self, record: &SnapshotRecord) -> StoreResult<()>;

    async fn recent_snapshots(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<SnapshotRecord>>;
}
