mod journal;
mod memory_store;
mod subscription;

use std::future::Future;
use std::sync::Arc;

use crate::models::{Kind, NewRecord, Record, StoreError};
use crate::types::RecordId;

pub use memory_store::MemoryStore;
pub use subscription::{KindTotalSubscription, SnapshotSubscription};

/// The full record list, ordered by timestamp descending.
pub type Snapshot = Arc<[Record]>;

/// Durable record storage with change notification.
///
/// Every successful mutation publishes a fresh [`Snapshot`] to all
/// subscriptions after the mutation has completed.
pub trait RecordStore: Send + Sync + 'static {
    fn insert(&self, record: NewRecord) -> impl Future<Output = Result<RecordId, StoreError>> + Send;

    /// Replaces the record with the same id, failing with [`StoreError::NotFound`] if there is none.
    fn update(&self, record: Record) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Removes the record with the same id. Deleting an absent record succeeds.
    fn delete(&self, record: &Record) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn get(&self, id: RecordId) -> Option<Record>;

    fn snapshot(&self) -> Snapshot;

    fn observe_all(&self) -> SnapshotSubscription;

    fn total_by_kind(&self, kind: Kind) -> KindTotalSubscription {
        KindTotalSubscription::new(self.observe_all(), kind)
    }
}
