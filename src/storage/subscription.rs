use rust_decimal::Decimal;
use tokio::sync::watch;

use crate::engine::AggregateTotals;
use crate::models::Kind;
use crate::storage::Snapshot;

/// A live view of the store's snapshots.
///
/// Dropping the subscription stops it; once the store itself is gone
/// [`changed`](SnapshotSubscription::changed) returns `None`.
pub struct SnapshotSubscription {
    receiver: watch::Receiver<Snapshot>
}

impl SnapshotSubscription {
    pub fn new(receiver: watch::Receiver<Snapshot>) -> Self {
        Self { receiver }
    }

    /// The latest snapshot, marking it as seen.
    pub fn current(&mut self) -> Snapshot {
        self.receiver.borrow_and_update().clone()
    }

    /// Whether a snapshot newer than the last one seen is waiting.
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    /// Waits for a snapshot newer than the last one seen.
    pub async fn changed(&mut self) -> Option<Snapshot> {
        self.receiver.changed().await.ok()?;
        Some(self.current())
    }
}

/// Running sum of one [`Kind`] over the whole store.
pub struct KindTotalSubscription {
    snapshots: SnapshotSubscription,
    kind: Kind
}

impl KindTotalSubscription {
    pub fn new(snapshots: SnapshotSubscription, kind: Kind) -> Self {
        Self { snapshots, kind }
    }

    pub fn current(&mut self) -> Decimal {
        let snapshot = self.snapshots.current();
        AggregateTotals::from_records(snapshot.iter()).total(self.kind)
    }

    pub async fn changed(&mut self) -> Option<Decimal> {
        let snapshot = self.snapshots.changed().await?;
        Some(AggregateTotals::from_records(snapshot.iter()).total(self.kind))
    }
}
