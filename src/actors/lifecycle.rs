use std::mem;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::models::{NewRecord, Record, RecordDraft, StoreError, ValidationError};
use crate::storage::RecordStore;
use crate::types::{Amount, RecordId};

/// One-shot notifications for the presentation layer.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum LifecycleEvent {
    Added(RecordId),
    Updated(RecordId),
    Deleted(RecordId),
    /// A user-facing message describing why an action did not happen.
    Failed(String)
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError)
}

/// Validates create/update/delete intents and applies them to the store.
///
/// Outcomes are returned to the caller and also queued as [`LifecycleEvent`]s
/// on a channel with a single receiver, see [`take_events`](Self::take_events).
/// The store's own change notification is what refreshes any screen; nothing
/// here touches a derived view.
pub struct LifecycleCoordinator<S: RecordStore> {
    store: Arc<S>,
    pending_delete: Vec<Record>,
    events: mpsc::UnboundedSender<LifecycleEvent>,
    receiver: Option<mpsc::UnboundedReceiver<LifecycleEvent>>
}

impl<S: RecordStore> LifecycleCoordinator<S> {
    pub fn new(store: Arc<S>) -> Self {
        let (events, receiver) = mpsc::unbounded_channel();

        Self {
            store,
            pending_delete: Vec::new(),
            events,
            receiver: Some(receiver)
        }
    }

    /// Hands out the event receiver. Only the first call gets it.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<LifecycleEvent>> {
        self.receiver.take()
    }

    pub async fn create(&self, draft: RecordDraft) -> Result<RecordId, LifecycleError> {
        let (description, amount) = validate(&draft.description, &draft.amount)
            .map_err(|error| self.fail(error.into()))?;

        let record = NewRecord {
            timestamp: draft.timestamp,
            description,
            amount,
            kind: draft.kind
        };

        let id = self.store.insert(record).await
            .map_err(|error| self.fail(error.into()))?;

        self.emit(LifecycleEvent::Added(id));

        Ok(id)
    }

    /// Replaces the description and amount of `record`, keeping its id, kind and timestamp.
    pub async fn update(&self, record: &Record, description: &str, amount: &str) -> Result<(), LifecycleError> {
        let (description, amount) = validate(description, amount)
            .map_err(|error| self.fail(error.into()))?;

        self.store.update(record.with_edits(description, amount)).await
            .map_err(|error| self.fail(error.into()))?;

        self.emit(LifecycleEvent::Updated(record.id));

        Ok(())
    }

    /// Marks `record` for deletion. Nothing reaches the store until [`confirm_delete`](Self::confirm_delete).
    pub fn request_delete(&mut self, record: Record) {
        self.request_bulk_delete(vec![record]);
    }

    /// Marks several records for deletion at once, replacing any earlier request.
    pub fn request_bulk_delete(&mut self, records: Vec<Record>) {
        if !self.pending_delete.is_empty() {
            debug!("Replacing [{}] records pending deletion", self.pending_delete.len());
        }

        self.pending_delete = records;
    }

    pub fn pending_delete(&self) -> &[Record] {
        &self.pending_delete
    }

    /// Drops the pending request without touching the store and returns what was pending.
    pub fn cancel_delete(&mut self) -> Vec<Record> {
        mem::take(&mut self.pending_delete)
    }

    /// Deletes every pending record and clears the request.
    ///
    /// Stops at the first store failure; the request is cleared either way and
    /// has to be made again.
    pub async fn confirm_delete(&mut self) -> Result<Vec<RecordId>, LifecycleError> {
        let pending = mem::take(&mut self.pending_delete);
        let mut deleted = Vec::with_capacity(pending.len());

        for record in &pending {
            self.store.delete(record).await
                .map_err(|error| self.fail(error.into()))?;

            self.emit(LifecycleEvent::Deleted(record.id));
            deleted.push(record.id);
        }

        Ok(deleted)
    }

    fn emit(&self, event: LifecycleEvent) {
        if self.events.send(event).is_err() {
            debug!("Lifecycle event dropped, the listener is gone");
        }
    }

    fn fail(&self, error: LifecycleError) -> LifecycleError {
        match &error {
            LifecycleError::Validation(validation) => debug!("Rejected record input: {validation}"),
            LifecycleError::Store(store) => warn!("{store}")
        }

        self.emit(LifecycleEvent::Failed(error.to_string()));
        error
    }
}

fn validate(description: &str, amount: &str) -> Result<(String, Amount), ValidationError> {
    let description = description.trim();

    if description.is_empty() {
        return Err(ValidationError::EmptyDescription);
    }

    let amount = Amount::from_str(amount).map_err(|_| ValidationError::InvalidAmount)?;

    Ok((description.to_string(), amount))
}
