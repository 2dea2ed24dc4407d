use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::Kind;
use crate::types::{Amount, RecordId};

/// One persisted financial transaction.
///
/// Records are plain values: an edit produces a new `Record` carrying the same
/// `id`, and the store replaces the old value wholesale. The field order here is
/// also the column order of the CSV journal.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Assigned by the store on insert and never changed afterwards.
    pub id: RecordId,
    /// Device-local wall-clock time of the transaction.
    pub timestamp: NaiveDateTime,
    pub description: String,
    pub amount: Amount,
    pub kind: Kind
}

impl Record {
    pub fn with_edits(&self, description: String, amount: Amount) -> Self {
        Self {
            description,
            amount,
            ..self.clone()
        }
    }
}

/// A validated record that has not been assigned an id yet.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct NewRecord {
    pub timestamp: NaiveDateTime,
    pub description: String,
    pub amount: Amount,
    pub kind: Kind
}

impl NewRecord {
    pub fn into_record(self, id: RecordId) -> Record {
        Record {
            id,
            timestamp: self.timestamp,
            description: self.description,
            amount: self.amount,
            kind: self.kind
        }
    }
}

/// Raw, unvalidated form input for a new record.
#[derive(Debug, Clone)]
pub struct RecordDraft {
    pub description: String,
    pub amount: String,
    pub kind: Kind,
    pub timestamp: NaiveDateTime
}
