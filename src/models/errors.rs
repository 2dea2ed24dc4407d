use thiserror::Error;

use crate::types::RecordId;

/// Rejections raised before the store is contacted. These are user mistakes,
/// not system faults.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ValidationError {
    #[error("Description is required")]
    EmptyDescription,
    #[error("Enter a valid amount")]
    InvalidAmount,
    #[error("Unknown record kind [{0}]")]
    InvalidKind(String),
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
    #[error("Invalid sort option [{0}]")]
    InvalidSort(String)
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record [{0}] was not found")]
    NotFound(RecordId),
    #[error("Store I/O failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("Store journal failure: {0}")]
    Journal(#[from] csv::Error),
    #[error("Store worker failure: {0}")]
    Worker(String)
}
