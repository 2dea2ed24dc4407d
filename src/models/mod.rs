mod errors;
mod filter;
mod record;

use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use errors::{StoreError, ValidationError};
pub use filter::{AmountCondition, AmountOperator, FilterSpec, SortSpec};
pub use record::{NewRecord, Record, RecordDraft};

/// Which aggregate bucket a record contributes to.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Credit,
    Debit
}

impl Display for Kind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Credit => write!(formatter, "credit"),
            Kind::Debit => write!(formatter, "debit")
        }
    }
}

impl FromStr for Kind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "credit" => Ok(Kind::Credit),
            "debit" => Ok(Kind::Debit),
            other => Err(ValidationError::InvalidKind(other.to_string()))
        }
    }
}
