use std::cmp::Ordering;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{Kind, Record, ValidationError};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AmountOperator {
    Equal,
    GreaterThan,
    LessThan
}

impl AmountOperator {
    fn holds(self, ordering: Ordering) -> bool {
        match self {
            AmountOperator::Equal => ordering == Ordering::Equal,
            AmountOperator::GreaterThan => ordering == Ordering::Greater,
            AmountOperator::LessThan => ordering == Ordering::Less
        }
    }
}

/// An operator always paired with its comparison value, so a condition
/// without a value cannot be built.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct AmountCondition {
    pub operator: AmountOperator,
    pub value: Decimal
}

impl AmountCondition {
    pub fn new(operator: AmountOperator, value: Decimal) -> Self {
        Self { operator, value }
    }
}

/// Declarative predicate selecting a subset of records.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub enum FilterSpec {
    /// Inclusive calendar-date bounds; a missing bound is open on that side.
    DateRange {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>
    },
    Amount(AmountCondition),
    Kind(Kind),
    /// Case-insensitive substring match on the description.
    Description(String),
    /// Every inner filter must pass.
    All(Vec<FilterSpec>),
    #[default]
    None
}

impl FilterSpec {
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            FilterSpec::DateRange { from, to } => {
                let date = record.timestamp.date();
                from.is_none_or(|from| date >= from) && to.is_none_or(|to| date <= to)
            }
            FilterSpec::Amount(condition) => {
                condition.operator.holds(record.amount.value().cmp(&condition.value))
            }
            FilterSpec::Kind(kind) => record.kind == *kind,
            FilterSpec::Description(needle) => {
                record.description.to_lowercase().contains(&needle.to_lowercase())
            }
            FilterSpec::All(filters) => filters.iter().all(|filter| filter.matches(record)),
            FilterSpec::None => true
        }
    }

    fn parse_single(value: &str) -> Result<Self, ValidationError> {
        let value = value.trim();

        if value.is_empty() || value.eq_ignore_ascii_case("none") {
            return Ok(FilterSpec::None);
        }

        let Some((key, argument)) = value.split_once(':') else {
            return Err(ValidationError::InvalidFilter(format!("Missing ':' in [{value}]")));
        };

        match key.trim().to_lowercase().as_str() {
            "date" => parse_date_range(argument),
            "amount" => parse_amount_condition(argument).map(FilterSpec::Amount),
            "kind" => Ok(FilterSpec::Kind(argument.parse()?)),
            "text" => Ok(FilterSpec::Description(argument.trim().to_string())),
            other => Err(ValidationError::InvalidFilter(format!("Unknown filter [{other}]")))
        }
    }
}

impl FromStr for FilterSpec {
    type Err = ValidationError;

    /// Parses `none`, `date:FROM..TO`, `amount:>25.50`, `kind:credit`,
    /// `text:coffee`, or several of those joined with `&`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut filters = value.split('&')
            .map(FilterSpec::parse_single)
            .collect::<Result<Vec<_>, _>>()?;

        if filters.len() == 1 {
            return Ok(filters.remove(0));
        }

        Ok(FilterSpec::All(filters))
    }
}

fn parse_date_range(argument: &str) -> Result<FilterSpec, ValidationError> {
    let Some((from, to)) = argument.split_once("..") else {
        return Err(ValidationError::InvalidFilter(format!("Date range [{argument}] must look like FROM..TO")));
    };

    Ok(FilterSpec::DateRange {
        from: parse_optional_date(from)?,
        to: parse_optional_date(to)?
    })
}

fn parse_optional_date(value: &str) -> Result<Option<NaiveDate>, ValidationError> {
    let value = value.trim();

    if value.is_empty() {
        return Ok(None);
    }

    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map(Some)
        .map_err(|error| ValidationError::InvalidFilter(format!("Invalid date [{value}]: {error}")))
}

fn parse_amount_condition(argument: &str) -> Result<AmountCondition, ValidationError> {
    let argument = argument.trim();
    let mut chars = argument.chars();

    let operator = match chars.next() {
        Some('=') => AmountOperator::Equal,
        Some('>') => AmountOperator::GreaterThan,
        Some('<') => AmountOperator::LessThan,
        _ => return Err(ValidationError::InvalidFilter(format!("Amount condition [{argument}] must start with =, > or <")))
    };

    let raw_value = chars.as_str().trim();

    if raw_value.is_empty() {
        return Err(ValidationError::InvalidFilter("Amount condition requires a value".to_string()));
    }

    let value = Decimal::from_str(raw_value)
        .map_err(|error| ValidationError::InvalidFilter(format!("Invalid amount [{raw_value}]: {error}")))?;

    Ok(AmountCondition::new(operator, value))
}

/// Ordering applied to the filtered records.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum SortSpec {
    DateAscending,
    DateDescending,
    AmountAscending,
    AmountDescending,
    #[default]
    Unsorted
}

impl FromStr for SortSpec {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase().replace(' ', "-");

        match normalized.as_str() {
            "date-asc" | "date-ascending" => Ok(SortSpec::DateAscending),
            "date-desc" | "date-descending" => Ok(SortSpec::DateDescending),
            "amount-asc" | "amount-ascending" => Ok(SortSpec::AmountAscending),
            "amount-desc" | "amount-descending" => Ok(SortSpec::AmountDescending),
            "unsorted" | "none" | "" => Ok(SortSpec::Unsorted),
            _ => Err(ValidationError::InvalidSort(value.to_string()))
        }
    }
}
