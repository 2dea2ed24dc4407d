use std::cmp::Ordering;

use rust_decimal::Decimal;
use tracing::error;

use crate::models::{FilterSpec, Kind, Record, SortSpec};

/// Sums over a set of records, split by [`Kind`].
///
/// A sum that would leave the range of [`Decimal`] stops at `Decimal::MAX`
/// and sets `overflowed` instead of panicking.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub struct AggregateTotals {
    pub total_credit: Decimal,
    pub total_debit: Decimal,
    pub balance: Decimal,
    pub overflowed: bool
}

impl AggregateTotals {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a Record>) -> Self {
        let mut totals = Self::default();

        for record in records {
            let bucket = match record.kind {
                Kind::Credit => &mut totals.total_credit,
                Kind::Debit => &mut totals.total_debit
            };

            match bucket.checked_add(record.amount.value()) {
                Some(sum) => *bucket = sum,
                None => {
                    error!("Total for [{}] overflowed at record [{}], saturating", record.kind, record.id);
                    *bucket = Decimal::MAX;
                    totals.overflowed = true;
                }
            }
        }

        //NOTE: Both totals lie in [0, Decimal::MAX], so the difference always fits
        totals.balance = totals.total_credit - totals.total_debit;

        totals
    }

    pub fn total(&self, kind: Kind) -> Decimal {
        match kind {
            Kind::Credit => self.total_credit,
            Kind::Debit => self.total_debit
        }
    }
}

/// The filtered, sorted records together with the totals over exactly those records.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct DerivedView {
    pub records: Vec<Record>,
    pub totals: AggregateTotals
}

/// Filters, sorts and totals `records` without touching the source slice.
///
/// `records` is expected in store emission order. Sorting is stable, so equal
/// keys keep that order in both the ascending and the descending direction.
/// Totals are taken over the filtered view, never the full set.
pub fn apply(records: &[Record], filter: &FilterSpec, sort: SortSpec) -> DerivedView {
    let mut view: Vec<Record> = records.iter()
        .filter(|record| filter.matches(record))
        .cloned()
        .collect();

    if let Some(compare) = comparator(sort) {
        view.sort_by(compare);
    }

    let totals = AggregateTotals::from_records(&view);

    DerivedView {
        records: view,
        totals
    }
}

type Comparator = fn(&Record, &Record) -> Ordering;

fn comparator(sort: SortSpec) -> Option<Comparator> {
    match sort {
        SortSpec::DateAscending => Some(date_ascending),
        SortSpec::DateDescending => Some(date_descending),
        SortSpec::AmountAscending => Some(amount_ascending),
        SortSpec::AmountDescending => Some(amount_descending),
        SortSpec::Unsorted => None
    }
}

fn date_ascending(a: &Record, b: &Record) -> Ordering {
    a.timestamp.date().cmp(&b.timestamp.date())
}

//NOTE: Descending orders swap the operands instead of reversing an ascending sort, reversing would also flip ties
fn date_descending(a: &Record, b: &Record) -> Ordering {
    date_ascending(b, a)
}

fn amount_ascending(a: &Record, b: &Record) -> Ordering {
    a.amount.cmp(&b.amount)
}

fn amount_descending(a: &Record, b: &Record) -> Ordering {
    amount_ascending(b, a)
}
