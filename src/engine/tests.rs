use super::{apply, default_catalog, suggest, AggregateTotals, Suggester};

use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use tokio::time::{advance, sleep};

use crate::models::{AmountCondition, AmountOperator, FilterSpec, Kind, Record, SortSpec};
use crate::types::{Amount, RecordId};

fn create_record(id: RecordId, timestamp: &str, amount: &str, kind: Kind) -> Result<Record> {
    Ok(Record {
        id,
        timestamp: NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S")?,
        description: format!("record {id}"),
        amount: Amount::from_str(amount)?,
        kind
    })
}

fn ids(records: &[Record]) -> Vec<RecordId> {
    records.iter().map(|record| record.id).collect()
}

/// Emission order of the store: newest first.
fn sample_records() -> Result<Vec<Record>> {
    Ok(vec![
        create_record(4, "2024-02-01T09:00:00", "40.00", Kind::Debit)?,
        create_record(3, "2024-01-15T18:00:00", "25.50", Kind::Credit)?,
        create_record(2, "2024-01-15T08:00:00", "25.50", Kind::Debit)?,
        create_record(1, "2024-01-01T12:00:00", "10.00", Kind::Credit)?,
    ])
}

#[test]
fn test_no_filter_unsorted_returns_records_in_emission_order() -> Result<()> {
    let records = sample_records()?;
    let view = apply(&records, &FilterSpec::None, SortSpec::Unsorted);

    assert_eq!(view.records, records);
    assert_eq!(view.totals.total_credit, Decimal::from_str("35.50")?);
    assert_eq!(view.totals.total_debit, Decimal::from_str("65.50")?);
    assert_eq!(view.totals.balance, Decimal::from_str("-30")?);

    Ok(())
}

#[test]
fn test_empty_input_yields_empty_view_and_zero_totals() {
    let view = apply(&[], &FilterSpec::None, SortSpec::AmountDescending);

    assert!(view.records.is_empty());
    assert_eq!(view.totals, AggregateTotals::default());
}

#[test]
fn test_date_range_filter_is_inclusive_on_both_ends() -> Result<()> {
    let records = vec![
        create_record(3, "2024-02-01T10:00:00", "1", Kind::Debit)?,
        create_record(2, "2024-01-15T10:00:00", "1", Kind::Debit)?,
        create_record(1, "2024-01-01T10:00:00", "1", Kind::Debit)?,
    ];
    let filter = FilterSpec::DateRange {
        from: Some(NaiveDate::from_ymd_opt(2024, 1, 1).ok_or_else(|| anyhow::anyhow!("bad date"))?),
        to: Some(NaiveDate::from_ymd_opt(2024, 1, 15).ok_or_else(|| anyhow::anyhow!("bad date"))?)
    };

    let view = apply(&records, &filter, SortSpec::Unsorted);

    assert_eq!(ids(&view.records), vec![2, 1]);

    Ok(())
}

#[test]
fn test_amount_conditions_select_exact_matches() -> Result<()> {
    let records = sample_records()?;
    let value = Decimal::from_str("25.50")?;

    let greater = apply(&records, &FilterSpec::Amount(AmountCondition::new(AmountOperator::GreaterThan, value)), SortSpec::Unsorted);
    let equal = apply(&records, &FilterSpec::Amount(AmountCondition::new(AmountOperator::Equal, value)), SortSpec::Unsorted);
    let less = apply(&records, &FilterSpec::Amount(AmountCondition::new(AmountOperator::LessThan, value)), SortSpec::Unsorted);

    assert_eq!(ids(&greater.records), vec![4]);
    assert_eq!(ids(&equal.records), vec![3, 2]);
    assert_eq!(ids(&less.records), vec![1]);

    Ok(())
}

#[test]
fn test_totals_cover_only_the_filtered_view() -> Result<()> {
    let records = sample_records()?;
    let view = apply(&records, &FilterSpec::Kind(Kind::Credit), SortSpec::Unsorted);

    assert_eq!(view.totals.total_credit, Decimal::from_str("35.50")?);
    assert!(view.totals.total_debit.is_zero());
    assert_eq!(view.totals.balance, view.totals.total_credit - view.totals.total_debit);

    Ok(())
}

#[test]
fn test_amount_sorts_are_stable_in_both_directions() -> Result<()> {
    let records = sample_records()?;

    let ascending = apply(&records, &FilterSpec::None, SortSpec::AmountAscending);
    let descending = apply(&records, &FilterSpec::None, SortSpec::AmountDescending);

    // Records 3 and 2 share 25.50 and keep their emission order either way
    assert_eq!(ids(&ascending.records), vec![1, 3, 2, 4]);
    assert_eq!(ids(&descending.records), vec![4, 3, 2, 1]);

    Ok(())
}

#[test]
fn test_date_sorts_compare_calendar_dates_and_keep_ties_stable() -> Result<()> {
    let records = sample_records()?;

    let ascending = apply(&records, &FilterSpec::None, SortSpec::DateAscending);
    let descending = apply(&records, &FilterSpec::None, SortSpec::DateDescending);

    // Records 3 and 2 fall on the same day; the time of day does not reorder them
    assert_eq!(ids(&ascending.records), vec![1, 3, 2, 4]);
    assert_eq!(ids(&descending.records), vec![4, 3, 2, 1]);

    Ok(())
}

#[test]
fn test_filter_and_sort_combine_without_touching_the_source() -> Result<()> {
    let records = sample_records()?;
    let before = records.clone();

    let view = apply(&records, &FilterSpec::Kind(Kind::Debit), SortSpec::AmountAscending);

    assert_eq!(ids(&view.records), vec![2, 4]);
    assert_eq!(records, before);
    assert_eq!(apply(&records, &FilterSpec::Kind(Kind::Debit), SortSpec::AmountAscending), view);

    Ok(())
}

#[test]
fn test_suggest_requires_three_characters() {
    assert!(suggest(default_catalog(), "ca").is_empty());
    assert!(suggest(&["ab", "abc"], "ab").is_empty());
    assert!(suggest(default_catalog(), "").is_empty());
}

#[test]
fn test_suggest_matches_substrings_case_insensitively() {
    let suggestions = suggest(default_catalog(), "caf");

    assert_eq!(suggestions, vec!["Café / Coffee".to_string()]);
}

#[test]
fn test_suggest_ranks_prefix_matches_first_and_removes_duplicates() {
    let suggestions = suggest(default_catalog(), "ins");

    assert_eq!(suggestions, vec![
        "Home Insurance".to_string(),
        "Vehicle Insurance".to_string(),
        "Health Insurance".to_string(),
    ]);

    let gifts = suggest(default_catalog(), "gift");

    assert_eq!(gifts, vec!["Gifts".to_string()]);

    let ranked = suggest(&["Home Water", "Water"], "wat");

    assert_eq!(ranked, vec!["Water".to_string(), "Home Water".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_suggester_publishes_after_debounce() -> Result<()> {
    let mut suggester = Suggester::with_default_catalog();
    let mut receiver = suggester.subscribe();

    suggester.input("caf");

    assert!(suggester.current().is_empty());

    receiver.changed().await?;

    assert_eq!(suggester.current(), vec!["Café / Coffee".to_string()]);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_suggester_only_publishes_the_latest_input() -> Result<()> {
    let mut suggester = Suggester::with_default_catalog().with_debounce(Duration::from_millis(150));
    let mut receiver = suggester.subscribe();

    suggester.input("gro");
    advance(Duration::from_millis(100)).await;
    suggester.input("fue");
    advance(Duration::from_millis(100)).await;
    suggester.input("lunc");

    receiver.changed().await?;
    let published = receiver.borrow_and_update().clone();

    assert_eq!(published.items, vec!["Lunch".to_string()]);
    assert_eq!(published.generation, 3);

    sleep(Duration::from_secs(1)).await;

    assert!(!receiver.has_changed()?);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_suggester_clear_supersedes_pending_work() -> Result<()> {
    let mut suggester = Suggester::with_default_catalog();

    suggester.input("caf");
    suggester.clear();

    sleep(Duration::from_secs(1)).await;

    assert!(suggester.current().is_empty());

    Ok(())
}

#[test]
fn test_totals_saturate_instead_of_overflowing() -> Result<()> {
    let records = vec![
        create_record(2, "2024-01-02T10:00:00", "50000000000000000000000000000", Kind::Credit)?,
        create_record(1, "2024-01-01T10:00:00", "50000000000000000000000000000", Kind::Credit)?,
        create_record(3, "2024-01-03T10:00:00", "10", Kind::Debit)?,
    ];

    let view = apply(&records, &FilterSpec::None, SortSpec::AmountDescending);

    assert_eq!(view.records.len(), 3);
    assert!(view.totals.overflowed);
    assert_eq!(view.totals.total_credit, Decimal::MAX);
    assert_eq!(view.totals.total_debit, Decimal::from(10));
    assert_eq!(view.totals.balance, Decimal::MAX - Decimal::from(10));

    let single = apply(&records[..1], &FilterSpec::None, SortSpec::Unsorted);

    assert!(!single.totals.overflowed);
    assert_eq!(single.totals.total_credit, Decimal::from_str("50000000000000000000000000000")?);

    Ok(())
}
