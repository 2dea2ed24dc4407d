use super::{Amount, AmountError};
use anyhow::Result;
use rust_decimal::Decimal;
use std::str::FromStr;

#[test]
fn test_amount_successfully_parses_valid_strings() -> Result<()> {
    let test_cases = vec![
        ("1.0", "1.0"),
        ("25.50", "25.50"),
        ("0.0001", "0.0001"),
        ("  12  ", "12"),
        ("+3.5", "3.5"),
        ("100", "100"),
    ];

    for (input_string, expected_output) in test_cases {
        assert_eq!(Amount::from_str(input_string)?.to_string(), expected_output);
    }

    Ok(())
}

#[test]
fn test_amount_fails_to_parse_invalid_strings() {
    assert!(Amount::from_str("abc").is_err());
    assert!(Amount::from_str("1.2.3").is_err());
    assert!(Amount::from_str("").is_err());
    assert!(Amount::from_str("   ").is_err());
    assert!(Amount::from_str("1_000").is_err());
    assert!(Amount::from_str("1e3").is_err());
}

#[test]
fn test_amount_rejects_zero_and_negative_values() {
    assert!(matches!(Amount::from_str("0"), Err(AmountError::NotPositive)));
    assert!(matches!(Amount::from_str("0.00"), Err(AmountError::NotPositive)));
    assert!(matches!(Amount::from_str("-1.5"), Err(AmountError::NotPositive)));
    assert!(matches!(Amount::new(Decimal::NEGATIVE_ONE), Err(AmountError::NotPositive)));
}

#[test]
fn test_amount_equality_ignores_trailing_zeros() -> Result<()> {
    assert_eq!(Amount::from_str("25.50")?, Amount::from_str("25.5")?);
    assert!(Amount::from_str("25.50")? < Amount::from_str("40")?);

    Ok(())
}
