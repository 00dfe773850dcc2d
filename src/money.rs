//! Wire-amount parsing and formatting.
//!
//! Amounts cross the API boundary as strings to avoid JSON float precision
//! loss, and are stored as fixed-point `NUMERIC` columns. All conversions
//! between the two go through this module; parsing is strict so a malformed
//! amount fails loudly instead of being silently truncated.

use rust_decimal::Decimal;
use thiserror::Error;

/// Maximum fractional digits accepted on the wire.
///
/// Matches the `NUMERIC(19,4)` ledger columns; anything finer would be
/// silently rounded by the database.
pub const MAX_SCALE: u32 = 4;

#[derive(Debug, Error)]
pub enum MoneyError {
    #[error("Precision overflow: provided {provided} decimals, max allowed {max}")]
    PrecisionOverflow { provided: u32, max: u32 },

    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Parse a client-provided amount string into a positive `Decimal`.
///
/// Rules:
/// - no sign prefix (amounts are magnitudes; direction comes from the operation)
/// - both sides of a decimal point must be present (`0.5`, not `.5` or `5.`)
/// - at most [`MAX_SCALE`] fractional digits
/// - strictly greater than zero
pub fn parse_amount(amount_str: &str) -> Result<Decimal, MoneyError> {
    let amount_str = amount_str.trim();
    if amount_str.is_empty() {
        return Err(MoneyError::InvalidFormat("empty string".into()));
    }

    if amount_str.starts_with('-') || amount_str.starts_with('+') {
        return Err(MoneyError::InvalidAmount);
    }

    if let Some((whole, frac)) = amount_str.split_once('.') {
        // Strict check: require both sides of the dot to be non-empty.
        // This prevents ambiguous formats like ".5" or "5.".
        if whole.is_empty() {
            return Err(MoneyError::InvalidFormat(
                "missing leading zero (e.g., use 0.5 instead of .5)".into(),
            ));
        }
        if frac.is_empty() {
            return Err(MoneyError::InvalidFormat(
                "missing fractional part (e.g., use 5.0 instead of 5.)".into(),
            ));
        }
        if frac.contains('.') {
            return Err(MoneyError::InvalidFormat("multiple decimal points".into()));
        }
        if frac.len() as u32 > MAX_SCALE {
            return Err(MoneyError::PrecisionOverflow {
                provided: frac.len() as u32,
                max: MAX_SCALE,
            });
        }
    }

    let amount: Decimal = amount_str
        .parse()
        .map_err(|_| MoneyError::InvalidFormat(format!("not a decimal number: {}", amount_str)))?;

    if amount <= Decimal::ZERO {
        return Err(MoneyError::InvalidAmount);
    }

    Ok(amount)
}

/// Format a ledger amount for API responses (two fractional digits minimum).
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp(MAX_SCALE).normalize();
    if rounded.scale() < 2 {
        format!("{:.2}", rounded)
    } else {
        rounded.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_valid_amounts() {
        assert_eq!(parse_amount("50").unwrap(), dec!(50));
        assert_eq!(parse_amount("50.00").unwrap(), dec!(50));
        assert_eq!(parse_amount("0.0001").unwrap(), dec!(0.0001));
        assert_eq!(parse_amount(" 12.34 ").unwrap(), dec!(12.34));
    }

    #[test]
    fn test_parse_rejects_signs() {
        assert!(matches!(parse_amount("-5"), Err(MoneyError::InvalidAmount)));
        assert!(matches!(parse_amount("+5"), Err(MoneyError::InvalidAmount)));
    }

    #[test]
    fn test_parse_rejects_zero() {
        assert!(matches!(parse_amount("0"), Err(MoneyError::InvalidAmount)));
        assert!(matches!(
            parse_amount("0.00"),
            Err(MoneyError::InvalidAmount)
        ));
    }

    #[test]
    fn test_parse_rejects_ambiguous_dots() {
        assert!(matches!(
            parse_amount(".5"),
            Err(MoneyError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_amount("5."),
            Err(MoneyError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_amount("1.2.3"),
            Err(MoneyError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_parse_rejects_excess_precision() {
        assert!(matches!(
            parse_amount("1.00001"),
            Err(MoneyError::PrecisionOverflow { provided: 5, .. })
        ));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_amount("").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("1e5").is_err());
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec!(50)), "50.00");
        assert_eq!(format_amount(dec!(12.5)), "12.50");
        assert_eq!(format_amount(dec!(0.0001)), "0.0001");
        assert_eq!(format_amount(dec!(100.000)), "100.00");
    }
}
