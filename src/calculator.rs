use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::utils::cpu::format::{summarize, FactorSummary};

/// Largest input accepted by default. Trial division up to its square root
/// stays well under a second on one core.
pub const DEFAULT_MAX_INPUT: u64 = 1_000_000_000_000_000;

lazy_static! {
    static ref INTEGER: Regex = Regex::new(r"^([+-]?)(\d+)$").expect("valid integer pattern");
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Please enter a number.")]
    Empty,
    #[error("Please enter a valid number (e.g. 123, 456).")]
    NotANumber,
    #[error("Please enter a positive integer.")]
    NotPositive,
    #[error("Number is too large (maximum {}).", u64::MAX)]
    OutOfRange,
    #[error("Number is too large to factor here (maximum {max}).")]
    TooLarge { max: u64 },
}

/// Validates the raw "number to factor" field against `DEFAULT_MAX_INPUT`.
pub fn parse_input(text: &str) -> Result<u64, InputError> {
    parse_input_within(text, DEFAULT_MAX_INPUT)
}

/// Same as `parse_input` with an explicit upper bound.
pub fn parse_input_within(text: &str, max: u64) -> Result<u64, InputError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(InputError::Empty);
    }

    let caps = INTEGER.captures(text).ok_or(InputError::NotANumber)?;
    let negative = &caps[1] == "-";
    let digits = caps[2].trim_start_matches('0');

    if digits.is_empty() || negative {
        return Err(InputError::NotPositive);
    }

    let n = digits.parse::<u64>().map_err(|_| InputError::OutOfRange)?;
    if n > max {
        return Err(InputError::TooLarge { max });
    }
    Ok(n)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Calculation {
    /// `1` has no prime factors and is not prime.
    Degenerate,
    Factored(FactorSummary),
}

impl Calculation {
    pub fn formatted(&self) -> &str {
        match self {
            Calculation::Degenerate => "1",
            Calculation::Factored(summary) => &summary.formatted,
        }
    }
}

/// `n` must be positive; `parse_input` guarantees it.
pub fn calculate(n: u64) -> Calculation {
    match summarize(n) {
        Some(summary) => Calculation::Factored(summary),
        None => Calculation::Degenerate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(parse_input("100"), Ok(100));
        assert_eq!(parse_input("  17 \n"), Ok(17));
        assert_eq!(parse_input("+42"), Ok(42));
        assert_eq!(parse_input("007"), Ok(7));
        assert_eq!(parse_input("1"), Ok(1));
        assert_eq!(parse_input("18446744073709551615"), Err(InputError::TooLarge { max: DEFAULT_MAX_INPUT }));
        assert_eq!(parse_input_within("18446744073709551615", u64::MAX), Ok(u64::MAX));
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(parse_input(""), Err(InputError::Empty));
        assert_eq!(parse_input("   "), Err(InputError::Empty));
        assert_eq!(parse_input("abc"), Err(InputError::NotANumber));
        assert_eq!(parse_input("12.5"), Err(InputError::NotANumber));
        assert_eq!(parse_input("1e3"), Err(InputError::NotANumber));
        assert_eq!(parse_input("0"), Err(InputError::NotPositive));
        assert_eq!(parse_input("-0"), Err(InputError::NotPositive));
        assert_eq!(parse_input("-5"), Err(InputError::NotPositive));
        assert_eq!(parse_input("-99999999999999999999999"), Err(InputError::NotPositive));
        assert_eq!(parse_input("18446744073709551616"), Err(InputError::OutOfRange));
    }

    #[test]
    fn test_parse_respects_limit() {
        assert_eq!(parse_input(&DEFAULT_MAX_INPUT.to_string()), Ok(DEFAULT_MAX_INPUT));
        assert_eq!(
            parse_input(&(DEFAULT_MAX_INPUT + 1).to_string()),
            Err(InputError::TooLarge { max: DEFAULT_MAX_INPUT })
        );
        assert_eq!(parse_input_within("1000", 999), Err(InputError::TooLarge { max: 999 }));
        assert_eq!(parse_input_within("999", 999), Ok(999));
        // Large primes near u64::MAX never reach the factorizer.
        assert!(matches!(
            parse_input("18446744073709551557"),
            Err(InputError::TooLarge { .. })
        ));
        assert!(InputError::TooLarge { max: 999 }.to_string().contains("999"));
    }

    #[test]
    fn test_calculate() {
        assert_eq!(calculate(1), Calculation::Degenerate);
        assert_eq!(calculate(1).formatted(), "1");

        match calculate(100) {
            Calculation::Factored(s) => {
                assert_eq!(s.factors, vec![2, 2, 5, 5]);
                assert_eq!(s.formatted, "2^2 × 5^2");
                assert_eq!(s.divisor_count, 9);
                assert_eq!(s.unique_factor_count, 2);
                assert_eq!(s.max_factor, 5);
                assert!(!s.is_prime);
            }
            other => panic!("unexpected {:?}", other),
        }

        match calculate(17) {
            Calculation::Factored(s) => assert!(s.is_prime),
            other => panic!("unexpected {:?}", other),
        }
    }
}
