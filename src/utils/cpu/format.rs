use serde::Serialize;

use crate::utils::cpu::factor::{factorize, group};

const DELIMITER: &str = " × ";

/// Exponent notation, e.g. `[2, 2, 5, 5]` -> `"2^2 × 5^2"`. Empty list -> `"1"`.
pub fn format_factors(factors: &[u64]) -> String {
    render(factors, |p, e| format!("{}^{}", p, e))
}

/// Same segments as [`format_factors`] with superscript exponents (`2² × 5²`).
pub fn format_superscript(factors: &[u64]) -> String {
    render(factors, |p, e| format!("{}{}", p, superscript(e)))
}

fn render<F>(factors: &[u64], with_exponent: F) -> String
where
    F: Fn(u64, u32) -> String,
{
    if factors.is_empty() {
        return "1".to_string();
    }

    group(factors)
        .into_iter()
        .map(|(p, e)| if e == 1 { p.to_string() } else { with_exponent(p, e) })
        .collect::<Vec<_>>()
        .join(DELIMITER)
}

fn superscript(e: u32) -> String {
    const DIGITS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];
    e.to_string()
        .chars()
        .filter_map(|c| c.to_digit(10).map(|d| DIGITS[d as usize]))
        .collect()
}

/// Product of (multiplicity + 1) over distinct primes. 1 for the empty list.
pub fn divisor_count(factors: &[u64]) -> u64 {
    group(factors).values().map(|&e| e as u64 + 1).product()
}

pub fn is_prime_result(n: u64, factors: &[u64]) -> bool {
    factors.len() == 1 && factors[0] == n
}

pub fn unique_factor_count(factors: &[u64]) -> usize {
    group(factors).len()
}

/// Largest factor; `None` for the empty list.
pub fn max_factor(factors: &[u64]) -> Option<u64> {
    factors.iter().copied().max()
}

/// Everything the result view shows for one factored number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactorSummary {
    pub n: u64,
    pub factors: Vec<u64>,
    pub formatted: String,
    pub divisor_count: u64,
    pub unique_factor_count: usize,
    pub total_factor_count: usize,
    pub max_factor: u64,
    pub is_prime: bool,
}

/// Factors `n` and derives the display statistics. `None` for `n < 2`.
pub fn summarize(n: u64) -> Option<FactorSummary> {
    let factors = factorize(n);
    let max_factor = max_factor(&factors)?;

    Some(FactorSummary {
        n,
        formatted: format_factors(&factors),
        divisor_count: divisor_count(&factors),
        unique_factor_count: unique_factor_count(&factors),
        total_factor_count: factors.len(),
        max_factor,
        is_prime: is_prime_result(n, &factors),
        factors,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct ShowcaseEntry {
    pub n: u64,
    pub formatted: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShowcaseGroup {
    pub title: &'static str,
    pub entries: Vec<ShowcaseEntry>,
}

/// Example table shown under the calculator.
pub fn showcase() -> Vec<ShowcaseGroup> {
    let groups: [(&'static str, [u64; 3]); 3] = [
        ("Small numbers", [12, 15, 20]),
        ("Medium numbers", [100, 144, 200]),
        ("Large numbers", [1000, 2024, 9999]),
    ];

    groups
        .into_iter()
        .map(|(title, numbers)| ShowcaseGroup {
            title,
            entries: numbers
                .iter()
                .map(|&n| ShowcaseEntry { n, formatted: format_superscript(&factorize(n)) })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn parse_back(s: &str) -> BTreeMap<u64, u32> {
        s.split(DELIMITER)
            .map(|seg| match seg.split_once('^') {
                Some((p, e)) => (p.parse().unwrap(), e.parse().unwrap()),
                None => (seg.parse().unwrap(), 1),
            })
            .collect()
    }

    #[test]
    fn test_format_hundred() {
        let f = factorize(100);
        assert_eq!(f, vec![2, 2, 5, 5]);
        assert_eq!(format_factors(&f), "2^2 × 5^2");
        assert_eq!(divisor_count(&f), 9);
        assert_eq!(unique_factor_count(&f), 2);
        assert_eq!(max_factor(&f), Some(5));
        assert!(!is_prime_result(100, &f));
    }

    #[test]
    fn test_format_prime() {
        let f = factorize(17);
        assert_eq!(format_factors(&f), "17");
        assert_eq!(divisor_count(&f), 2);
        assert!(is_prime_result(17, &f));
        assert!(!is_prime_result(18, &factorize(18)));
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(format_factors(&[]), "1");
        assert_eq!(format_superscript(&[]), "1");
        assert_eq!(divisor_count(&[]), 1);
        assert_eq!(unique_factor_count(&[]), 0);
        assert_eq!(max_factor(&[]), None);
    }

    #[test]
    fn test_divisor_count_twelve() {
        assert_eq!(divisor_count(&[2, 2, 3]), 6);
    }

    #[test]
    fn test_format_round_trip() {
        for n in 2u64..2000 {
            let f = factorize(n);
            assert_eq!(parse_back(&format_factors(&f)), group(&f), "round trip failed at {n}");
        }
    }

    #[test]
    fn test_superscript() {
        assert_eq!(format_superscript(&factorize(144)), "2⁴ × 3²");
        assert_eq!(format_superscript(&factorize(2024)), "2³ × 11 × 23");
        assert_eq!(format_superscript(&factorize(1 << 12)), "2¹²");
    }

    #[test]
    fn test_summarize() {
        assert_eq!(summarize(1), None);

        let s = summarize(360).unwrap();
        assert_eq!(s.formatted, "2^3 × 3^2 × 5");
        assert_eq!(s.divisor_count, 24);
        assert_eq!(s.unique_factor_count, 3);
        assert_eq!(s.total_factor_count, 6);
        assert_eq!(s.max_factor, 5);
        assert!(!s.is_prime);
    }

    #[test]
    fn test_showcase() {
        let groups = showcase();
        assert_eq!(groups.len(), 3);
        let large = &groups[2];
        assert_eq!(large.entries[2].n, 9999);
        assert_eq!(large.entries[2].formatted, "3² × 11 × 101");
    }
}
