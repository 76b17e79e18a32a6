//! Creditor reference numbers.
//!
//! Invoice payments carry a national creditor reference: a numeric base with
//! a check digit computed using the 7-3-1 weighting scheme. Banks echo the
//! reference back on incoming transactions, which is what lets statement
//! import resolve a transaction to the payment it settles.

/// Computes the 7-3-1 check digit for a numeric reference base.
///
/// Digits are weighted 7, 3, 1, 7, 3, 1, ... starting from the rightmost
/// digit of the base. Returns `None` if the base contains non-digits or is
/// empty.
#[must_use]
pub fn check_digit(base: &str) -> Option<u32> {
    if base.is_empty() || !base.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let weights = [7u32, 3, 1];
    let sum: u32 = base
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| u32::from(b - b'0') * weights[i % 3])
        .sum();

    Some((10 - sum % 10) % 10)
}

/// Builds a full reference number from a numeric base.
#[must_use]
pub fn generate(base: u64) -> String {
    let base = base.to_string();
    // check_digit cannot fail for the decimal rendering of a u64
    let check = check_digit(&base).unwrap_or(0);
    format!("{base}{check}")
}

/// Returns true if the reference carries a correct check digit.
#[must_use]
pub fn is_valid(reference: &str) -> bool {
    let trimmed = normalize(reference);
    if trimmed.len() < 2 {
        return false;
    }
    let (base, check) = trimmed.split_at(trimmed.len() - 1);
    match (check_digit(base), check.parse::<u32>()) {
        (Some(expected), Ok(actual)) => expected == actual,
        _ => false,
    }
}

/// Normalizes a reference for comparison.
///
/// Banks and billers disagree about zero padding and grouping, so matching
/// strips whitespace and leading zeros on both sides.
#[must_use]
pub fn normalize(reference: &str) -> String {
    let stripped: String = reference.chars().filter(|c| !c.is_whitespace()).collect();
    let trimmed = stripped.trim_start_matches('0');
    if trimmed.is_empty() && !stripped.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Returns true if two references identify the same payment.
#[must_use]
pub fn references_match(a: &str, b: &str) -> bool {
    let a = normalize(a);
    !a.is_empty() && a == normalize(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_known_check_digit() {
        // 123456 -> weights from the right: 6*7 + 5*3 + 4*1 + 3*7 + 2*3 + 1*1 = 89
        assert_eq!(check_digit("123456"), Some(1));
        assert_eq!(generate(123_456), "1234561");
    }

    #[test]
    fn test_check_digit_rejects_non_numeric() {
        assert_eq!(check_digit(""), None);
        assert_eq!(check_digit("12a4"), None);
    }

    #[rstest]
    #[case("1234561", true)]
    #[case("12344", true)]
    #[case("1234560", false)]
    #[case("7", false)]
    #[case("", false)]
    fn test_is_valid(#[case] reference: &str, #[case] expected: bool) {
        assert_eq!(is_valid(reference), expected);
    }

    #[test]
    fn test_valid_survives_padding_and_spacing() {
        assert!(is_valid("00 00123 4561"));
    }

    #[rstest]
    #[case("0001234561", "1234561")]
    #[case("12 3456 1", "1234561")]
    #[case("000", "0")]
    #[case("", "")]
    fn test_normalize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input), expected);
    }

    #[test]
    fn test_references_match_ignores_leading_zeros() {
        assert!(references_match("0001234561", "1234561"));
        assert!(references_match("12 34561", "1234561"));
        assert!(!references_match("1234561", "1234562"));
        assert!(!references_match("", ""));
    }

    #[test]
    fn test_generated_references_are_valid() {
        for base in [1u64, 42, 123_456, 999_999_999] {
            assert!(is_valid(&generate(base)), "base {base}");
        }
    }
}
