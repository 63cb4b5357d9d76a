//! Number formatting for chat replies.
//!
//! Rules:
//! - Thousands grouped with commas ("1,500")
//! - At most two decimals, half-up ("26,522.57")
//! - Trailing zero decimals dropped ("340.5", "1,423" not "1,423.00")

/// Format a number for a chat reply.
///
/// Rounds half-up to two decimals first; an integral result renders with
/// no decimal point, otherwise up to two decimal digits are printed with
/// a trailing zero stripped. Rounding to whole cents before splitting the
/// value also flattens float representation noise, so
/// `2362244.0000000000002` renders as `2,362,244`.
pub fn format_number(n: f64) -> String {
    let total_cents = (n * 100.0).round() as i64;
    let negative = total_cents < 0;
    let whole = (total_cents / 100).unsigned_abs();
    let cents = (total_cents % 100).unsigned_abs();

    let mut out = String::new();
    if negative && (whole > 0 || cents > 0) {
        out.push('-');
    }
    out.push_str(&group_thousands(whole));
    if cents > 0 {
        if cents % 10 == 0 {
            out.push_str(&format!(".{}", cents / 10));
        } else {
            out.push_str(&format!(".{:02}", cents));
        }
    }
    out
}

/// Format a win-rate percentage: always exactly two decimals, zeros kept
/// ("42.00", "52.70"). Percentages never need thousands grouping.
pub fn format_win_rate(pct: f64) -> String {
    format!("{:.2}", pct)
}

/// Group an integer with a comma every three digits.
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_grouping() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(283.0), "283");
        assert_eq!(format_number(1500.0), "1,500");
        assert_eq!(format_number(14280.0), "14,280");
        assert_eq!(format_number(1000000.0), "1,000,000");
    }

    #[test]
    fn test_format_number_decimals() {
        assert_eq!(format_number(26522.56723), "26,522.57");
        assert_eq!(format_number(999.94), "999.94");
        assert_eq!(format_number(855.375), "855.38");
        assert_eq!(format_number(1872.659176), "1,872.66");
    }

    #[test]
    fn test_format_number_trailing_zero_stripped() {
        assert_eq!(format_number(340.500), "340.5");
        assert_eq!(format_number(1423.0001), "1,423");
        assert_eq!(format_number(100.0), "100");
    }

    #[test]
    fn test_format_number_float_noise() {
        // The true value is an integer; representation error must not
        // leak a spurious decimal into the reply.
        assert_eq!(format_number(2362244.0000000000002), "2,362,244");
        assert_eq!(format_number(1836.0), "1,836");
    }

    #[test]
    fn test_format_number_negative_does_not_crash() {
        // No negative value occurs in this domain; still sign-correct.
        assert_eq!(format_number(-1234.5), "-1,234.5");
        assert_eq!(format_number(-0.25), "-0.25");
        assert_eq!(format_number(-0.001), "0");
    }

    #[test]
    fn test_format_number_idempotent_on_canonical_values() {
        for n in [1500.0, 26522.56723, 340.5, 2362244.0000000000002, 999.94] {
            let once = format_number(n);
            let reparsed: f64 = once.replace(',', "").parse().unwrap();
            assert_eq!(format_number(reparsed), once);
        }
    }

    #[test]
    fn test_format_win_rate_keeps_zeros() {
        assert_eq!(format_win_rate(42.001), "42.00");
        assert_eq!(format_win_rate(52.7027), "52.70");
        assert_eq!(format_win_rate(100.0), "100.00");
        assert_eq!(format_win_rate(0.0), "0.00");
    }
}
