// Utility helpers for loose value coercion and display formatting.
//
// This module centralizes all the "dirty" JSON/number handling so the
// rest of the code can assume clean, typed values.
use num_format::{Locale, ToFormattedString};
use serde_json::Value;

/// Coerce a loosely-typed amount into a finite `f64`.
///
/// - Numbers are used as-is.
/// - Strings have their first `,` replaced by `.` (comma decimal separator)
///   and are parsed by their longest valid float prefix, so `"10,5"` is 10.5
///   and `"12abc"` is 12.
/// - Anything else, or a non-finite result, is `0.0`. Never fails.
pub fn parse_amount(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_float_prefix(&s.replacen(',', ".", 1)),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Parse a loosely-typed base-10 integer.
///
/// Numbers are truncated toward zero; strings yield their leading integer
/// prefix after whitespace (`" 42 rows"` is 42). Returns `None` when no
/// digits can be read.
pub fn parse_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => parse_int_prefix(s),
        _ => None,
    }
}

/// Render any JSON scalar as display text. `null` and missing become empty.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    s[..end].parse::<i64>().ok()
}

fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let len = bytes.len();
    let count_digits = |from: usize| {
        let mut i = from;
        while i < len && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = count_digits(end);
    let mut digits = int_end - end;
    end = int_end;
    if end < len && bytes[end] == b'.' {
        let frac_end = count_digits(end + 1);
        if frac_end > end + 1 {
            digits += frac_end - end - 1;
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    if end < len && matches!(bytes[end], b'e' | b'E') {
        let mut exp = end + 1;
        if exp < len && matches!(bytes[exp], b'+' | b'-') {
            exp += 1;
        }
        let exp_end = count_digits(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    s[..end].parse::<f64>().ok()
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimal places with en-style thousands separators (`1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Past u128 the digits are kept ungrouped rather than lost.
    let mut res = match int_part.parse::<u128>() {
        Ok(int_val) => int_val.to_formatted_string(&Locale::en),
        Err(_) => int_part.to_string(),
    };
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

/// Amount in the dashboard's single currency, e.g. `R$ 1.234,56`.
pub fn format_currency(n: f64) -> String {
    let plain = format_number(n, 2);
    let swapped: String = plain
        .chars()
        .map(|c| match c {
            ',' => '.',
            '.' => ',',
            other => other,
        })
        .collect();
    match swapped.strip_prefix('-') {
        Some(rest) => format!("-R$ {}", rest),
        None => format!("R$ {}", swapped),
    }
}

/// Percent change as shown in the trend lists. `+Infinity` reads as `New`.
pub fn format_change(change_percent: f64) -> String {
    if change_percent == f64::INFINITY {
        "New".to_string()
    } else {
        format!("{:.0}%", change_percent)
    }
}

/// A `0.0..=1.0` share rendered as a percentage with one decimal.
pub fn format_share(share: f64) -> String {
    format!("{:.1}%", share * 100.0)
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_amount_comma_decimal() {
        assert_eq!(parse_amount(&json!("10,5")), 10.5);
        assert_eq!(parse_amount(&json!(" 7,25 ")), 7.25);
    }

    #[test]
    fn test_amount_thousands_style_keeps_leading_prefix() {
        // Only the first comma is rewritten, so "1.234,56" reads as "1.234.56".
        assert_eq!(parse_amount(&json!("1.234,56")), 1.234);
    }

    #[test]
    fn test_amount_numbers_and_failures() {
        assert_eq!(parse_amount(&json!(42.5)), 42.5);
        assert_eq!(parse_amount(&json!(-3)), -3.0);
        assert_eq!(parse_amount(&json!("12abc")), 12.0);
        assert_eq!(parse_amount(&json!("1e3")), 1000.0);
        assert_eq!(parse_amount(&json!("abc")), 0.0);
        assert_eq!(parse_amount(&json!("")), 0.0);
        assert_eq!(parse_amount(&json!("-")), 0.0);
        assert_eq!(parse_amount(&json!(".")), 0.0);
        assert_eq!(parse_amount(&json!(null)), 0.0);
        assert_eq!(parse_amount(&json!(true)), 0.0);
        assert_eq!(parse_amount(&json!("Infinity")), 0.0);
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int(&json!(17)), Some(17));
        assert_eq!(parse_int(&json!(5.9)), Some(5));
        assert_eq!(parse_int(&json!("2024")), Some(2024));
        assert_eq!(parse_int(&json!("  12abc")), Some(12));
        assert_eq!(parse_int(&json!("-4")), Some(-4));
        assert_eq!(parse_int(&json!("abc")), None);
        assert_eq!(parse_int(&json!("")), None);
        assert_eq!(parse_int(&json!(null)), None);
        assert_eq!(parse_int(&json!([1])), None);
    }

    #[test]
    fn test_value_to_text() {
        assert_eq!(value_to_text(&json!("Saúde")), "Saúde");
        assert_eq!(value_to_text(&json!(3)), "3");
        assert_eq!(value_to_text(&json!(null)), "");
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-5.0, 0), "-5");
        assert_eq!(format_currency(1234.56), "R$ 1.234,56");
        assert_eq!(format_currency(-10.0), "-R$ 10,00");
        assert_eq!(format_currency(1e19), "R$ 10.000.000.000.000.000.000,00");
        assert_eq!(format_number(1e40, 0).len(), 41);
        assert_eq!(format_change(f64::INFINITY), "New");
        assert_eq!(format_change(50.0), "50%");
        assert_eq!(format_change(-100.0), "-100%");
        assert_eq!(format_share(0.25), "25.0%");
        assert_eq!(format_int(9855), "9,855");
    }
}
