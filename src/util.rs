// Utility helpers for parsing, guarded arithmetic and number formatting.
//
// Everything that touches raw CSV cells or can divide by zero lives here so
// the rest of the code only sees clean, finite values.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

/// Parse a cell into `f64`, forgiving the usual spreadsheet noise.
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed or is not finite.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a whole number, also accepting float spellings such as `2023.0`
/// that spreadsheet exports tend to produce.
pub fn parse_i32_safe(s: Option<&str>) -> Option<i32> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<i32>() {
        return Some(v);
    }
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() && v.fract() == 0.0 && v >= i32::MIN as f64 && v <= i32::MAX as f64 {
        Some(v as i32)
    } else {
        None
    }
}

pub fn days_diff(start: NaiveDate, end: NaiveDate) -> f64 {
    (end - start).num_days() as f64
}

/// Division that yields 0 instead of NaN/Inf.
pub fn safe_div(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        return 0.0;
    }
    let v = num / den;
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

pub fn average(v: &[f64]) -> f64 {
    // Returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus thousands separators, e.g. `1,234,567.89`.
    let n = if n.is_finite() { n } else { 0.0 };
    let s = format!("{:.*}", decimals, n.abs());
    let neg = n.is_sign_negative() && s.chars().any(|c| c.is_ascii_digit() && c != '0');
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Past the i64 range there is no grouping; print the digits as they are.
    let mut res = match int_part.parse::<i64>() {
        Ok(int_val) => int_val.to_formatted_string(&Locale::en),
        Err(_) => int_part.to_string(),
    };
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

pub fn format_money(n: f64) -> String {
    let s = format_number(n, 2);
    match s.strip_prefix('-') {
        Some(rest) => format!("-${}", rest),
        None => format!("${}", s),
    }
}

/// Signed percentage delta such as `+12.50%`, or `N/A` when undefined.
pub fn format_delta(pct: Option<f64>) -> String {
    match pct {
        Some(v) if v.is_finite() => {
            let body = format_number(v, 2);
            if body.starts_with('-') {
                format!("{}%", body)
            } else {
                format!("+{}%", body)
            }
        }
        _ => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_f64_safe() {
        assert_eq!(parse_f64_safe(Some(" 1,234.5 ")), Some(1234.5));
        assert_eq!(parse_f64_safe(Some("-3")), Some(-3.0));
        assert_eq!(parse_f64_safe(Some("abc")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn test_parse_i32_safe_accepts_float_spelling() {
        assert_eq!(parse_i32_safe(Some("2023")), Some(2023));
        assert_eq!(parse_i32_safe(Some("2023.0")), Some(2023));
        assert_eq!(parse_i32_safe(Some("2023.5")), None);
        assert_eq!(parse_i32_safe(Some("twenty")), None);
    }

    #[test]
    fn test_safe_div_guards_zero() {
        assert_eq!(safe_div(10.0, 0.0), 0.0);
        assert_eq!(safe_div(10.0, 4.0), 2.5);
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-0.001, 2), "0.00");
        assert_eq!(format_money(-50.0), "-$50.00");
        assert_eq!(format_money(1234.5), "$1,234.50");
        assert_eq!(format_delta(Some(12.5)), "+12.50%");
        assert_eq!(format_delta(Some(-50.0)), "-50.00%");
        assert_eq!(format_delta(None), "N/A");
        assert_eq!(format_int(12345i64), "12,345");
    }

    #[test]
    fn test_format_number_beyond_i64_range() {
        let huge = format_number(1e20, 2);
        assert!(huge.starts_with("100000000000000000000"));
        assert!(huge.ends_with(".00"));
        assert_eq!(format_number(-1e20, 0), "-100000000000000000000");
        assert_ne!(format_number(1e19, 2), "0.00");
    }
}
