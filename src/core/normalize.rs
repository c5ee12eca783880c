//! Per-column value canonicalization and the running amount total.

use crate::core::schema::{ColumnRole, Schema};
use crate::domain::model::{CleanStats, Record};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

static NON_NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9.\-]").expect("valid NON_NUMERIC pattern"));

// 取最長的前導十進位數字 ("1.2.3" -> 1.2, "12-3" -> 12)
static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?(?:\d+(?:\.\d*)?|\.\d+)").expect("valid LEADING_NUMBER pattern")
});

static PARTIAL_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})(?:[-/](\d{1,2}))?$").expect("valid PARTIAL_DATE pattern")
});

const DATETIME_FORMATS: [&str; 9] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

// 斜線日期一律視為美式 月/日/年
const DATE_FORMATS: [&str; 12] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d-%b-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%a %b %d %Y",
];

const TRUTHY: [&str; 4] = ["yes", "y", "true", "1"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDate {
    pub value: String,
    pub is_valid: bool,
}

/// Trim, then strip one layer of surrounding quotes and unescape `""` to `"`.
pub fn unquote(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.len() > 1 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].replace("\"\"", "\"")
    } else {
        trimmed.to_string()
    }
}

/// Empty input is valid and stays empty. Parseable dates become `YYYY-MM-DD`,
/// anything else is returned trimmed and marked invalid.
pub fn normalize_date(value: &str) -> NormalizedDate {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return NormalizedDate {
            value: String::new(),
            is_valid: true,
        };
    }

    match parse_date(trimmed) {
        Some(date) => NormalizedDate {
            value: date.format("%Y-%m-%d").to_string(),
            is_valid: true,
        },
        None => NormalizedDate {
            value: trimmed.to_string(),
            is_valid: false,
        },
    }
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    // 帶時區的時間先換算成 UTC 再取日期
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc().date());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.naive_utc().date());
    }

    for fmt in &DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.date());
        }
    }

    for fmt in &DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(value, fmt) {
            return Some(d);
        }
    }

    parse_partial_date(value)
}

/// Year-month or bare year, pinned to the first day.
fn parse_partial_date(value: &str) -> Option<NaiveDate> {
    let caps = PARTIAL_DATE.captures(value)?;
    let year = caps[1].parse().ok()?;
    let month = match caps.get(2) {
        Some(m) => m.as_str().parse().ok()?,
        None => 1,
    };
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// `$` plus the amount with two decimals and thousands separators; `$0.00` when unparseable.
pub fn normalize_amount(value: &str) -> String {
    match parse_amount(value) {
        Some(amount) => format_currency(amount),
        None => format_currency(0.0),
    }
}

/// Numeric value of a money-like string after stripping everything but digits, `.` and `-`.
pub fn parse_amount(value: &str) -> Option<f64> {
    let cleaned = NON_NUMERIC.replace_all(value, "");
    let number = LEADING_NUMBER.find(&cleaned)?;
    number
        .as_str()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

pub fn format_currency(amount: f64) -> String {
    let rounded = format!("{:.2}", amount.abs());
    let (whole, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let is_zero = whole.chars().all(|c| c == '0') && fraction.chars().all(|c| c == '0');
    let sign = if amount < 0.0 && !is_zero { "-" } else { "" };

    format!("${}{}.{}", sign, grouped, fraction)
}

pub fn normalize_paid(value: &str) -> String {
    let lowered = value.trim().to_lowercase();
    if TRUTHY.contains(&lowered.as_str()) {
        "Yes".to_string()
    } else {
        "No".to_string()
    }
}

/// Canonicalize every value of one row. Returns the values and whether any
/// non-empty date failed to parse.
pub fn normalize_row(schema: &Schema, values: &[String]) -> (Vec<String>, bool) {
    let mut has_invalid_date = false;

    let normalized = schema
        .roles
        .iter()
        .enumerate()
        .map(|(i, role)| {
            let raw = values.get(i).map(String::as_str).unwrap_or("");
            let value = unquote(raw);
            let value = value.trim();

            match role {
                ColumnRole::Date => {
                    let date = normalize_date(value);
                    if !date.is_valid && !date.value.is_empty() {
                        has_invalid_date = true;
                    }
                    date.value
                }
                ColumnRole::Currency => normalize_amount(value),
                ColumnRole::Boolean => normalize_paid(value),
                ColumnRole::Text => value.to_string(),
            }
        })
        .collect();

    (normalized, has_invalid_date)
}

/// Normalize repaired rows into records, counting invalid dates once per row
/// and summing the first amount column of complete rows.
pub fn normalize(schema: &Schema, rows: Vec<Vec<String>>, stats: &mut CleanStats) -> Vec<Record> {
    let mut records = Vec::with_capacity(rows.len());

    for values in rows {
        let (normalized, has_invalid_date) = normalize_row(schema, &values);

        if has_invalid_date {
            stats.invalid_dates += 1;
        }

        // 只有會進入輸出的列才計入總額
        if schema.is_complete(&normalized) {
            if let Some(amount) = schema
                .amount_column
                .and_then(|i| normalized.get(i))
                .and_then(|v| parse_amount(v))
            {
                stats.total_amount += amount;
            }
        }

        records.push(Record::new(normalized));
    }

    tracing::debug!(
        "Normalized {} rows ({} with invalid dates, total {:.2})",
        records.len(),
        stats.invalid_dates,
        stats.total_amount
    );

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("  \"hello\"  "), "hello");
        assert_eq!(unquote("\"say \"\"hi\"\"\""), "say \"hi\"");
        assert_eq!(unquote("plain"), "plain");
        assert_eq!(unquote("\""), "\"");
        assert_eq!(unquote("\"\""), "");
        assert_eq!(unquote("\"only start"), "\"only start");
    }

    #[test]
    fn test_unquote_is_idempotent_once_outer_quotes_are_gone() {
        for input in ["\"abc\"", "  x  ", "\"a \"\"b\"\" c\"", "\"\"\"edge\""] {
            let once = unquote(input);
            if !(once.len() > 1 && once.starts_with('"') && once.ends_with('"')) {
                assert_eq!(unquote(&once), once, "input {input:?}");
            }
        }
    }

    #[test]
    fn test_normalize_date_formats() {
        assert_eq!(normalize_date("2024-01-05").value, "2024-01-05");
        assert_eq!(normalize_date("01/05/2024").value, "2024-01-05");
        assert_eq!(normalize_date("1/5/2024").value, "2024-01-05");
        assert_eq!(normalize_date("2024/01/05").value, "2024-01-05");
        assert_eq!(normalize_date("Jan 5, 2024").value, "2024-01-05");
        assert_eq!(normalize_date("5 January 2024").value, "2024-01-05");
        assert_eq!(normalize_date("2024-01-05T10:30:00").value, "2024-01-05");
        assert_eq!(normalize_date("2024-01").value, "2024-01-01");
        assert_eq!(normalize_date("2024").value, "2024-01-01");
        assert!(normalize_date(" 2024-01-05 ").is_valid);
    }

    #[test]
    fn test_normalize_date_with_offset_uses_utc_day() {
        let date = normalize_date("2024-01-05T23:00:00-05:00");
        assert_eq!(date.value, "2024-01-06");
        assert!(date.is_valid);
    }

    #[test]
    fn test_normalize_date_invalid_and_empty() {
        let invalid = normalize_date(" not-a-date ");
        assert_eq!(invalid.value, "not-a-date");
        assert!(!invalid.is_valid);

        let empty = normalize_date("   ");
        assert_eq!(empty.value, "");
        assert!(empty.is_valid);

        assert!(!normalize_date("13/45/2024").is_valid);
        assert!(!normalize_date("1/5").is_valid);
        assert!(!normalize_date("2024-13").is_valid);
    }

    #[test]
    fn test_normalize_amount() {
        assert_eq!(normalize_amount("1,234.5"), "$1,234.50");
        assert_eq!(normalize_amount(""), "$0.00");
        assert_eq!(normalize_amount("abc"), "$0.00");
        assert_eq!(normalize_amount("$ 4.5"), "$4.50");
        assert_eq!(normalize_amount("USD 1234567.891"), "$1,234,567.89");
        assert_eq!(normalize_amount("-42"), "$-42.00");
        assert_eq!(normalize_amount("1.2.3"), "$1.20");
        assert_eq!(normalize_amount("-0.001"), "$0.00");
        assert_eq!(normalize_amount("999.999"), "$1,000.00");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$1,234.50"), Some(1234.5));
        assert_eq!(parse_amount("$-3.00"), Some(-3.0));
        assert_eq!(parse_amount(".5"), Some(0.5));
        assert_eq!(parse_amount("-"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_normalize_paid() {
        for yes in ["Y", " yes ", "TRUE", "1"] {
            assert_eq!(normalize_paid(yes), "Yes", "input {yes:?}");
        }
        for no in ["no", "", "maybe", "0"] {
            assert_eq!(normalize_paid(no), "No", "input {no:?}");
        }
    }

    #[test]
    fn test_normalize_row_applies_roles() {
        let schema = Schema::resolve(&strings(&["Date", "Description", "Amount", "Paid"]));
        let (values, invalid) = normalize_row(
            &schema,
            &strings(&["01/05/2024", "  \"Coffee, large\" ", "4.5", "y"]),
        );
        assert_eq!(values, strings(&["2024-01-05", "Coffee, large", "$4.50", "Yes"]));
        assert!(!invalid);
    }

    #[test]
    fn test_invalid_dates_counted_once_per_row() {
        let schema = Schema::resolve(&strings(&["Start Date", "End Date", "Description"]));
        let mut stats = CleanStats::default();

        let records = normalize(
            &schema,
            vec![
                strings(&["soon", "later", "Trip"]),
                strings(&["2024-01-01", "whenever", "Hotel"]),
                strings(&["2024-01-01", "", "Taxi"]),
            ],
            &mut stats,
        );

        assert_eq!(records.len(), 3);
        assert_eq!(stats.invalid_dates, 2);
        assert_eq!(records[0].value(0), Some("soon"));
    }

    #[test]
    fn test_total_uses_first_amount_column() {
        let schema = Schema::resolve(&strings(&["Date", "Description", "Price", "Amount"]));
        let mut stats = CleanStats::default();

        normalize(
            &schema,
            vec![
                strings(&["2024-01-01", "A", "1,000", "5"]),
                strings(&["2024-01-02", "B", "abc", "7"]),
                strings(&["2024-01-03", "C", "-2.5", "9"]),
            ],
            &mut stats,
        );

        assert!((stats.total_amount - 997.5).abs() < 1e-9);
    }

    #[test]
    fn test_incomplete_rows_do_not_count_towards_total() {
        let schema = Schema::resolve(&strings(&["Date", "Description", "Amount"]));
        let mut stats = CleanStats::default();

        let records = normalize(
            &schema,
            vec![
                strings(&["2024-01-01", "Coffee", "4.5"]),
                strings(&["2024-01-02", "", "10"]),
            ],
            &mut stats,
        );

        assert_eq!(records.len(), 2);
        assert!((stats.total_amount - 4.5).abs() < 1e-9);
    }
}
