//! Field formatters
//!
//! Pure functions that turn one loosely-typed value into a fixed-width token.
//! Widths are measured in characters, never bytes, so accented text is cut on
//! character boundaries. None of these functions can fail: every malformed
//! input has a documented fallback token.

use crate::domain::FieldValue;
use chrono::{Datelike, NaiveDate};
use std::fmt::Write as _;

/// Token emitted for a date that is absent or cannot be parsed
pub const ZERO_DATE: &str = "00000000";

/// Encoded quantity used when the source value is absent or not a number (1.00)
pub const DEFAULT_QUANTITY_HUNDREDTHS: u64 = 100;

/// Width of the quantity slot (four integer digits, two implied decimals)
pub const QUANTITY_WIDTH: usize = 6;

/// Oldest age the layout accepts
pub const MAX_AGE: i64 = 130;

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y", "%Y%m%d"];

/// Right-aligns `value` in `width` characters, filling on the left
///
/// When `value` is longer than `width` the leftmost characters are dropped,
/// so numeric values keep their least-significant digits.
pub fn pad_left(value: &str, width: usize, fill: char) -> String {
    let len = value.chars().count();
    if len >= width {
        return value.chars().skip(len - width).collect();
    }
    let mut out = String::with_capacity(width);
    out.extend(std::iter::repeat(fill).take(width - len));
    out.push_str(value);
    out
}

/// Left-aligns `value` in `width` characters, filling on the right
///
/// When `value` is longer than `width` it is cut after `width` characters.
pub fn pad_right(value: &str, width: usize, fill: char) -> String {
    let mut out: String = value.chars().take(width).collect();
    let len = out.chars().count();
    out.extend(std::iter::repeat(fill).take(width - len));
    out
}

/// `width` copies of a single character
pub fn repeat_char(fill: char, width: usize) -> String {
    std::iter::repeat(fill).take(width).collect()
}

/// ASCII digits of a value, in order, everything else dropped
pub fn digits_of(value: &FieldValue) -> String {
    match value {
        FieldValue::Null => String::new(),
        FieldValue::Integer(i) => i.unsigned_abs().to_string(),
        other => other
            .to_plain_string()
            .chars()
            .filter(char::is_ascii_digit)
            .collect(),
    }
}

/// Zero-padded numeric token
///
/// Non-digits are stripped, the remaining digits are right-aligned with `'0'`
/// and overflow keeps the least-significant digits. Absent input yields
/// `width` zeros.
///
/// ```
/// use bpa_export::core::codec::fields::format_numeric;
/// use bpa_export::domain::FieldValue;
///
/// assert_eq!(format_numeric(&FieldValue::Null, 6), "000000");
/// assert_eq!(format_numeric(&"12a3".into(), 4), "0123");
/// assert_eq!(format_numeric(&"1234567".into(), 4), "4567");
/// ```
pub fn format_numeric(value: &FieldValue, width: usize) -> String {
    pad_left(&digits_of(value), width, '0')
}

/// Numeric token for fields marked blank-if-absent
///
/// Behaves like [`format_numeric`] when the value is present and yields
/// `width` spaces when it is absent.
pub fn format_numeric_or_blank(value: &FieldValue, width: usize) -> String {
    if value.is_absent() {
        return repeat_char(' ', width);
    }
    format_numeric(value, width)
}

/// Digits left-aligned in a space-filled slot (health-card numbers)
pub fn format_digits_left(value: &FieldValue, width: usize) -> String {
    pad_right(&digits_of(value), width, ' ')
}

/// Space-padded text token
///
/// Control and other non-printable characters are removed before padding.
///
/// ```
/// use bpa_export::core::codec::fields::format_text;
/// use bpa_export::domain::FieldValue;
///
/// assert_eq!(format_text(&"".into(), 10), " ".repeat(10));
/// assert_eq!(format_text(&"Café Ação".into(), 5), "Café ");
/// assert_eq!(format_text(&FieldValue::Null, 3), "   ");
/// ```
pub fn format_text(value: &FieldValue, width: usize) -> String {
    let cleaned: String = value
        .to_plain_string()
        .chars()
        .filter(|c| !c.is_control())
        .collect();
    pad_right(&cleaned, width, ' ')
}

/// Alphanumeric characters only, left-aligned in a space-filled slot
pub fn format_alphanumeric(value: &FieldValue, width: usize) -> String {
    let cleaned: String = value
        .to_plain_string()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect();
    pad_right(&cleaned, width, ' ')
}

/// Parses a structured date or a delimited date string
///
/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, `DD/MM/YYYY`, `DD-MM-YYYY`, `YYYYMMDD`
/// and timestamps whose first ten characters are one of those.
pub fn parse_date(value: &FieldValue) -> Option<NaiveDate> {
    match value {
        FieldValue::Date(d) => Some(*d),
        FieldValue::DateTime(dt) => Some(dt.date()),
        FieldValue::Integer(i) => parse_date_str(&i.to_string()),
        FieldValue::Text(s) => {
            let s = s.trim();
            parse_date_str(s).or_else(|| s.get(..10).and_then(parse_date_str))
        }
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// `YYYYMMDD` date token, [`ZERO_DATE`] when absent or malformed
///
/// ```
/// use bpa_export::core::codec::fields::format_date;
///
/// assert_eq!(format_date(&"2024-01-15".into()), "20240115");
/// assert_eq!(format_date(&"15/01/2024".into()), "20240115");
/// assert_eq!(format_date(&"not a date".into()), "00000000");
/// ```
pub fn format_date(value: &FieldValue) -> String {
    format_date_with(value, "%Y%m%d")
}

/// Date token in a custom `strftime` format
///
/// Any failure, including an invalid format string, yields [`ZERO_DATE`].
pub fn format_date_with(value: &FieldValue, fmt: &str) -> String {
    let Some(date) = parse_date(value) else {
        return ZERO_DATE.to_string();
    };
    let mut out = String::new();
    if write!(out, "{}", date.format(fmt)).is_err() {
        return ZERO_DATE.to_string();
    }
    out
}

/// Parsed quantity, `None` when absent, negative or non-numeric
///
/// Text may use either `.` or `,` as decimal separator.
pub fn parse_quantity(value: &FieldValue) -> Option<f64> {
    let parsed = match value {
        FieldValue::Integer(i) => Some(*i as f64),
        FieldValue::Decimal(d) => Some(*d),
        FieldValue::Text(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|q| q.is_finite() && *q >= 0.0)
}

/// Quantity in hundredths (two implied decimal digits)
///
/// Unusable values resolve to [`DEFAULT_QUANTITY_HUNDREDTHS`].
pub fn quantity_hundredths(value: &FieldValue) -> u64 {
    parse_quantity(value).map_or(DEFAULT_QUANTITY_HUNDREDTHS, |q| (q * 100.0).round() as u64)
}

/// Whole units of a quantity, fraction dropped; zero when unusable
///
/// ```
/// use bpa_export::core::codec::fields::quantity_units;
/// use bpa_export::domain::FieldValue;
///
/// assert_eq!(quantity_units(&"2,75".into()), 2);
/// assert_eq!(quantity_units(&"abc".into()), 0);
/// assert_eq!(quantity_units(&FieldValue::Null), 0);
/// ```
pub fn quantity_units(value: &FieldValue) -> u64 {
    parse_quantity(value).map_or(0, |q| q.trunc() as u64)
}

/// Six-digit quantity token with two implied decimals
///
/// ```
/// use bpa_export::core::codec::fields::format_money_quantity;
///
/// assert_eq!(format_money_quantity(&"2.5".into()), "000250");
/// assert_eq!(format_money_quantity(&"abc".into()), "000100");
/// ```
pub fn format_money_quantity(value: &FieldValue) -> String {
    pad_left(&quantity_hundredths(value).to_string(), QUANTITY_WIDTH, '0')
}

/// Whole years between `birth` and `reference`, clamped to `[0, 130]`
///
/// One year is subtracted when the birthday has not yet happened in the
/// reference year.
pub fn compute_age(birth: NaiveDate, reference: NaiveDate) -> u8 {
    let mut years = i64::from(reference.year()) - i64::from(birth.year());
    if (reference.month(), reference.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    clamp_age(years)
}

/// Clamps an age to the range the layout accepts
pub fn clamp_age(years: i64) -> u8 {
    // MAX_AGE fits in u8
    years.clamp(0, MAX_AGE) as u8
}

/// Interprets a directly supplied age column
///
/// Plain integers are taken as-is; anything else falls back to its digits.
/// Returns `None` for an absent value.
pub fn supplied_age(value: &FieldValue) -> Option<u8> {
    if value.is_absent() {
        return None;
    }
    let years = match value {
        FieldValue::Integer(i) => *i,
        FieldValue::Decimal(d) => d.trunc() as i64,
        FieldValue::Text(s) => s
            .trim()
            .parse::<i64>()
            .ok()
            .or_else(|| digits_of(value).parse::<i64>().ok())
            .unwrap_or(0),
        _ => 0,
    };
    Some(clamp_age(years))
}
