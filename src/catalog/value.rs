//! Storage-safe cell values and the normalization from raw sheet cells.
//!
//! No binary floating-point value ever leaves this module: fractional numbers
//! are built as base-10 decimals from the cell's stored text.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::ooxml::xlsx::{DateSystem, RawCell};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const SECONDS_PER_DAY: i64 = 86_400;

/// A normalized cell value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Integer(i64),
    /// Exact base-10 decimal, serialized as a JSON number with its digits intact
    Decimal(#[serde(serialize_with = "rust_decimal::serde::arbitrary_precision::serialize")] Decimal),
    /// ISO 8601 timestamp (`YYYY-MM-DDTHH:MM:SS`)
    Timestamp(String),
    String(String),
}

impl CellValue {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// The value as a record key: its trimmed textual form, or `None` when
    /// the value is null or blank.
    pub fn as_key(&self) -> Option<String> {
        let key = match self {
            CellValue::Null => return None,
            CellValue::String(s) | CellValue::Timestamp(s) => s.trim().to_string(),
            other => other.to_string(),
        };
        (!key.is_empty()).then_some(key)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Decimal(d) => write!(f, "{}", d),
            CellValue::Timestamp(s) | CellValue::String(s) => f.write_str(s),
        }
    }
}

/// Normalize a raw cell. Total: every input maps to some value.
///
/// - empty, blank text and error cells become `Null`
/// - numbers in a date style become timestamps
/// - integral numbers become `Integer`, others an exact `Decimal`
/// - text and booleans pass through unchanged
pub fn normalize_cell(cell: &RawCell, date_system: DateSystem) -> CellValue {
    match cell {
        RawCell::Empty | RawCell::Error(_) => CellValue::Null,
        RawCell::Text(s) if s.trim().is_empty() => CellValue::Null,
        RawCell::Text(s) => CellValue::String(s.clone()),
        RawCell::Bool(b) => CellValue::Bool(*b),
        RawCell::IsoDate(s) => CellValue::Timestamp(normalize_iso_date(s)),
        RawCell::Number { text, date_style } => {
            let Some(number) = parse_decimal(text) else {
                return CellValue::String(text.clone());
            };
            if *date_style && let Some(timestamp) = serial_to_timestamp(number, date_system) {
                return CellValue::Timestamp(timestamp);
            }
            normalize_number(number)
        },
    }
}

/// Parse a stored numeric text, accepting scientific notation.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    if text.contains(['e', 'E']) {
        Decimal::from_scientific(text).ok()
    } else {
        Decimal::from_str(text).ok()
    }
}

fn normalize_number(number: Decimal) -> CellValue {
    if number.fract().is_zero()
        && let Some(int) = number.trunc().to_i64()
    {
        return CellValue::Integer(int);
    }
    CellValue::Decimal(number.normalize())
}

/// Convert a date serial number to a timestamp string.
///
/// The 1900 system counts the fictitious 1900-02-29 as day 60, so serials
/// before it are shifted by one day.
pub fn serial_to_timestamp(serial: Decimal, date_system: DateSystem) -> Option<String> {
    if serial.is_sign_negative() {
        return None;
    }

    let mut days = serial.trunc().to_i64()?;
    let seconds = (serial.fract() * Decimal::from(SECONDS_PER_DAY)).round().to_i64()?;

    let epoch = match date_system {
        DateSystem::V1900 => {
            if days < 60 {
                days += 1;
            }
            NaiveDate::from_ymd_opt(1899, 12, 30)?
        },
        DateSystem::V1904 => NaiveDate::from_ymd_opt(1904, 1, 1)?,
    };

    let datetime = epoch
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::try_days(days)?)?
        .checked_add_signed(Duration::try_seconds(seconds)?)?;
    Some(datetime.format(TIMESTAMP_FORMAT).to_string())
}

fn normalize_iso_date(text: &str) -> String {
    let text = text.trim();
    if let Ok(datetime) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return datetime.format(TIMESTAMP_FORMAT).to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        && let Some(datetime) = date.and_hms_opt(0, 0, 0)
    {
        return datetime.format(TIMESTAMP_FORMAT).to_string();
    }
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(text: &str) -> RawCell {
        RawCell::Number {
            text: text.to_string(),
            date_style: false,
        }
    }

    fn date(text: &str) -> RawCell {
        RawCell::Number {
            text: text.to_string(),
            date_style: true,
        }
    }

    #[test]
    fn test_whole_numbers_become_integers() {
        assert_eq!(normalize_cell(&number("12"), DateSystem::V1900), CellValue::Integer(12));
        assert_eq!(normalize_cell(&number("12.0"), DateSystem::V1900), CellValue::Integer(12));
        assert_eq!(normalize_cell(&number("1.2E+3"), DateSystem::V1900), CellValue::Integer(1200));
        assert_eq!(normalize_cell(&number("-7"), DateSystem::V1900), CellValue::Integer(-7));
    }

    #[test]
    fn test_fractions_are_exact_decimals() {
        let value = normalize_cell(&number("12.5"), DateSystem::V1900);
        assert_eq!(value, CellValue::Decimal(Decimal::new(125, 1)));
        assert_eq!(value.to_string(), "12.5");

        let value = normalize_cell(&number("0.1"), DateSystem::V1900);
        assert_eq!(value.to_string(), "0.1");

        let value = normalize_cell(&number("1.5E-3"), DateSystem::V1900);
        assert_eq!(value.to_string(), "0.0015");

        // Decimals stay numbers and keep their digits; text stays text
        assert_eq!(serde_json::to_string(&CellValue::Decimal(Decimal::new(125, 1))).unwrap(), "12.5");
        assert_eq!(serde_json::to_string(&CellValue::Decimal(Decimal::new(1250, 2))).unwrap(), "12.50");
        assert_eq!(serde_json::to_string(&CellValue::String("12.5".into())).unwrap(), "\"12.5\"");
    }

    #[test]
    fn test_blank_and_error_cells_are_null() {
        assert_eq!(normalize_cell(&RawCell::Empty, DateSystem::V1900), CellValue::Null);
        assert_eq!(normalize_cell(&RawCell::Text("   ".into()), DateSystem::V1900), CellValue::Null);
        assert_eq!(normalize_cell(&RawCell::Error("#N/A".into()), DateSystem::V1900), CellValue::Null);
    }

    #[test]
    fn test_text_and_bool_pass_through() {
        assert_eq!(
            normalize_cell(&RawCell::Text(" Blue Mug ".into()), DateSystem::V1900),
            CellValue::String(" Blue Mug ".into())
        );
        assert_eq!(normalize_cell(&RawCell::Bool(false), DateSystem::V1900), CellValue::Bool(false));
        // Unparseable numeric text falls through as text
        assert_eq!(
            normalize_cell(&number("1E+999"), DateSystem::V1900),
            CellValue::String("1E+999".into())
        );
    }

    #[test]
    fn test_date_serials() {
        assert_eq!(
            normalize_cell(&date("45292"), DateSystem::V1900),
            CellValue::Timestamp("2024-01-01T00:00:00".into())
        );
        assert_eq!(
            normalize_cell(&date("45292.75"), DateSystem::V1900),
            CellValue::Timestamp("2024-01-01T18:00:00".into())
        );
        assert_eq!(
            normalize_cell(&date("1"), DateSystem::V1900),
            CellValue::Timestamp("1900-01-01T00:00:00".into())
        );
        assert_eq!(
            normalize_cell(&date("61"), DateSystem::V1900),
            CellValue::Timestamp("1900-03-01T00:00:00".into())
        );
        assert_eq!(
            normalize_cell(&date("0"), DateSystem::V1904),
            CellValue::Timestamp("1904-01-01T00:00:00".into())
        );
        // Negative serials are not dates
        assert_eq!(normalize_cell(&date("-1"), DateSystem::V1900), CellValue::Integer(-1));
    }

    #[test]
    fn test_iso_dates() {
        assert_eq!(
            normalize_cell(&RawCell::IsoDate("2024-03-05".into()), DateSystem::V1900),
            CellValue::Timestamp("2024-03-05T00:00:00".into())
        );
        assert_eq!(
            normalize_cell(&RawCell::IsoDate("2024-03-05T10:20:30.000".into()), DateSystem::V1900),
            CellValue::Timestamp("2024-03-05T10:20:30".into())
        );
    }

    #[test]
    fn test_as_key() {
        assert_eq!(CellValue::Integer(100).as_key().as_deref(), Some("100"));
        assert_eq!(CellValue::String("  AB 12 ".into()).as_key().as_deref(), Some("AB 12"));
        assert_eq!(CellValue::Decimal(Decimal::new(125, 1)).as_key().as_deref(), Some("12.5"));
        assert_eq!(CellValue::String("  ".into()).as_key(), None);
        assert_eq!(CellValue::Null.as_key(), None);
    }
}
