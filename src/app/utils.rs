use chrono::{Days, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::error::InvalidRecordError;

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d, %H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

pub fn parse_datetime(field: &str) -> Result<NaiveDateTime, InvalidRecordError> {
    let field = field.trim();

    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(field, format) {
            return Ok(parsed);
        }
    }

    NaiveDate::parse_from_str(field, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| InvalidRecordError::BadTimestamp(field.to_string()))
}

/// Parses a ledger number, tolerating thousands separators.
pub fn parse_decimal(field: &str, field_name: &str) -> Result<Decimal, InvalidRecordError> {
    let cleaned: String = field.trim().chars().filter(|c| *c != ',').collect();

    if cleaned.is_empty() {
        return Err(InvalidRecordError::MissingField(field_name.to_string()));
    }

    cleaned
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map_err(|_| InvalidRecordError::NotNumeric {
            field: field_name.to_string(),
            value: field.to_string(),
        })
}

/// Every calendar day from `start` through `end`, inclusive.
pub fn calendar_days(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    std::iter::successors(Some(start), |d| d.checked_add_days(Days::new(1)))
        .take_while(move |d| *d <= end)
}
