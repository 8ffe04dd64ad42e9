//! Birth dates and age in completed years.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use crate::fields::BIRTH_DATE;
use crate::model::{FieldValue, Row};

/// Serial day number of 1970-01-01 in the 1900 date system.
pub const UNIX_EPOCH_SERIAL: f64 = 25569.0;
const MILLIS_PER_DAY: f64 = 86_400.0 * 1000.0;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BirthDate {
    CalendarDate(NaiveDate),
    /// Days since 1899-12-30, as stored in spreadsheet date cells.
    SerialDayNumber(f64),
}

impl BirthDate {
    pub fn from_value(value: &FieldValue) -> Option<BirthDate> {
        match value {
            FieldValue::Number(n) => Some(BirthDate::SerialDayNumber(*n)),
            FieldValue::Text(s) => parse_date(s).map(BirthDate::CalendarDate),
            FieldValue::Bool(_) => None,
        }
    }

    pub fn from_row(row: &Row) -> Option<BirthDate> {
        BIRTH_DATE.lookup(row).and_then(BirthDate::from_value)
    }

    pub fn to_date(self) -> Option<NaiveDate> {
        match self {
            BirthDate::CalendarDate(d) => Some(d),
            BirthDate::SerialDayNumber(serial) => {
                if !serial.is_finite() {
                    return None;
                }
                let millis = ((serial - UNIX_EPOCH_SERIAL) * MILLIS_PER_DAY).round();
                if millis.abs() > i64::MAX as f64 {
                    return None;
                }
                DateTime::from_timestamp_millis(millis as i64).map(|dt| dt.date_naive())
            }
        }
    }
}

/// Completed years between `birth` and `today`.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

/// Age for a row, `None` when the birth date is missing or unreadable.
pub fn row_age(row: &Row, today: NaiveDate) -> Option<i32> {
    BirthDate::from_row(row)
        .and_then(BirthDate::to_date)
        .map(|birth| age_on(birth, today))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(d) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}
