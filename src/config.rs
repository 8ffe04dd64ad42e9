//! Filter configuration: the primary range, custom ranges and the reference date.
//!
//! A configuration is built in code or read from TOML:
//!
//! ```toml
//! today = "2024-06-01"          # optional, defaults to the local date
//! primary = { min = 0, max = 150 }
//! # or: preset = "66+ years"
//!
//! [[custom]]
//! name = "Senior"
//! min = 66
//! max = "150"
//! ```
//!
//! Custom entries with an empty name, bounds that are not integers or an
//! inverted range are dropped.

use std::fs;
use std::path::Path;

use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tracing::debug;

use crate::Result;
use crate::classify::{AgeRange, NamedRange, preset};
use crate::error::AgeSheetError;

/// Default file name for the exported workbook.
pub const DEFAULT_EXPORT_NAME: &str = "gefilterde_data.xlsx";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    pub primary: AgeRange,
    pub custom: Vec<NamedRange>,
    /// Reference date for ages; the local date when unset.
    pub today: Option<NaiveDate>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig::new(AgeRange::ALL_AGES)
    }
}

impl FilterConfig {
    pub fn new(primary: AgeRange) -> Self {
        FilterConfig {
            primary,
            custom: Vec::new(),
            today: None,
        }
    }

    pub fn with_custom(mut self, range: NamedRange) -> Self {
        self.custom.push(range);
        self
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn today_or_now(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| AgeSheetError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        FilterConfig::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(text)?;

        let primary = match (raw.primary, raw.preset) {
            (Some(_), Some(_)) => {
                return Err(AgeSheetError::Config(
                    "set either `primary` or `preset`, not both".to_string(),
                ));
            }
            (Some(p), None) => AgeRange::new(p.min, p.max)?,
            (None, Some(label)) => preset(&label)
                .ok_or_else(|| AgeSheetError::Config(format!("unknown preset '{label}'")))?,
            (None, None) => AgeRange::ALL_AGES,
        };

        let today = raw
            .today
            .map(|s| {
                NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                    .map_err(|e| AgeSheetError::Config(format!("today '{s}': {e}")))
            })
            .transpose()?;

        let custom = raw
            .custom
            .into_iter()
            .filter_map(|c| custom_range(&c.name, c.min.as_ref(), c.max.as_ref()))
            .collect();

        Ok(FilterConfig {
            primary,
            custom,
            today,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    primary: Option<RawRange>,
    preset: Option<String>,
    today: Option<String>,
    #[serde(default)]
    custom: Vec<RawCustom>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRange {
    min: i32,
    max: i32,
}

#[derive(Debug, Deserialize)]
struct RawCustom {
    #[serde(default)]
    name: String,
    min: Option<Bound>,
    max: Option<Bound>,
}

/// A bound as typed by a user: a number or free text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Bound {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Bound {
    pub fn to_int(&self) -> Option<i32> {
        match self {
            Bound::Int(n) => i32::try_from(*n).ok(),
            Bound::Float(f) if f.is_finite() => i32::try_from(f.trunc() as i64).ok(),
            Bound::Float(_) => None,
            Bound::Text(s) => parse_int_prefix(s),
        }
    }
}

/// Build a custom range from loosely typed input, or drop it.
pub fn custom_range(name: &str, min: Option<&Bound>, max: Option<&Bound>) -> Option<NamedRange> {
    let name = name.trim();
    let (Some(lo), Some(hi)) = (min.and_then(Bound::to_int), max.and_then(Bound::to_int)) else {
        debug!(name, "dropping custom range with non-numeric bounds");
        return None;
    };
    match NamedRange::new(name, lo, hi) {
        Ok(range) => Some(range),
        Err(e) => {
            debug!(name, error = %e, "dropping custom range");
            None
        }
    }
}

/// Leading integer of `s` the way form fields are read: leading whitespace,
/// an optional sign, then digits; trailing text is ignored.
pub fn parse_int_prefix(s: &str) -> Option<i32> {
    let s = s.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1i64, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let digits: &str = &rest[..rest.bytes().take_while(u8::is_ascii_digit).count()];
    if digits.is_empty() {
        return None;
    }
    let n: i64 = digits.parse().ok()?;
    i32::try_from(sign * n).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_int_like_a_form_field() {
        assert_eq!(parse_int_prefix("42"), Some(42));
        assert_eq!(parse_int_prefix("  7 years"), Some(7));
        assert_eq!(parse_int_prefix("-3"), Some(-3));
        assert_eq!(parse_int_prefix("3.9"), Some(3));
        assert_eq!(parse_int_prefix("abc"), None);
        assert_eq!(parse_int_prefix(""), None);
        assert_eq!(parse_int_prefix("-"), None);
        assert_eq!(parse_int_prefix("99999999999"), None);
    }

    #[test]
    fn toml_with_custom_ranges() {
        let config = FilterConfig::from_toml(
            r#"
            today = "2024-06-01"
            primary = { min = 18, max = 65 }

            [[custom]]
            name = " Senior "
            min = 66
            max = "150"

            [[custom]]
            name = ""
            min = 1
            max = 2

            [[custom]]
            name = "Broken"
            min = "oud"
            max = 9

            [[custom]]
            name = "Inverted"
            min = 40
            max = 30

            [[custom]]
            name = "Kids"
            min = 0.0
            max = "12"
            "#,
        )
        .unwrap();

        assert_eq!(config.primary, AgeRange::new(18, 65).unwrap());
        assert_eq!(config.today, NaiveDate::from_ymd_opt(2024, 6, 1));
        assert_eq!(
            config.custom,
            vec![
                NamedRange::new("Senior", 66, 150).unwrap(),
                NamedRange::new("Kids", 0, 12).unwrap(),
            ]
        );
    }

    #[test]
    fn preset_and_defaults() {
        let config = FilterConfig::from_toml(r#"preset = "13-17 years""#).unwrap();
        assert_eq!(config.primary, AgeRange::new(13, 17).unwrap());
        assert!(config.custom.is_empty());
        assert_eq!(config.today, None);

        assert_eq!(FilterConfig::from_toml("").unwrap(), FilterConfig::default());
    }

    #[test]
    fn bad_primary_is_an_error() {
        assert!(matches!(
            FilterConfig::from_toml("primary = { min = 50, max = 10 }"),
            Err(AgeSheetError::InvalidRange { .. })
        ));
        assert!(matches!(
            FilterConfig::from_toml(r#"preset = "ancient""#),
            Err(AgeSheetError::Config(_))
        ));
        assert!(matches!(
            FilterConfig::from_toml("primary = { min = 1, max = 2 }\npreset = \"All ages\""),
            Err(AgeSheetError::Config(_))
        ));
        assert!(matches!(
            FilterConfig::from_toml("colour = 1"),
            Err(AgeSheetError::Config(_))
        ));
    }
}
