use std::fmt;

use crate::error::AgeSheetError;
use crate::fields::{CITY, GENDER};
use crate::model::Row;
use crate::Result;

/// Label used for rows without a city.
pub const UNKNOWN_CITY: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Unknown];

    pub fn classify(raw: &str) -> Gender {
        match raw.trim().to_lowercase().as_str() {
            "m" | "man" | "male" | "h" => Gender::Male,
            "v" | "vrouw" | "female" | "f" => Gender::Female,
            _ => Gender::Unknown,
        }
    }

    pub fn of_row(row: &Row) -> Gender {
        match GENDER.lookup(row) {
            Some(v) => Gender::classify(&v.to_string()),
            None => Gender::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Trimmed city of a row, or [`UNKNOWN_CITY`].
pub fn city_of(row: &Row) -> String {
    let city = CITY
        .lookup(row)
        .map(|v| v.to_string().trim().to_string())
        .unwrap_or_default();
    if city.is_empty() {
        UNKNOWN_CITY.to_string()
    } else {
        city
    }
}

/// Inclusive age bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AgeRange {
    min: i32,
    max: i32,
}

impl AgeRange {
    pub const ALL_AGES: AgeRange = AgeRange { min: 0, max: 150 };

    pub fn new(min: i32, max: i32) -> Result<Self> {
        if min > max {
            return Err(AgeSheetError::InvalidRange {
                min: min.into(),
                max: max.into(),
            });
        }
        Ok(AgeRange { min, max })
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    /// Unknown ages never match.
    pub fn contains(&self, age: Option<i32>) -> bool {
        age.is_some_and(|a| self.min <= a && a <= self.max)
    }
}

impl fmt::Display for AgeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// Ready-made ranges offered for the primary filter.
pub const PRESETS: [(&str, AgeRange); 8] = [
    ("All ages", AgeRange::ALL_AGES),
    ("0-12 years", AgeRange { min: 0, max: 12 }),
    ("13-17 years", AgeRange { min: 13, max: 17 }),
    ("18-25 years", AgeRange { min: 18, max: 25 }),
    ("26-35 years", AgeRange { min: 26, max: 35 }),
    ("36-50 years", AgeRange { min: 36, max: 50 }),
    ("51-65 years", AgeRange { min: 51, max: 65 }),
    ("66+ years", AgeRange { min: 66, max: 150 }),
];

/// Preset by label, ignoring case.
pub fn preset(label: &str) -> Option<AgeRange> {
    PRESETS
        .iter()
        .find(|(l, _)| l.eq_ignore_ascii_case(label.trim()))
        .map(|(_, r)| *r)
}

/// A custom range, exported as its own sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedRange {
    pub name: String,
    pub range: AgeRange,
}

impl NamedRange {
    pub fn new(name: impl Into<String>, min: i32, max: i32) -> Result<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(AgeSheetError::Config(
                "custom range needs a name".to_string(),
            ));
        }
        Ok(NamedRange {
            name,
            range: AgeRange::new(min, max)?,
        })
    }
}
