//! Split spreadsheet records into age groups, with per-group statistics.
//!
//! A source workbook (xlsx, xls or csv) is read into sheets of rows. Every row
//! gets an age derived from its birth date; the rows are then filtered by a
//! primary age range and any number of named custom ranges. Each group
//! carries an age histogram, a gender distribution and a city distribution,
//! and all groups are exported again as sheets of a new xlsx workbook.
//!
//! ```no_run
//! use agesheet::{classify::NamedRange, config::FilterConfig, pipeline, report};
//!
//! # fn main() -> Result<(), agesheet::error::AgeSheetError> {
//! let config = FilterConfig::default().with_custom(NamedRange::new("Senior", 66, 150)?);
//! let outcome = pipeline::process_file("leden.xlsx", &config)?;
//! println!("{}", report::render(&outcome.result));
//! outcome.write_export(agesheet::config::DEFAULT_EXPORT_NAME)?;
//! # Ok(())
//! # }
//! ```

pub mod age;
pub mod classify;
pub mod config;
pub mod error;
pub mod export;
pub mod fields;
pub mod model;
pub mod pipeline;
pub mod reader;
pub mod report;
pub mod stats;
pub mod workbook;

pub type Result<T> = std::result::Result<T, error::AgeSheetError>;
