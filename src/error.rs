use std::path::PathBuf;

use zip::result::ZipError;

#[derive(Debug, thiserror::Error)]
pub enum AgeSheetError {
    #[error("could not read '{}': {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed workbook: {0}")]
    MalformedWorkbook(String),

    #[error("invalid age range {min}..={max}")]
    InvalidRange { min: i64, max: i64 },

    #[error("invalid filter configuration: {0}")]
    Config(String),

    #[error("sheet '{0}' already exists")]
    AlreadyExists(String),

    #[error("sheet '{0}' not found")]
    NotFound(String),

    #[error("invalid sheet name '{name}': {reason}")]
    InvalidSheetName { name: String, reason: &'static str },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<ZipError> for AgeSheetError {
    fn from(e: ZipError) -> AgeSheetError {
        AgeSheetError::MalformedWorkbook(e.to_string())
    }
}

impl From<quick_xml::Error> for AgeSheetError {
    fn from(e: quick_xml::Error) -> AgeSheetError {
        AgeSheetError::MalformedWorkbook(e.to_string())
    }
}

impl From<calamine::XlsError> for AgeSheetError {
    fn from(e: calamine::XlsError) -> AgeSheetError {
        AgeSheetError::MalformedWorkbook(e.to_string())
    }
}

impl From<csv::Error> for AgeSheetError {
    fn from(e: csv::Error) -> AgeSheetError {
        AgeSheetError::MalformedWorkbook(e.to_string())
    }
}

impl From<toml::de::Error> for AgeSheetError {
    fn from(e: toml::de::Error) -> AgeSheetError {
        AgeSheetError::Config(e.to_string())
    }
}
