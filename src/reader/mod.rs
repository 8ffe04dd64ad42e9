//! Source workbooks: xlsx, xls and csv into named sheets of [`Row`]s.
//!
//! The first non-empty row of a sheet names the fields. Header cells that
//! are empty become `__EMPTY`, `__EMPTY_1`, ...; repeated names get a
//! `_1`, `_2`, ... suffix. Columns past the header's last cell continue
//! the `__EMPTY_n` count. Blank cells are left out of the row and rows
//! without any value are skipped.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::AgeSheetError;
use crate::model::{FieldValue, Row, SourceWorkbook};
use crate::Result;

pub mod csv;
pub mod xls;
pub mod xlsx;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Xlsx,
    Xls,
    Csv,
}

impl SourceFormat {
    /// Pick a format from the extension, falling back to the file signature.
    pub fn detect(path: Option<&Path>, bytes: &[u8]) -> SourceFormat {
        let ext = path
            .and_then(|p| p.extension())
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("xlsx") | Some("xlsm") => SourceFormat::Xlsx,
            Some("xls") => SourceFormat::Xls,
            Some("csv") => SourceFormat::Csv,
            _ if bytes.starts_with(ZIP_MAGIC) => SourceFormat::Xlsx,
            _ if bytes.starts_with(OLE_MAGIC) => SourceFormat::Xls,
            _ => SourceFormat::Csv,
        }
    }
}

pub fn read_path(path: impl AsRef<Path>) -> Result<SourceWorkbook> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| AgeSheetError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let format = SourceFormat::detect(Some(path), &bytes);
    debug!(path = %path.display(), ?format, bytes = bytes.len(), "read source file");
    read_bytes(bytes, format)
}

pub fn read_bytes(bytes: Vec<u8>, format: SourceFormat) -> Result<SourceWorkbook> {
    match format {
        SourceFormat::Xlsx => xlsx::XlsxReader::from_bytes(bytes)?.read_workbook(),
        SourceFormat::Xls => xls::read_xls_bytes(bytes),
        SourceFormat::Csv => self::csv::read_csv(bytes.as_slice()),
    }
}

/// Turn a grid of optional cells into keyed rows using its first non-empty row as header.
pub(crate) fn rows_from_grid(grid: Vec<Vec<Option<FieldValue>>>) -> Vec<Row> {
    let lines: Vec<_> = grid
        .into_iter()
        .filter(|cells| cells.iter().any(Option::is_some))
        .collect();
    let width = lines.iter().map(Vec::len).max().unwrap_or(0);

    let mut lines = lines.into_iter();
    let Some(mut header_cells) = lines.next() else {
        return Vec::new();
    };
    header_cells.resize(width, None);
    let headers = header_names(&header_cells);

    lines
        .filter_map(|cells| {
            let row: Row = cells
                .into_iter()
                .enumerate()
                .filter_map(|(col, cell)| {
                    let value = cell?;
                    Some((headers.get(col)?.clone(), value))
                })
                .collect();
            (!row.is_empty()).then_some(row)
        })
        .collect()
}

fn header_names(cells: &[Option<FieldValue>]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut empty_count = 0;
    cells
        .iter()
        .map(|cell| {
            let base = match cell {
                Some(v) => v.to_string(),
                None => {
                    let name = empty_header(empty_count);
                    empty_count += 1;
                    name
                }
            };
            let n = seen.entry(base.clone()).or_insert(0);
            let name = if *n == 0 {
                base
            } else {
                format!("{base}_{n}")
            };
            *n += 1;
            name
        })
        .collect()
}

fn empty_header(n: usize) -> String {
    if n == 0 {
        "__EMPTY".to_string()
    } else {
        format!("__EMPTY_{n}")
    }
}
