use std::io::{Cursor, Read, Seek};

use calamine::{Data, Range, Reader, Xls};
use tracing::debug;

use crate::Result;
use crate::model::{FieldValue, Sheet, SourceWorkbook};
use crate::reader::rows_from_grid;

/// Reads every sheet of a legacy BIFF workbook in workbook order.
pub fn read_xls<R: Read + Seek>(inner: R) -> Result<SourceWorkbook> {
    let mut workbook: Xls<R> = Xls::new(inner)?;
    let names = workbook.sheet_names();
    debug!(sheets = ?names, "opened xls");

    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook.worksheet_range(&name)?;
        let rows = rows_from_grid(grid_from_range(&range));
        debug!(sheet = %name, rows = rows.len(), "parsed sheet");
        sheets.push(Sheet::new(name, rows));
    }
    Ok(SourceWorkbook::new(sheets))
}

pub fn read_xls_bytes(bytes: Vec<u8>) -> Result<SourceWorkbook> {
    read_xls(Cursor::new(bytes))
}

/// Cells of the used range; columns left of it are not part of the sheet.
fn grid_from_range(range: &Range<Data>) -> Vec<Vec<Option<FieldValue>>> {
    range
        .rows()
        .map(|cells| cells.iter().map(field_value).collect())
        .collect()
}

fn field_value(cell: &Data) -> Option<FieldValue> {
    let value = match cell {
        Data::Empty => return None,
        Data::Int(n) => FieldValue::Number(*n as f64),
        Data::Float(n) if n.is_finite() => FieldValue::Number(*n),
        Data::Float(_) => return None,
        Data::Bool(b) => FieldValue::Bool(*b),
        Data::DateTime(dt) => FieldValue::Number(dt.as_f64()),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            FieldValue::text(s.as_str())
        }
        Data::Error(e) => FieldValue::text(e.to_string()),
    };
    match &value {
        FieldValue::Text(s) if s.is_empty() => None,
        _ => Some(value),
    }
}
