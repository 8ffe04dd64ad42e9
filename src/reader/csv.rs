use std::io::Read;

use crate::Result;
use crate::model::{FieldValue, Sheet, SourceWorkbook};
use crate::reader::rows_from_grid;

/// Name given to the only sheet of a csv source.
pub const CSV_SHEET_NAME: &str = "Sheet1";

pub fn read_csv<R: Read>(input: R) -> Result<SourceWorkbook> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record?;
        grid.push(record.iter().map(infer_value).collect::<Vec<_>>());
    }

    let rows = rows_from_grid(grid);
    tracing::debug!(rows = rows.len(), "parsed csv");
    Ok(SourceWorkbook::new(vec![Sheet::new(CSV_SHEET_NAME, rows)]))
}

/// Numbers and booleans are recognized; everything else stays text.
fn infer_value(raw: &str) -> Option<FieldValue> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(n) = trimmed.parse::<f64>() {
        if n.is_finite() {
            return Some(FieldValue::Number(n));
        }
    }
    match trimmed.to_ascii_uppercase().as_str() {
        "TRUE" => Some(FieldValue::Bool(true)),
        "FALSE" => Some(FieldValue::Bool(false)),
        _ => Some(FieldValue::text(raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Row;
    use pretty_assertions::assert_eq;

    #[test]
    fn csv_becomes_one_sheet_with_typed_values() {
        let data = "Naam,Geboortedatum,Lid\nAns,1990-06-15,TRUE\nBob,36526,\n";
        let wb = read_csv(data.as_bytes()).unwrap();
        assert_eq!(wb.sheets.len(), 1);
        assert_eq!(wb.sheets[0].name, "Sheet1");
        assert_eq!(
            wb.sheets[0].rows,
            vec![
                Row::new()
                    .with("Naam", FieldValue::text("Ans"))
                    .with("Geboortedatum", FieldValue::text("1990-06-15"))
                    .with("Lid", FieldValue::Bool(true)),
                Row::new()
                    .with("Naam", FieldValue::text("Bob"))
                    .with("Geboortedatum", FieldValue::Number(36526.0)),
            ]
        );
    }

    #[test]
    fn nan_and_infinity_stay_text() {
        assert_eq!(infer_value("NaN"), Some(FieldValue::text("NaN")));
        assert_eq!(infer_value("inf"), Some(FieldValue::text("inf")));
        assert_eq!(infer_value(" 7 "), Some(FieldValue::Number(7.0)));
        assert_eq!(infer_value("  "), None);
    }
}
