use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};

use crate::{
    Result,
    workbook::{cell::CellValue, make_cell_ref, write_cell},
};

const SHEET_HEAD: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    r#"<sheetViews><sheetView workbookViewId="0"/></sheetViews>"#,
    r#"<sheetFormatPr defaultRowHeight="15"/>"#,
    r#"<sheetData>"#,
);

const SHEET_TAIL: &str = concat!(
    r#"</sheetData>"#,
    r#"<pageMargins left="0.75" right="0.75" top="1" bottom="1" header="0.5" footer="0.5"/>"#,
    r#"</worksheet>"#,
);

/// Streams `<sheetData>` rows to a temporary file until the workbook is finished.
pub struct SheetWriter {
    name: String,
    pub(crate) temp: BufWriter<File>,
    current_row: u32,
    column_styles: HashMap<u32, usize>,
}

impl SheetWriter {
    pub(crate) fn new(name: &str) -> Result<Self> {
        let mut writer = BufWriter::new(tempfile::tempfile()?);
        writer.write_all(SHEET_HEAD.as_bytes())?;

        Ok(SheetWriter {
            name: name.to_string(),
            temp: writer,
            current_row: 0,
            column_styles: HashMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows_written(&self) -> u32 {
        self.current_row
    }

    /// Style applied to every later cell of 0-based column `col` without a row style.
    pub fn set_column_style(&mut self, col: u32, style_idx: usize) {
        self.column_styles.insert(col, style_idx);
    }

    pub fn write_row(&mut self, cells: &[CellValue]) -> Result<()> {
        self.write_row_inner(cells, None)
    }

    pub fn write_row_with_style(&mut self, cells: &[CellValue], style_idx: usize) -> Result<()> {
        self.write_row_inner(cells, Some(style_idx))
    }

    fn write_row_inner(&mut self, cells: &[CellValue], row_style: Option<usize>) -> Result<()> {
        self.current_row += 1;
        let row = self.current_row;

        if cells.is_empty() {
            return Ok(());
        }

        write!(self.temp, "<row r=\"{row}\">")?;
        for (col_idx, cell) in cells.iter().enumerate() {
            let col = col_idx as u32;
            let style = row_style.or_else(|| self.column_styles.get(&col).copied());
            write_cell(&mut self.temp, &make_cell_ref(row, col), cell, style)?;
        }
        write!(self.temp, "</row>")?;

        Ok(())
    }

    pub(crate) fn finalize(&mut self) -> Result<()> {
        self.temp.write_all(SHEET_TAIL.as_bytes())?;
        self.temp.flush()?;
        Ok(())
    }
}
