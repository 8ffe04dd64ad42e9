use crate::Result;
use crate::fields::AGE_FIELD;
use crate::model::collect_headers;
use crate::pipeline::{GroupResult, WorkbookResult};
use crate::workbook::{
    Workbook,
    cell::CellValue,
    sheet::SheetWriter,
    style::{Style, number::NumberFormat},
};

const HEADER_FILL: &str = "D9E1F2";
const HEADER_TEXT: &str = "1F3864";

/// One sheet per group, in result order, as xlsx bytes.
pub fn export_groups(result: &WorkbookResult) -> Result<Vec<u8>> {
    let mut wb = Workbook::new();
    let header_style = wb.register_style(
        &Style::new()
            .bold()
            .font_color(HEADER_TEXT)
            .bg(HEADER_FILL),
    );
    let age_style = wb.register_style(&Style::new().format(NumberFormat::Integer));

    for group in result.groups() {
        let sheet = wb.add_sheet(&group.label)?;
        write_group(sheet, group, header_style, age_style)?;
    }
    wb.finish_to_vec()
}

/// Header row then the group's rows; an empty group leaves the sheet empty.
fn write_group(
    sheet: &mut SheetWriter,
    group: &GroupResult,
    header_style: usize,
    age_style: usize,
) -> Result<()> {
    if group.rows.is_empty() {
        return Ok(());
    }
    let headers = collect_headers(group.rows.iter().map(|r| &r.row));
    if let Some(col) = headers.iter().position(|h| h == AGE_FIELD) {
        sheet.set_column_style(col as u32, age_style);
    }

    let header_cells: Vec<CellValue> = headers.iter().map(|h| CellValue::text(h)).collect();
    sheet.write_row_with_style(&header_cells, header_style)?;

    for aged in &group.rows {
        let cells: Vec<CellValue> = headers
            .iter()
            .map(|h| CellValue::from(aged.row.get(h)))
            .collect();
        sheet.write_row(&cells)?;
    }
    Ok(())
}
