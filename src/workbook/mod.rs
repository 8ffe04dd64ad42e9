use std::{
    collections::HashMap,
    io::{self, Cursor, Seek, SeekFrom, Write},
};

use tracing::debug;
use zip::{ZipWriter, write::SimpleFileOptions};

use crate::{
    Result,
    error::AgeSheetError,
    workbook::{
        cell::CellValue,
        sheet::SheetWriter,
        style::{Style, StyleRegistry},
    },
};
pub mod cell;
pub mod sheet;
pub mod style;

/// Excel refuses longer sheet names.
pub const MAX_SHEET_NAME_LEN: usize = 31;
const FORBIDDEN_SHEET_CHARS: [char; 7] = [':', '\\', '/', '?', '*', '[', ']'];

const RELS_DOT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
    r#"</Relationships>"#,
);

fn workbook_xml(order: &[String]) -> String {
    let mut sheets = String::new();
    for (i, name) in order.iter().enumerate() {
        let sheet_id = i + 1;
        let escaped_name = xml_escape(name);
        sheets.push_str(&format!(
            r#"<sheet name="{escaped_name}" sheetId="{sheet_id}" r:id="rId{sheet_id}"/>"#
        ));
    }

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
            r#"<bookViews><workbookView activeTab="0"/></bookViews>"#,
            r#"<sheets>{}</sheets>"#,
            r#"</workbook>"#,
        ),
        sheets
    )
}

fn workbook_rels_xml(sheet_count: usize) -> String {
    let mut rels = String::new();
    for i in 1..=sheet_count {
        rels.push_str(&format!(
            r#"<Relationship Id="rId{i}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{i}.xml"/>"#
        ));
    }
    let styles_id = sheet_count + 1;
    rels.push_str(&format!(
        r#"<Relationship Id="rId{styles_id}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#
    ));

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            r#"{}"#,
            r#"</Relationships>"#,
        ),
        rels
    )
}

fn content_types_xml(sheet_count: usize) -> String {
    let mut overrides = String::new();
    for i in 1..=sheet_count {
        overrides.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        ));
    }

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
            r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
            r#"{}"#,
            r#"</Types>"#,
        ),
        overrides
    )
}

/// An xlsx file under construction. Sheets keep the order they were added in.
pub struct Workbook {
    sheets: HashMap<String, SheetWriter>,
    insertion_order: Vec<String>,
    style_reg: StyleRegistry,
}

impl Default for Workbook {
    fn default() -> Self {
        Workbook::new()
    }
}

impl Workbook {
    pub fn new() -> Self {
        Workbook {
            sheets: HashMap::new(),
            insertion_order: Vec::new(),
            style_reg: StyleRegistry::new(),
        }
    }

    /// Index to pass to the sheet writers for cells in this style.
    pub fn register_style(&mut self, style: &Style) -> usize {
        self.style_reg.register(style)
    }

    pub fn sheet_names(&self) -> &[String] {
        &self.insertion_order
    }

    pub fn add_sheet(&mut self, name: &str) -> Result<&mut SheetWriter> {
        validate_sheet_name(name)?;
        let lowered = name.to_lowercase();
        if self
            .insertion_order
            .iter()
            .any(|s| s.to_lowercase() == lowered)
        {
            return Err(AgeSheetError::AlreadyExists(name.to_string()));
        }
        let writer = SheetWriter::new(name)?;
        self.insertion_order.push(name.to_string());
        Ok(self.sheets.entry(name.to_string()).or_insert(writer))
    }

    pub fn finish_to_vec(self) -> Result<Vec<u8>> {
        Ok(self.finish_into(Cursor::new(Vec::new()))?.into_inner())
    }

    pub fn finish_into<W: Write + Seek>(mut self, out: W) -> Result<W> {
        if self.insertion_order.is_empty() {
            return Err(AgeSheetError::NotFound(
                "a workbook needs at least one sheet".to_string(),
            ));
        }
        for name in &self.insertion_order {
            match self.sheets.get_mut(name) {
                Some(s) => s.finalize()?,
                None => return Err(AgeSheetError::NotFound(name.clone())),
            }
        }

        let mut zip = ZipWriter::new(out);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        let count = self.insertion_order.len();

        zip_write_str(&mut zip, "[Content_Types].xml", &content_types_xml(count), options)?;
        zip_write_str(&mut zip, "_rels/.rels", RELS_DOT_RELS, options)?;
        zip_write_str(
            &mut zip,
            "xl/workbook.xml",
            &workbook_xml(&self.insertion_order),
            options,
        )?;
        zip_write_str(
            &mut zip,
            "xl/_rels/workbook.xml.rels",
            &workbook_rels_xml(count),
            options,
        )?;
        zip_write_str(&mut zip, "xl/styles.xml", &self.style_reg.to_xml(), options)?;

        for (i, name) in self.insertion_order.iter().enumerate() {
            let sheet = self
                .sheets
                .get_mut(name)
                .ok_or_else(|| AgeSheetError::NotFound(name.clone()))?;
            zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)?;

            let temp_file = sheet.temp.get_mut();
            temp_file.seek(SeekFrom::Start(0))?;
            io::copy(temp_file, &mut zip)?;
            debug!(sheet = %sheet.name(), rows = sheet.rows_written(), "sheet written");
        }

        Ok(zip.finish()?)
    }
}

pub fn validate_sheet_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name.chars().count() > MAX_SHEET_NAME_LEN {
        "longer than 31 characters"
    } else if name.contains(FORBIDDEN_SHEET_CHARS) {
        "contains one of : \\ / ? * [ ]"
    } else {
        return Ok(());
    };
    Err(AgeSheetError::InvalidSheetName {
        name: name.to_string(),
        reason,
    })
}

pub(crate) fn make_cell_ref(row: u32, col: u32) -> String {
    format!("{}{}", col_to_letters(col), row)
}

pub(crate) fn col_to_letters(mut col: u32) -> String {
    let mut result = Vec::new();
    loop {
        result.push(char::from(b'A' + (col % 26) as u8));
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    result.iter().rev().collect()
}

pub(crate) fn xml_escape(s: &str) -> String {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

pub(crate) fn write_cell<W: Write>(
    w: &mut W,
    cell_ref: &str,
    value: &CellValue,
    style_idx: Option<usize>,
) -> Result<()> {
    let s = match style_idx {
        Some(0) | None => String::new(),
        Some(n) => format!(" s=\"{n}\""),
    };

    match value {
        CellValue::Number(n) if n.is_finite() => {
            write!(w, "<c r=\"{cell_ref}\"{s}><v>{n}</v></c>")?;
        }
        CellValue::Number(_) | CellValue::Blank => {
            write!(w, "<c r=\"{cell_ref}\"{s}/>")?;
        }
        CellValue::Text(text) => {
            let escaped = xml_escape(text);
            write!(
                w,
                "<c r=\"{cell_ref}\"{s} t=\"inlineStr\"><is><t xml:space=\"preserve\">{escaped}</t></is></c>"
            )?;
        }
        CellValue::Bool(b) => {
            let val = if *b { 1 } else { 0 };
            write!(w, "<c r=\"{cell_ref}\"{s} t=\"b\"><v>{val}</v></c>")?;
        }
    }
    Ok(())
}

pub(crate) fn zip_write_str<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    path: &str,
    content: &str,
    options: SimpleFileOptions,
) -> Result<()> {
    zip.start_file(path, options)?;
    zip.write_all(content.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters() {
        assert_eq!(col_to_letters(0), "A");
        assert_eq!(col_to_letters(25), "Z");
        assert_eq!(col_to_letters(26), "AA");
        assert_eq!(col_to_letters(701), "ZZ");
        assert_eq!(col_to_letters(702), "AAA");
        assert_eq!(make_cell_ref(3, 27), "AB3");
    }

    #[test]
    fn sheet_names_follow_excel_rules() {
        assert!(validate_sheet_name("Data_Senior").is_ok());
        assert!(validate_sheet_name("").is_err());
        assert!(validate_sheet_name("a/b").is_err());
        assert!(validate_sheet_name(&"x".repeat(32)).is_err());
        assert!(validate_sheet_name(&"x".repeat(31)).is_ok());
    }

    #[test]
    fn duplicate_sheet_names_are_rejected_ignoring_case() {
        let mut wb = Workbook::new();
        wb.add_sheet("Data").unwrap();
        assert!(matches!(
            wb.add_sheet("data"),
            Err(AgeSheetError::AlreadyExists(_))
        ));
        wb.add_sheet("Data_Senior").unwrap();
        assert_eq!(wb.sheet_names(), ["Data", "Data_Senior"]);
    }

    #[test]
    fn cells_are_escaped_and_styled() {
        let mut out = Vec::new();
        write_cell(&mut out, "A1", &CellValue::text("a<b & c"), Some(2)).unwrap();
        write_cell(&mut out, "B1", &CellValue::num(42.0), None).unwrap();
        write_cell(&mut out, "C1", &CellValue::num(f64::NAN), None).unwrap();
        let xml = String::from_utf8(out).unwrap();
        assert!(xml.contains(r#"<c r="A1" s="2" t="inlineStr">"#));
        assert!(xml.contains("a&lt;b &amp; c"));
        assert!(xml.contains(r#"<c r="B1"><v>42</v></c>"#));
        assert!(xml.contains(r#"<c r="C1"/>"#));
    }

    #[test]
    fn empty_workbook_cannot_be_finished() {
        assert!(Workbook::new().finish_to_vec().is_err());
    }
}
