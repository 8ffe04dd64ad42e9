use std::collections::HashMap;
use std::io::{self, Cursor, Read, Seek};

use quick_xml::Reader as XmlReader;
use quick_xml::events::{BytesStart, BytesText, Event};
use tracing::debug;
use zip::ZipArchive;

use crate::Result;
use crate::error::AgeSheetError;
use crate::model::{FieldValue, Sheet, SourceWorkbook};
use crate::reader::rows_from_grid;

fn attr_val(attr: &quick_xml::events::attributes::Attribute) -> String {
    let raw = std::str::from_utf8(attr.value.as_ref()).unwrap_or("");
    quick_xml::escape::unescape(raw)
        .unwrap_or_default()
        .into_owned()
}

fn text_val(e: &BytesText) -> String {
    let raw = std::str::from_utf8(e).unwrap_or("");
    quick_xml::escape::unescape(raw)
        .unwrap_or_default()
        .into_owned()
}

/// Last column Excel allows (`XFD`).
const MAX_COL: u32 = 16_383;

fn malformed(what: impl std::fmt::Display) -> AgeSheetError {
    AgeSheetError::MalformedWorkbook(what.to_string())
}

/// Reads sheets of an xlsx container in workbook order.
pub struct XlsxReader<R: Read + Seek> {
    archive: ZipArchive<R>,
    sheet_paths: HashMap<String, String>,
    sheet_order: Vec<String>,
    shared_strings: Vec<String>,
}

impl XlsxReader<Cursor<Vec<u8>>> {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        XlsxReader::new(Cursor::new(bytes))
    }
}

impl<R: Read + Seek> XlsxReader<R> {
    pub fn new(inner: R) -> Result<Self> {
        let mut archive = ZipArchive::new(inner)?;

        let workbook = slurp_entry(&mut archive, "xl/workbook.xml")?;
        let (sheet_order, rid_to_name) = parse_workbook(&workbook)?;
        let rels = slurp_entry(&mut archive, "xl/_rels/workbook.xml.rels")?;
        let rid_to_path = parse_workbook_rels(&rels)?;

        let sheet_paths: HashMap<String, String> = rid_to_name
            .into_iter()
            .filter_map(|(rid, name)| rid_to_path.get(&rid).map(|p| (name, p.clone())))
            .collect();

        let shared_strings = match slurp_optional(&mut archive, "xl/sharedStrings.xml")? {
            Some(bytes) => parse_shared_strings(&bytes)?,
            None => Vec::new(),
        };

        debug!(sheets = ?sheet_order, shared_strings = shared_strings.len(), "opened xlsx");

        Ok(XlsxReader {
            archive,
            sheet_paths,
            sheet_order,
            shared_strings,
        })
    }

    pub fn read_sheet(&mut self, sheet_name: &str) -> Result<Sheet> {
        let zip_path = self
            .sheet_paths
            .get(sheet_name)
            .ok_or_else(|| AgeSheetError::NotFound(sheet_name.to_string()))?
            .clone();
        let xml = slurp_entry(&mut self.archive, &zip_path)?;
        let grid = parse_sheet(&xml, &self.shared_strings)?;
        let rows = rows_from_grid(grid);
        debug!(sheet = sheet_name, rows = rows.len(), "parsed sheet");
        Ok(Sheet::new(sheet_name, rows))
    }

    pub fn read_workbook(mut self) -> Result<SourceWorkbook> {
        let names = self.sheet_order.clone();
        let sheets = names
            .iter()
            .map(|name| self.read_sheet(name))
            .collect::<Result<Vec<_>>>()?;
        Ok(SourceWorkbook::new(sheets))
    }
}

#[derive(Clone, Copy)]
enum CellType {
    Number,
    SharedStr,
    Inline,
    Bool,
    Str,
    Error,
    Date,
}

impl CellType {
    fn from_attr(t: &str) -> CellType {
        match t {
            "s" => CellType::SharedStr,
            "inlineStr" => CellType::Inline,
            "b" => CellType::Bool,
            "str" => CellType::Str,
            "e" => CellType::Error,
            "d" => CellType::Date,
            _ => CellType::Number,
        }
    }
}

struct CellStart {
    col: Option<u32>,
    cell_type: CellType,
}

fn cell_start(e: &BytesStart) -> CellStart {
    let mut col = None;
    let mut cell_type = CellType::Number;
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"r" => col = col_ref_to_index(&attr_val(&attr)),
            b"t" => cell_type = CellType::from_attr(&attr_val(&attr)),
            _ => {}
        }
    }
    CellStart { col, cell_type }
}

fn cell_value(raw: &str, cell_type: CellType, shared: &[String]) -> Option<FieldValue> {
    let value = match cell_type {
        CellType::SharedStr => {
            let idx: usize = raw.trim().parse().ok()?;
            FieldValue::Text(shared.get(idx)?.clone())
        }
        CellType::Bool => FieldValue::Bool(raw.trim() == "1"),
        CellType::Number => match raw.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => FieldValue::Number(n),
            _ if raw.trim().is_empty() => return None,
            _ => FieldValue::text(raw),
        },
        CellType::Inline | CellType::Str | CellType::Error | CellType::Date => {
            FieldValue::text(raw)
        }
    };
    match &value {
        FieldValue::Text(s) if s.is_empty() => None,
        _ => Some(value),
    }
}

/// Cells of `<sheetData>`, row by row, placed at their referenced column.
fn parse_sheet(xml: &[u8], shared: &[String]) -> Result<Vec<Vec<Option<FieldValue>>>> {
    let mut reader = XmlReader::from_reader(xml);
    let mut buf = Vec::new();

    let mut grid: Vec<Vec<Option<FieldValue>>> = Vec::new();
    let mut row: Vec<Option<FieldValue>> = Vec::new();
    let mut cell: Option<CellStart> = None;
    let mut value = String::new();
    let mut in_value = false;
    let mut in_phonetic = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"row" => row.clear(),
                b"c" => {
                    cell = Some(cell_start(e));
                    value.clear();
                }
                b"v" | b"t" if !in_phonetic => in_value = true,
                b"rPh" => in_phonetic = true,
                _ => {}
            },
            Event::Empty(ref e) => match e.local_name().as_ref() {
                b"row" => grid.push(Vec::new()),
                b"c" => {
                    let start = cell_start(e);
                    place(&mut row, start.col, None)?;
                }
                _ => {}
            },
            Event::Text(ref e) if in_value => value.push_str(&text_val(e)),
            Event::CData(ref e) if in_value => {
                value.push_str(&String::from_utf8_lossy(e));
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"v" | b"t" => in_value = false,
                b"rPh" => in_phonetic = false,
                b"c" => {
                    if let Some(start) = cell.take() {
                        let v = cell_value(&value, start.cell_type, shared);
                        place(&mut row, start.col, v)?;
                    }
                }
                b"row" => grid.push(std::mem::take(&mut row)),
                b"sheetData" => break,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(grid)
}

/// Put a cell at `col`, or after the previous one when the reference is missing.
fn place(
    row: &mut Vec<Option<FieldValue>>,
    col: Option<u32>,
    value: Option<FieldValue>,
) -> Result<()> {
    let col = col.map_or(row.len(), |c| c as usize);
    if col > MAX_COL as usize {
        return Err(malformed(format!("cell column {} is past XFD", col + 1)));
    }
    if row.len() <= col {
        row.resize(col + 1, None);
    }
    row[col] = value;
    Ok(())
}

fn parse_workbook(bytes: &[u8]) -> Result<(Vec<String>, HashMap<String, String>)> {
    let mut xml = XmlReader::from_reader(bytes);
    xml.config_mut().trim_text(true);

    let mut order = Vec::new();
    let mut rid_map = HashMap::new();
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Empty(ref e) | Event::Start(ref e) if e.local_name().as_ref() == b"sheet" => {
                let (mut name, mut rid) = (String::new(), String::new());
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"name" => name = attr_val(&attr),
                        b"r:id" | b"id" => rid = attr_val(&attr),
                        _ => {}
                    }
                }
                if !name.is_empty() && !rid.is_empty() {
                    order.push(name.clone());
                    rid_map.insert(rid, name);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok((order, rid_map))
}

fn parse_workbook_rels(bytes: &[u8]) -> Result<HashMap<String, String>> {
    let mut xml = XmlReader::from_reader(bytes);
    xml.config_mut().trim_text(true);

    let mut map = HashMap::new();
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Empty(ref e) | Event::Start(ref e)
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let (mut id, mut target, mut is_sheet) = (String::new(), String::new(), false);
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Id" => id = attr_val(&attr),
                        b"Target" => target = attr_val(&attr),
                        b"Type" => is_sheet = attr_val(&attr).ends_with("/worksheet"),
                        _ => {}
                    }
                }
                if is_sheet && !id.is_empty() {
                    map.insert(id, normalize_path(&target));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(map)
}

fn parse_shared_strings(bytes: &[u8]) -> Result<Vec<String>> {
    let mut xml = XmlReader::from_reader(bytes);

    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_t = false;
    let mut in_phonetic = false;
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"si" => current.clear(),
                b"t" if !in_phonetic => in_t = true,
                b"rPh" => in_phonetic = true,
                _ => {}
            },
            Event::Empty(ref e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::End(ref e) => match e.local_name().as_ref() {
                b"si" => strings.push(std::mem::take(&mut current)),
                b"t" => in_t = false,
                b"rPh" => in_phonetic = false,
                _ => {}
            },
            Event::Text(ref e) if in_t => current.push_str(&text_val(e)),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(strings)
}

fn slurp_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<Vec<u8>> {
    slurp_optional(archive, path)?.ok_or_else(|| malformed(format!("missing part '{path}'")))
}

fn slurp_optional<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> Result<Option<Vec<u8>>> {
    let mut entry = match archive.by_name(path) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut buf = Vec::with_capacity(entry.size() as usize);
    io::copy(&mut entry, &mut buf)?;
    Ok(Some(buf))
}

fn normalize_path(target: &str) -> String {
    let t = target.trim_start_matches('/');
    if t.starts_with("xl/") {
        t.to_string()
    } else {
        format!("xl/{t}")
    }
}

/// Zero-based column of a reference like `AB12`.
fn col_ref_to_index(cell_ref: &str) -> Option<u32> {
    let letters = cell_ref.trim_end_matches(|c: char| c.is_ascii_digit());
    if letters.is_empty() || !letters.bytes().all(|b| b.is_ascii_uppercase()) {
        return None;
    }
    letters
        .bytes()
        .try_fold(0u32, |acc, b| acc.checked_mul(26)?.checked_add((b - b'A') as u32 + 1))
        .map(|n| n - 1)
}
