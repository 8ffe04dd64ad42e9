use crate::model::FieldValue;

/// Value of one exported cell.
pub enum CellValue<'a> {
    /// Excel stores every number as f64.
    Number(f64),
    /// Written as an inline string, no sharedStrings part.
    Text(&'a str),
    Bool(bool),
    Blank,
}

impl<'a> CellValue<'a> {
    pub fn num(v: f64) -> Self {
        CellValue::Number(v)
    }
    pub fn text(v: &'a str) -> Self {
        CellValue::Text(v)
    }
    pub fn bool(v: bool) -> Self {
        CellValue::Bool(v)
    }
}

impl<'a> From<&'a FieldValue> for CellValue<'a> {
    fn from(v: &'a FieldValue) -> Self {
        match v {
            FieldValue::Text(s) => CellValue::Text(s),
            FieldValue::Number(n) => CellValue::Number(*n),
            FieldValue::Bool(b) => CellValue::Bool(*b),
        }
    }
}

impl<'a> From<Option<&'a FieldValue>> for CellValue<'a> {
    fn from(v: Option<&'a FieldValue>) -> Self {
        v.map_or(CellValue::Blank, CellValue::from)
    }
}
