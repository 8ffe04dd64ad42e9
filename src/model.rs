use std::fmt;

/// Scalar value of one cell. Blank cells are not stored.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl FieldValue {
    pub fn text(v: impl Into<String>) -> Self {
        FieldValue::Text(v.into())
    }

    /// Empty text and zero fall through alias lookups.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Number(n) => *n == 0.0,
            FieldValue::Bool(b) => !*b,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// One record keyed by column name, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: Vec<(String, FieldValue)>,
}

impl Row {
    pub fn new() -> Self {
        Row::default()
    }

    /// Builder-style insert, used by readers and tests.
    pub fn with(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.set(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Copy of this row with `name` set. An existing column keeps its position.
    pub fn with_field(&self, name: &str, value: FieldValue) -> Row {
        let mut copy = self.clone();
        copy.set(name.to_string(), value);
        copy
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn set(&mut self, name: String, value: FieldValue) {
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }
}

impl FromIterator<(String, FieldValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.set(k, v);
        }
        row
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Row>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Sheet {
            name: name.into(),
            rows,
        }
    }
}

/// Parsed input: sheets in workbook order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceWorkbook {
    pub sheets: Vec<Sheet>,
}

impl SourceWorkbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        SourceWorkbook { sheets }
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|s| s.name.as_str())
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

/// Column names for a set of rows: first row's keys, then new keys as they appear.
pub fn collect_headers<'a>(rows: impl IntoIterator<Item = &'a Row>) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for row in rows {
        for (k, _) in row.iter() {
            if !headers.iter().any(|h| h == k) {
                headers.push(k.to_string());
            }
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_field_copies_and_replaces_in_place() {
        let row = Row::new()
            .with("Naam", FieldValue::text("Jan"))
            .with("Leeftijd", FieldValue::Number(3.0))
            .with("Stad", FieldValue::text("Utrecht"));

        let aged = row.with_field("Leeftijd", FieldValue::Number(40.0));

        assert_eq!(row.get("Leeftijd"), Some(&FieldValue::Number(3.0)));
        let keys: Vec<_> = aged.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Naam", "Leeftijd", "Stad"]);
        assert_eq!(aged.get("Leeftijd"), Some(&FieldValue::Number(40.0)));
    }

    #[test]
    fn headers_follow_first_seen_order() {
        let a = Row::new()
            .with("b", FieldValue::Bool(true))
            .with("a", FieldValue::Bool(true));
        let b = Row::new()
            .with("c", FieldValue::Bool(true))
            .with("a", FieldValue::Bool(true));
        assert_eq!(collect_headers([&a, &b]), vec!["b", "a", "c"]);
    }

    #[test]
    fn numbers_display_without_trailing_zero() {
        assert_eq!(FieldValue::Number(1234.0).to_string(), "1234");
        assert_eq!(FieldValue::Number(1.5).to_string(), "1.5");
    }
}
