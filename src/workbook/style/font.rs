use crate::workbook::{style::color::Color, xml_escape};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Font {
    pub bold: bool,
    /// Size in points.
    pub size: u32,
    pub color: Option<Color>,
    pub name: String,
}

impl Default for Font {
    fn default() -> Self {
        Font {
            bold: false,
            size: 11,
            color: None,
            name: "Calibri".into(),
        }
    }
}

impl Font {
    pub fn to_xml(&self) -> String {
        let mut xml = String::from("<font>");
        if self.bold {
            xml.push_str("<b/>");
        }
        xml.push_str(&format!("<sz val=\"{}\"/>", self.size));
        if let Some(c) = &self.color {
            xml.push_str(&format!("<color rgb=\"{}\"/>", c.as_argb()));
        }
        xml.push_str(&format!("<name val=\"{}\"/>", xml_escape(&self.name)));
        xml.push_str("</font>");
        xml
    }
}
