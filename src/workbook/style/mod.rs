use std::collections::HashMap;

use crate::workbook::style::{color::Color, fill::Fill, font::Font, number::NumberFormat};
pub mod color;
pub mod fill;
pub mod font;
pub mod number;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Style {
    pub font: Font,
    pub fill: Option<Fill>,
    pub number_format: Option<NumberFormat>,
}

impl Style {
    pub fn new() -> Self {
        Style::default()
    }

    pub fn bold(mut self) -> Self {
        self.font.bold = true;
        self
    }

    pub fn font_color(mut self, hex: &str) -> Self {
        self.font.color = Some(Color::new(hex));
        self
    }

    pub fn bg(mut self, hex: &str) -> Self {
        self.fill = Some(Fill::Solid(Color::new(hex)));
        self
    }

    pub fn format(mut self, fmt: NumberFormat) -> Self {
        self.number_format = Some(fmt);
        self
    }
}

/// Interns fonts, fills and cell formats; the index returned by
/// [`StyleRegistry::register`] is the cell's `s` attribute.
pub struct StyleRegistry {
    fonts: Vec<Font>,
    fills: Vec<Fill>,
    font_index: HashMap<Font, usize>,
    fill_index: HashMap<Fill, usize>,
    xfs: Vec<(usize, usize, u32)>,
    xf_index: HashMap<(usize, usize, u32), usize>,
}

impl Default for StyleRegistry {
    fn default() -> Self {
        StyleRegistry::new()
    }
}

impl StyleRegistry {
    pub fn new() -> Self {
        let mut reg = StyleRegistry {
            fonts: Vec::new(),
            fills: Vec::new(),
            font_index: HashMap::new(),
            fill_index: HashMap::new(),
            xfs: Vec::new(),
            xf_index: HashMap::new(),
        };

        // fills 0 and 1 are reserved by Excel (none, gray125)
        reg.intern_font(Font::default());
        reg.fills.push(Fill::None);
        reg.fill_index.insert(Fill::None, 0);
        reg.fills.push(Fill::None);
        reg.intern_xf(0, 0, 0);

        reg
    }

    pub fn register(&mut self, style: &Style) -> usize {
        let font_id = self.intern_font(style.font.clone());
        let fill_id = match &style.fill {
            Some(fill) => self.intern_fill(fill.clone()),
            None => 0,
        };
        let fmt_id = style
            .number_format
            .map_or(0, NumberFormat::builtin_id);
        self.intern_xf(font_id, fill_id, fmt_id)
    }

    fn intern_font(&mut self, font: Font) -> usize {
        if let Some(&i) = self.font_index.get(&font) {
            return i;
        }
        let i = self.fonts.len();
        self.font_index.insert(font.clone(), i);
        self.fonts.push(font);
        i
    }

    fn intern_fill(&mut self, fill: Fill) -> usize {
        if let Some(&i) = self.fill_index.get(&fill) {
            return i;
        }
        let i = self.fills.len();
        self.fill_index.insert(fill.clone(), i);
        self.fills.push(fill);
        i
    }

    fn intern_xf(&mut self, font_id: usize, fill_id: usize, num_fmt_id: u32) -> usize {
        let key = (font_id, fill_id, num_fmt_id);
        if let Some(&i) = self.xf_index.get(&key) {
            return i;
        }
        let i = self.xfs.len();
        self.xf_index.insert(key, i);
        self.xfs.push(key);
        i
    }

    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
        out.push_str(
            "<styleSheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\">\n",
        );

        out.push_str(&format!("<fonts count=\"{}\">\n", self.fonts.len()));
        for font in &self.fonts {
            out.push_str(&font.to_xml());
            out.push('\n');
        }
        out.push_str("</fonts>\n");

        out.push_str(&format!("<fills count=\"{}\">\n", self.fills.len()));
        for (i, fill) in self.fills.iter().enumerate() {
            if i == 1 {
                out.push_str("<fill><patternFill patternType=\"gray125\"/></fill>\n");
            } else {
                out.push_str(&fill.to_xml());
                out.push('\n');
            }
        }
        out.push_str("</fills>\n");

        out.push_str("<borders count=\"1\">\n");
        out.push_str("<border><left/><right/><top/><bottom/><diagonal/></border>\n");
        out.push_str("</borders>\n");

        out.push_str("<cellStyleXfs count=\"1\">\n");
        out.push_str("<xf numFmtId=\"0\" fontId=\"0\" fillId=\"0\" borderId=\"0\"/>\n");
        out.push_str("</cellStyleXfs>\n");

        out.push_str(&format!("<cellXfs count=\"{}\">\n", self.xfs.len()));
        for (font_id, fill_id, num_fmt_id) in &self.xfs {
            let mut apply = String::new();
            if *font_id != 0 {
                apply.push_str(" applyFont=\"1\"");
            }
            if *fill_id != 0 {
                apply.push_str(" applyFill=\"1\"");
            }
            if *num_fmt_id != 0 {
                apply.push_str(" applyNumberFormat=\"1\"");
            }
            out.push_str(&format!(
                "<xf numFmtId=\"{num_fmt_id}\" fontId=\"{font_id}\" fillId=\"{fill_id}\" borderId=\"0\" xfId=\"0\"{apply}/>\n"
            ));
        }
        out.push_str("</cellXfs>\n");

        out.push_str("<cellStyles count=\"1\">\n");
        out.push_str("<cellStyle name=\"Normal\" xfId=\"0\" builtinId=\"0\"/>\n");
        out.push_str("</cellStyles>\n");

        out.push_str("</styleSheet>");
        out
    }
}
