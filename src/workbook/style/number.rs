#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberFormat {
    /// `0`, whole numbers.
    Integer,
}

impl NumberFormat {
    /// Built-in format ids, so the stylesheet needs no `<numFmts>` entries.
    /// Cells without a format use id 0, General.
    pub fn builtin_id(self) -> u32 {
        match self {
            NumberFormat::Integer => 1,
        }
    }
}
