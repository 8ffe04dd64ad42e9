use crate::model::{FieldValue, Row};

/// Name of the derived age column added to every processed row.
pub const AGE_FIELD: &str = "Leeftijd";

/// A semantic column and the header spellings that denote it, in lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub aliases: &'static [&'static str],
}

pub const BIRTH_DATE: Field = Field {
    aliases: &[
        "Geboortedatum",
        "geboortedatum",
        "Geboorte datum",
        "geboorte datum",
    ],
};

pub const GENDER: Field = Field {
    aliases: &["Geslacht", "geslacht", "Gender", "gender"],
};

pub const CITY: Field = Field {
    aliases: &["Woonplaats", "woonplaats", "Stad", "stad", "City", "city"],
};

impl Field {
    /// First alias holding a non-empty value.
    pub fn lookup<'r>(&self, row: &'r Row) -> Option<&'r FieldValue> {
        self.aliases
            .iter()
            .filter_map(|alias| row.get(alias))
            .find(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_non_empty_alias_wins() {
        let row = Row::new()
            .with("gender", FieldValue::text("f"))
            .with("Geslacht", FieldValue::text(""))
            .with("geslacht", FieldValue::text("M"));
        assert_eq!(GENDER.lookup(&row), Some(&FieldValue::text("M")));
    }

    #[test]
    fn missing_field_is_none() {
        let row = Row::new().with("Naam", FieldValue::text("Piet"));
        assert_eq!(CITY.lookup(&row), None);
        assert_eq!(BIRTH_DATE.lookup(&row), None);
    }
}
