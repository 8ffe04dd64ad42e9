//! Age filtering and statistics over a whole workbook.
//!
//! Every sheet gets its ages derived once. The primary range and each
//! custom range then filter that same set independently. Results come out in
//! sheet order, each sheet's custom groups right after its primary group.

use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::Result;
use crate::age::row_age;
use crate::classify::{AgeRange, Gender, NamedRange};
use crate::config::FilterConfig;
use crate::export::export_groups;
use crate::fields::AGE_FIELD;
use crate::model::{FieldValue, Sheet, SourceWorkbook};
use crate::reader;
use crate::stats::{
    AgeHistogram, AgedRow, CityDistribution, GenderDistribution, age_histogram,
    city_distribution, gender_distribution, percentage, tally_cities,
};

#[derive(Debug, Clone, PartialEq)]
pub enum GroupKind {
    Primary,
    Custom(NamedRange),
}

/// One range applied to one sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupResult {
    /// Output sheet name: the source sheet, or `<sheet>_<range name>`.
    pub label: String,
    pub sheet: String,
    pub kind: GroupKind,
    pub range: AgeRange,
    pub rows: Vec<AgedRow>,
    pub ages: AgeHistogram,
    pub genders: GenderDistribution,
    pub cities: CityDistribution,
    pub total_original: usize,
}

impl GroupResult {
    fn build(
        sheet: &str,
        kind: GroupKind,
        range: AgeRange,
        aged: &[AgedRow],
        total_original: usize,
    ) -> GroupResult {
        let label = match &kind {
            GroupKind::Primary => sheet.to_string(),
            GroupKind::Custom(named) => format!("{sheet}_{}", named.name),
        };
        let rows: Vec<AgedRow> = aged
            .iter()
            .filter(|r| range.contains(r.age))
            .cloned()
            .collect();
        debug!(group = %label, %range, filtered = rows.len(), total_original, "group filtered");

        GroupResult {
            ages: age_histogram(&rows),
            genders: gender_distribution(&rows),
            cities: city_distribution(&rows),
            label,
            sheet: sheet.to_string(),
            kind,
            range,
            rows,
            total_original,
        }
    }

    pub fn total_filtered(&self) -> usize {
        self.rows.len()
    }

    /// Share of the sheet's rows that made it into this group.
    pub fn selected_percentage(&self) -> f64 {
        percentage(self.total_filtered(), self.total_original)
    }

    pub fn is_custom(&self) -> bool {
        matches!(self.kind, GroupKind::Custom(_))
    }
}

/// Totals over the primary groups of every sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_original: usize,
    pub total_filtered: usize,
    pub selected_percentage: f64,
    pub genders: GenderDistribution,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookResult {
    groups: Vec<GroupResult>,
    /// City counts over all sheets; only present when no custom range was applied.
    pub combined_cities: Option<CityDistribution>,
}

impl WorkbookResult {
    pub fn groups(&self) -> &[GroupResult] {
        &self.groups
    }

    pub fn get(&self, label: &str) -> Option<&GroupResult> {
        self.groups.iter().find(|g| g.label == label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.label.as_str())
    }

    pub fn primary_groups(&self) -> impl Iterator<Item = &GroupResult> {
        self.groups.iter().filter(|g| !g.is_custom())
    }

    pub fn summary(&self) -> Summary {
        let (mut total_original, mut total_filtered) = (0, 0);
        let (mut male, mut female, mut unknown) = (0, 0, 0);
        for g in self.primary_groups() {
            total_original += g.total_original;
            total_filtered += g.total_filtered();
            male += g.genders.get(Gender::Male).count;
            female += g.genders.get(Gender::Female).count;
            unknown += g.genders.get(Gender::Unknown).count;
        }
        Summary {
            total_original,
            total_filtered,
            selected_percentage: percentage(total_filtered, total_original),
            genders: GenderDistribution::from_counts(male, female, unknown),
        }
    }
}

/// Statistics plus the exported xlsx bytes.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub result: WorkbookResult,
    pub export: Vec<u8>,
}

impl FilterOutcome {
    pub fn write_export(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.export)?;
        Ok(())
    }
}

/// Rows of `sheet` with their age; known ages are also written to [`AGE_FIELD`].
pub fn augment(sheet: &Sheet, today: NaiveDate) -> Vec<AgedRow> {
    let aged: Vec<AgedRow> = sheet
        .rows
        .iter()
        .map(|row| {
            let age = row_age(row, today);
            let row = match age {
                Some(a) => row.with_field(AGE_FIELD, FieldValue::Number(a.into())),
                None => row.clone(),
            };
            AgedRow { age, row }
        })
        .collect();

    let unknown = aged.iter().filter(|r| r.age.is_none()).count();
    if unknown > 0 {
        info!(sheet = %sheet.name, rows = unknown, "rows without a readable birth date are left out");
    }
    aged
}

/// Filter and aggregate every sheet. Pure: no export is produced.
pub fn analyze(workbook: &SourceWorkbook, config: &FilterConfig) -> WorkbookResult {
    let today = config.today_or_now();
    let mut groups = Vec::with_capacity(workbook.sheets.len() * (1 + config.custom.len()));

    for sheet in &workbook.sheets {
        let aged = augment(sheet, today);
        let total = sheet.rows.len();

        groups.push(GroupResult::build(
            &sheet.name,
            GroupKind::Primary,
            config.primary,
            &aged,
            total,
        ));
        for named in &config.custom {
            groups.push(GroupResult::build(
                &sheet.name,
                GroupKind::Custom(named.clone()),
                named.range,
                &aged,
                total,
            ));
        }
    }

    let combined_cities = config.custom.is_empty().then(|| {
        let grand_total: usize = groups.iter().map(GroupResult::total_filtered).sum();
        tally_cities(
            groups
                .iter()
                .flat_map(|g| g.cities.iter().map(|c| (c.key.clone(), c.count))),
            grand_total,
        )
    });

    WorkbookResult {
        groups,
        combined_cities,
    }
}

/// Analyze and export. Any failure aborts the whole run.
pub fn run(workbook: &SourceWorkbook, config: &FilterConfig) -> Result<FilterOutcome> {
    let result = analyze(workbook, config);
    let export = export_groups(&result)?;
    let summary = result.summary();
    info!(
        groups = result.groups().len(),
        total_original = summary.total_original,
        total_filtered = summary.total_filtered,
        export_bytes = export.len(),
        "filter finished"
    );
    Ok(FilterOutcome { result, export })
}

pub fn process_file(path: impl AsRef<Path>, config: &FilterConfig) -> Result<FilterOutcome> {
    let workbook = reader::read_path(path)?;
    run(&workbook, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Row;
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn person(birth: &str, gender: &str, city: &str) -> Row {
        Row::new()
            .with("Geboortedatum", FieldValue::text(birth))
            .with("Geslacht", FieldValue::text(gender))
            .with("Woonplaats", FieldValue::text(city))
    }

    #[test]
    fn age_field_is_added_on_a_copy() {
        let sheet = Sheet::new("Data", vec![person("2000-01-01", "M", "Ede")]);
        let aged = augment(&sheet, today());
        assert_eq!(aged[0].age, Some(24));
        assert_eq!(aged[0].row.get(AGE_FIELD), Some(&FieldValue::Number(24.0)));
        assert_eq!(sheet.rows[0].get(AGE_FIELD), None);
    }

    #[test]
    fn unknown_birth_dates_count_as_original_only() {
        let sheet = Sheet::new(
            "Data",
            vec![person("2000-01-01", "M", "Ede"), person("onbekend", "V", "Ede")],
        );
        let wb = SourceWorkbook::new(vec![sheet]);
        let result = analyze(&wb, &FilterConfig::default().with_today(today()));
        let g = result.get("Data").unwrap();
        assert_eq!(g.total_original, 2);
        assert_eq!(g.total_filtered(), 1);
        assert_eq!(g.selected_percentage(), 50.0);
    }

    #[test]
    fn combined_cities_only_without_custom_ranges() {
        let wb = SourceWorkbook::new(vec![
            Sheet::new("A", vec![person("1990-01-01", "m", "Ede")]),
            Sheet::new(
                "B",
                vec![person("1990-01-01", "v", "Ede"), person("1980-01-01", "v", "Zeist")],
            ),
        ]);
        let config = FilterConfig::default().with_today(today());

        let result = analyze(&wb, &config);
        let combined: Vec<_> = result
            .combined_cities
            .clone()
            .unwrap()
            .into_iter()
            .map(|c| (c.key, c.count, c.percentage))
            .collect();
        assert_eq!(
            combined,
            vec![("Ede".to_string(), 2, 66.7), ("Zeist".to_string(), 1, 33.3)]
        );

        let summary = result.summary();
        assert_eq!(summary.total_original, 3);
        assert_eq!(summary.genders.get(Gender::Female).count, 2);

        let with_custom = config.with_custom(NamedRange::new("Oud", 40, 150).unwrap());
        let result = analyze(&wb, &with_custom);
        assert_eq!(result.combined_cities, None);
        let labels: Vec<_> = result.labels().collect();
        assert_eq!(labels, vec!["A", "A_Oud", "B", "B_Oud"]);
        // custom groups stay out of the totals
        assert_eq!(result.summary().total_filtered, 3);
    }
}
