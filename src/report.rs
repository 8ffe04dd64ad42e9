//! Markdown rendering of a [`WorkbookResult`].

use std::fmt::Write;

use crate::classify::Gender;
use crate::pipeline::{GroupKind, GroupResult, WorkbookResult};
use crate::stats::{CityDistribution, GenderDistribution};

pub fn render(result: &WorkbookResult) -> String {
    let mut out = String::new();
    write_report(&mut out, result).expect("formatting into a String is infallible");
    out
}

/// Write the report to any formatter sink.
pub fn write_report<W: Write>(out: &mut W, result: &WorkbookResult) -> std::fmt::Result {
    let summary = result.summary();

    writeln!(out, "# Totals for all sheets\n")?;
    writeln!(out, "- Total records: {}", summary.total_original)?;
    writeln!(out, "- After filtering: {}", summary.total_filtered)?;
    writeln!(out, "- Selected: {:.1}%\n", summary.selected_percentage)?;
    writeln!(out, "## Gender\n")?;
    write_genders(out, &summary.genders)?;
    if let Some(cities) = &result.combined_cities {
        writeln!(out, "## Cities\n")?;
        write_cities(out, cities)?;
    }

    for group in result.groups() {
        writeln!(out)?;
        write_group(out, group)?;
    }
    Ok(())
}

fn write_group<W: Write>(out: &mut W, group: &GroupResult) -> std::fmt::Result {
    match &group.kind {
        GroupKind::Primary => writeln!(out, "# Sheet: {}\n", group.label)?,
        GroupKind::Custom(named) => writeln!(
            out,
            "# Age group: {} ({} years, sheet {})\n",
            named.name, named.range, group.sheet
        )?,
    }
    writeln!(out, "- Records: {}", group.total_original)?;
    writeln!(out, "- After filtering: {}", group.total_filtered())?;
    writeln!(out, "- Selected: {:.1}%\n", group.selected_percentage())?;

    writeln!(out, "## Gender\n")?;
    write_genders(out, &group.genders)?;
    writeln!(out, "## Cities\n")?;
    write_cities(out, &group.cities)?;

    writeln!(out, "## Ages\n")?;
    writeln!(out, "| Age | Count | Percentage |")?;
    writeln!(out, "|---|---|---|")?;
    for e in &group.ages {
        writeln!(out, "| {} years | {} | {:.1}% |", e.key, e.count, e.percentage)?;
    }
    Ok(())
}

/// The unknown line is only shown when someone is in it.
fn write_genders<W: Write>(out: &mut W, genders: &GenderDistribution) -> std::fmt::Result {
    for e in genders.entries() {
        if e.key == Gender::Unknown && e.count == 0 {
            continue;
        }
        writeln!(out, "- {}: {} ({:.1}%)", e.key, e.count, e.percentage)?;
    }
    writeln!(out)
}

fn write_cities<W: Write>(out: &mut W, cities: &CityDistribution) -> std::fmt::Result {
    writeln!(out, "| City | Count | Percentage |")?;
    writeln!(out, "|---|---|---|")?;
    for e in cities {
        writeln!(out, "| {} | {} | {:.1}% |", e.key, e.count, e.percentage)?;
    }
    writeln!(out)
}
