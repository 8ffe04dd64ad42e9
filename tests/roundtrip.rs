use std::io::Write;

use agesheet::{
    classify::NamedRange,
    config::FilterConfig,
    error::AgeSheetError,
    fields::AGE_FIELD,
    model::{FieldValue, Row, Sheet, SourceWorkbook},
    pipeline,
    reader::{self, SourceFormat, xlsx::XlsxReader},
    workbook::{Workbook, cell::CellValue},
};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;

fn config() -> FilterConfig {
    FilterConfig::default()
        .with_custom(NamedRange::new("Senior", 66, 150).unwrap())
        .with_today(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
}

#[test]
fn export_reads_back_as_the_filtered_groups() {
    let rows = vec![
        Row::new()
            .with("Naam", FieldValue::text("Ans & Co <3"))
            .with("Geboortedatum", FieldValue::text("1950-01-01"))
            .with("Lid", FieldValue::Bool(true)),
        Row::new()
            .with("Naam", FieldValue::text("Bram"))
            .with("Geboortedatum", FieldValue::Number(36526.0)),
    ];
    let wb = SourceWorkbook::new(vec![Sheet::new("Leden", rows)]);
    let outcome = pipeline::run(&wb, &config()).unwrap();

    let back = XlsxReader::from_bytes(outcome.export.clone())
        .unwrap()
        .read_workbook()
        .unwrap();
    let names: Vec<_> = back.sheet_names().collect();
    assert_eq!(names, vec!["Leden", "Leden_Senior"]);

    for group in outcome.result.groups() {
        let expected: Vec<Row> = group.rows.iter().map(|r| r.row.clone()).collect();
        assert_eq!(back.sheet(&group.label).unwrap().rows, expected);
    }
    assert_eq!(
        back.sheet("Leden").unwrap().rows[1].get(AGE_FIELD),
        Some(&FieldValue::Number(24.0))
    );
}

#[test]
fn empty_groups_export_empty_sheets() {
    let rows = vec![Row::new().with("Geboortedatum", FieldValue::text("2010-05-05"))];
    let wb = SourceWorkbook::new(vec![Sheet::new("Jeugd", rows)]);
    let outcome = pipeline::run(&wb, &config()).unwrap();

    let back = reader::read_bytes(outcome.export, SourceFormat::Xlsx).unwrap();
    assert_eq!(back.sheet("Jeugd").unwrap().rows.len(), 1);
    assert!(back.sheet("Jeugd_Senior").unwrap().rows.is_empty());
}

#[test]
fn csv_file_through_process_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("leden.csv");
    let mut f = std::fs::File::create(&input).unwrap();
    writeln!(f, "Naam,Geboorte datum,Gender,City").unwrap();
    writeln!(f, "Ans,1950-01-01,F,Ede").unwrap();
    writeln!(f, "Bob,2000-01-01,m,").unwrap();
    writeln!(f, "Cor,kapot,m,Ede").unwrap();
    drop(f);

    let outcome = pipeline::process_file(&input, &config()).unwrap();
    let labels: Vec<_> = outcome.result.labels().collect();
    assert_eq!(labels, vec!["Sheet1", "Sheet1_Senior"]);

    let primary = outcome.result.get("Sheet1").unwrap();
    assert_eq!(primary.total_original, 3);
    assert_eq!(primary.total_filtered(), 2);
    let cities: Vec<_> = primary.cities.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(cities, vec!["Ede", "Unknown"]);

    let output = dir.path().join("uit.xlsx");
    outcome.write_export(&output).unwrap();
    let back = reader::read_path(&output).unwrap();
    assert_eq!(back.sheet("Sheet1_Senior").unwrap().rows.len(), 1);
}

#[test]
fn hand_written_workbook_is_readable() {
    let mut wb = Workbook::new();
    let sheet = wb.add_sheet("Blad 1").unwrap();
    sheet
        .write_row(&[CellValue::text("Stad"), CellValue::Blank, CellValue::text("Stad")])
        .unwrap();
    sheet
        .write_row(&[CellValue::text("Ede"), CellValue::num(1.5), CellValue::bool(false)])
        .unwrap();
    let bytes = wb.finish_to_vec().unwrap();

    let back = XlsxReader::from_bytes(bytes).unwrap().read_workbook().unwrap();
    assert_eq!(
        back.sheets[0].rows,
        vec![
            Row::new()
                .with("Stad", FieldValue::text("Ede"))
                .with("__EMPTY", FieldValue::Number(1.5))
                .with("Stad_1", FieldValue::Bool(false)),
        ]
    );
}

#[test]
fn unreadable_input_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("kapot.xlsx");
    std::fs::write(&input, b"definitely not a zip").unwrap();
    assert!(matches!(
        pipeline::process_file(&input, &config()),
        Err(AgeSheetError::MalformedWorkbook(_))
    ));
}
