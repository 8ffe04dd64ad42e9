use agesheet::{
    age::row_age,
    classify::{AgeRange, NamedRange, city_of},
    config::FilterConfig,
    model::{FieldValue, Row, Sheet, SourceWorkbook},
    pipeline,
    stats::FrequencyEntry,
};
use chrono::{Days, NaiveDate};
use proptest::prelude::*;

const CITIES: &[&str] = &["Utrecht", "Ede", " Ede ", "Zeist", "", "Amersfoort"];
const GENDERS: &[&str] = &["m", "V", "female", "x", ""];

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn arb_row() -> impl Strategy<Value = Row> {
    (
        prop::option::weighted(0.95, 0u64..36_500),
        prop::sample::select(GENDERS),
        prop::sample::select(CITIES),
    )
        .prop_map(|(days_old, gender, city)| {
            let birth = match days_old {
                Some(days) => {
                    let date = today().checked_sub_days(Days::new(days)).unwrap();
                    FieldValue::text(date.format("%Y-%m-%d").to_string())
                }
                None => FieldValue::text("unknown"),
            };
            Row::new()
                .with("Geboortedatum", birth)
                .with("Geslacht", FieldValue::text(gender))
                .with("Woonplaats", FieldValue::text(city))
        })
}

fn arb_range() -> impl Strategy<Value = (i32, i32)> {
    (0i32..110, 0i32..40).prop_map(|(lo, span)| (lo, lo + span))
}

fn assert_percentages<K>(entries: &[FrequencyEntry<K>], total: usize) -> Result<(), TestCaseError> {
    let counted: usize = entries.iter().map(|e| e.count).sum();
    prop_assert_eq!(counted, total);
    if total > 0 {
        let sum: f64 = entries.iter().map(|e| e.percentage).sum();
        // each entry is off by at most half a rounding step
        let slack = 0.05 * entries.len() as f64 + 1e-9;
        prop_assert!((sum - 100.0).abs() <= slack, "sum {sum}");
    }
    Ok(())
}

proptest! {
    #[test]
    fn groups_hold_exactly_the_rows_in_range(
        rows in prop::collection::vec(arb_row(), 0..60),
        (lo, hi) in arb_range(),
    ) {
        let wb = SourceWorkbook::new(vec![Sheet::new("Data", rows.clone())]);
        let config = FilterConfig::new(AgeRange::new(lo, hi).unwrap()).with_today(today());
        let result = pipeline::analyze(&wb, &config);
        let group = result.get("Data").unwrap();

        for r in &group.rows {
            let age = r.age.unwrap();
            prop_assert!(lo <= age && age <= hi);
        }
        let expected = rows
            .iter()
            .filter(|r| row_age(r, today()).is_some_and(|a| lo <= a && a <= hi))
            .count();
        prop_assert_eq!(group.total_filtered(), expected);
        prop_assert_eq!(group.total_original, rows.len());
    }

    #[test]
    fn distributions_cover_the_group(
        rows in prop::collection::vec(arb_row(), 0..60),
        (lo, hi) in arb_range(),
    ) {
        let wb = SourceWorkbook::new(vec![Sheet::new("Data", rows)]);
        let config = FilterConfig::new(AgeRange::new(lo, hi).unwrap()).with_today(today());
        let result = pipeline::analyze(&wb, &config);
        let group = result.get("Data").unwrap();
        let n = group.total_filtered();

        assert_percentages(&group.ages, n)?;
        assert_percentages(group.genders.entries(), n)?;
        assert_percentages(&group.cities, n)?;

        prop_assert!(group.ages.windows(2).all(|w| w[0].key < w[1].key));
    }

    #[test]
    fn cities_sorted_by_count_then_first_seen(
        rows in prop::collection::vec(arb_row(), 0..60),
    ) {
        let wb = SourceWorkbook::new(vec![Sheet::new("Data", rows)]);
        let config = FilterConfig::default().with_today(today());
        let result = pipeline::analyze(&wb, &config);
        let group = result.get("Data").unwrap();

        let first_seen = |city: &str| {
            group.rows.iter().position(|r| city_of(&r.row) == city).unwrap()
        };
        for w in group.cities.windows(2) {
            prop_assert!(w[0].count >= w[1].count);
            if w[0].count == w[1].count {
                prop_assert!(first_seen(&w[0].key) < first_seen(&w[1].key));
            }
        }
    }

    #[test]
    fn analysis_is_repeatable(
        rows in prop::collection::vec(arb_row(), 0..30),
        (lo, hi) in arb_range(),
    ) {
        let wb = SourceWorkbook::new(vec![Sheet::new("A", rows.clone()), Sheet::new("B", rows)]);
        let config = FilterConfig::default()
            .with_custom(NamedRange::new("Band", lo, hi).unwrap())
            .with_today(today());
        prop_assert_eq!(pipeline::analyze(&wb, &config), pipeline::analyze(&wb, &config));
    }
}
