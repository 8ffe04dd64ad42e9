//! Frequency tables over a group of rows.
//!
//! Every reducer is a single pass over its input and never mutates it.
//! Percentages are taken against the group size, rounded to one decimal,
//! and are `0.0` for an empty group.

use std::collections::{BTreeMap, HashMap};

use crate::classify::{Gender, city_of};
use crate::model::Row;

/// A row together with its derived age.
#[derive(Debug, Clone, PartialEq)]
pub struct AgedRow {
    pub age: Option<i32>,
    pub row: Row,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyEntry<K> {
    pub key: K,
    pub count: usize,
    pub percentage: f64,
}

impl<K> FrequencyEntry<K> {
    fn new(key: K, count: usize, total: usize) -> Self {
        FrequencyEntry {
            key,
            count,
            percentage: percentage(count, total),
        }
    }
}

pub type AgeHistogram = Vec<FrequencyEntry<i32>>;
pub type CityDistribution = Vec<FrequencyEntry<String>>;

#[derive(Debug, Clone, PartialEq)]
pub struct GenderDistribution {
    pub total: usize,
    entries: [FrequencyEntry<Gender>; 3],
}

impl GenderDistribution {
    pub fn from_counts(male: usize, female: usize, unknown: usize) -> Self {
        let total = male + female + unknown;
        GenderDistribution {
            total,
            entries: [
                FrequencyEntry::new(Gender::Male, male, total),
                FrequencyEntry::new(Gender::Female, female, total),
                FrequencyEntry::new(Gender::Unknown, unknown, total),
            ],
        }
    }

    pub fn get(&self, gender: Gender) -> &FrequencyEntry<Gender> {
        match gender {
            Gender::Male => &self.entries[0],
            Gender::Female => &self.entries[1],
            Gender::Unknown => &self.entries[2],
        }
    }

    pub fn entries(&self) -> &[FrequencyEntry<Gender>] {
        &self.entries
    }
}

/// `100 * count / total` to one decimal, `0.0` when `total` is zero.
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 * 1000.0 / total as f64).round() / 10.0
}

/// Rows per distinct age, ascending. Rows without an age are not counted.
pub fn age_histogram(rows: &[AgedRow]) -> AgeHistogram {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for age in rows.iter().filter_map(|r| r.age) {
        *counts.entry(age).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(age, count)| FrequencyEntry::new(age, count, rows.len()))
        .collect()
}

pub fn gender_distribution(rows: &[AgedRow]) -> GenderDistribution {
    let (mut male, mut female, mut unknown) = (0, 0, 0);
    for r in rows {
        match Gender::of_row(&r.row) {
            Gender::Male => male += 1,
            Gender::Female => female += 1,
            Gender::Unknown => unknown += 1,
        }
    }
    GenderDistribution::from_counts(male, female, unknown)
}

pub fn city_distribution(rows: &[AgedRow]) -> CityDistribution {
    tally_cities(rows.iter().map(|r| (city_of(&r.row), 1)), rows.len())
}

/// Merge `(city, count)` pairs into a distribution against `total`.
///
/// Sorted by count descending; equal counts keep first-seen order.
pub fn tally_cities<I>(counts: I, total: usize) -> CityDistribution
where
    I: IntoIterator<Item = (String, usize)>,
{
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for (city, n) in counts {
        match index.get(&city) {
            Some(&i) => order[i].1 += n,
            None => {
                index.insert(city.clone(), order.len());
                order.push((city, n));
            }
        }
    }
    order.sort_by(|a, b| b.1.cmp(&a.1));
    order
        .into_iter()
        .map(|(city, count)| FrequencyEntry::new(city, count, total))
        .collect()
}
