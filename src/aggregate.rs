//! Aggregate views over the cleaned dataset.
//!
//! Every function here is a pure read of `Dataset`: no caching, no shared
//! state. Orderings are deterministic so repeated runs over the same file
//! render identically (counts descending with alphabetical tie-breaks,
//! enumerations over sorted key sets).

use crate::data::Dataset;
use chrono::Datelike;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Countries tracked by the watch-list chart, matched case-insensitively
/// against the COUNTRY column.
pub const WATCHLIST: [&str; 4] = ["myanmar", "indonesia", "philippines", "thailand"];

/// Inclusive year range the trend charts cover.
pub const YEAR_RANGE: (i32, i32) = (2010, 2022);

/// Fatality sums for one watch-list country, one point per year with data.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchSeries {
    pub country: &'static str,
    pub points: Vec<(i32, i64)>,
}

/// Occurrence counts for one event type, one point per year with data.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSeries {
    pub event_type: String,
    pub points: Vec<(i32, usize)>,
}

/// One row of the map-ready subset: positive-fatality events with the
/// coordinate columns renamed to the lowercase names the map consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoPoint {
    pub year: i32,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    pub fatalities: i64,
    pub event_type: String,
    pub actor1: String,
}

fn in_year_range(year: i32) -> bool {
    (YEAR_RANGE.0..=YEAR_RANGE.1).contains(&year)
}

/// Fatality sum per calendar year of the event date, chronological and
/// continuous: gap years between the first and last dated event appear
/// with a zero sum. Rows with a null event date are excluded.
pub fn yearly_fatalities(dataset: &Dataset) -> Vec<(i32, i64)> {
    let mut sums: BTreeMap<i32, i64> = BTreeMap::new();
    for record in &dataset.records {
        if let Some(date) = record.event_date {
            *sums.entry(date.year()).or_insert(0) += record.fatalities;
        }
    }
    let (Some(&first), Some(&last)) = (sums.keys().next(), sums.keys().last()) else {
        return Vec::new();
    };
    (first..=last)
        .map(|year| (year, sums.get(&year).copied().unwrap_or(0)))
        .collect()
}

/// Fatality sum per country in first-appearance order, keeping only
/// countries whose total is positive.
pub fn country_fatalities(dataset: &Dataset) -> Vec<(String, i64)> {
    let mut sums: Vec<(String, i64)> = Vec::new();
    for record in &dataset.records {
        match sums.iter_mut().find(|(name, _)| *name == record.country) {
            Some((_, sum)) => *sum += record.fatalities,
            None => sums.push((record.country.clone(), record.fatalities)),
        }
    }
    sums.retain(|&(_, sum)| sum > 0);
    sums
}

/// Per-year fatality sums for each watch-list country, years restricted to
/// the chart range. Every watched country gets a series, empty or not, so
/// the chart legend is stable.
pub fn watchlist_fatalities(dataset: &Dataset) -> Vec<WatchSeries> {
    WATCHLIST
        .iter()
        .map(|&watched| {
            let mut sums: BTreeMap<i32, i64> = BTreeMap::new();
            for record in &dataset.records {
                if record.country.eq_ignore_ascii_case(watched) && in_year_range(record.year) {
                    *sums.entry(record.year).or_insert(0) += record.fatalities;
                }
            }
            WatchSeries {
                country: watched,
                points: sums.into_iter().collect(),
            }
        })
        .collect()
}

/// Occurrence count per event type over the whole dataset, most frequent
/// first.
pub fn event_type_frequency(dataset: &Dataset) -> Vec<(String, usize)> {
    value_counts(dataset.records.iter().map(|r| r.event_type.as_str()))
}

/// Per-year occurrence counts for every event type, types enumerated in
/// sorted order. Unlike the watch-list view this one is unfiltered; the
/// chart clips to its own x-domain.
pub fn event_type_by_year(dataset: &Dataset) -> Vec<TypeSeries> {
    let types: BTreeSet<&str> = dataset.records.iter().map(|r| r.event_type.as_str()).collect();
    types
        .into_iter()
        .map(|event_type| {
            let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
            for record in &dataset.records {
                if record.event_type == event_type {
                    *counts.entry(record.year).or_insert(0) += 1;
                }
            }
            TypeSeries {
                event_type: event_type.to_string(),
                points: counts.into_iter().collect(),
            }
        })
        .collect()
}

/// The map-ready subset: events with at least one fatality, in source
/// order.
pub fn geo_table(dataset: &Dataset) -> Vec<GeoPoint> {
    dataset
        .records
        .iter()
        .filter(|r| r.fatalities > 0)
        .map(|r| GeoPoint {
            year: r.year,
            country: r.country.clone(),
            lat: r.latitude,
            lon: r.longitude,
            fatalities: r.fatalities,
            event_type: r.event_type.clone(),
            actor1: r.actor1.clone(),
        })
        .collect()
}

/// Rows of the map-ready subset matching one country and year exactly.
pub fn geo_filtered(points: &[GeoPoint], country: &str, year: i32) -> Vec<GeoPoint> {
    points
        .iter()
        .filter(|p| p.country == country && p.year == year)
        .cloned()
        .collect()
}

/// Country choices for the map selector, ranked by total fatalities in the
/// map-ready subset, heaviest first.
pub fn country_options(points: &[GeoPoint]) -> Vec<String> {
    let mut sums: HashMap<&str, i64> = HashMap::new();
    for point in points {
        *sums.entry(point.country.as_str()).or_insert(0) += point.fatalities;
    }
    let mut ranked: Vec<(&str, i64)> = sums.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.into_iter().map(|(name, _)| name.to_string()).collect()
}

/// Year choices for the map selector, newest first.
pub fn year_options(points: &[GeoPoint]) -> Vec<i32> {
    let years: BTreeSet<i32> = points.iter().map(|p| p.year).collect();
    years.into_iter().rev().collect()
}

/// Occurrence counts over arbitrary labels, most frequent first with
/// alphabetical tie-breaks.
pub fn value_counts<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .map(|(label, count)| (label.to_string(), count))
        .collect()
}
