//! The render model: everything the dashboard shows, computed in one pass.
//!
//! `recompute` is a pure function of the dataset, the clean report, and the
//! current selection. Every interaction rebuilds the whole model from
//! scratch; nothing here caches or mutates. The model is host-agnostic so
//! the chart and table builders can be exercised headless in tests.

use crate::aggregate::{
    self, GeoPoint, TypeSeries, WatchSeries, YEAR_RANGE,
};
use crate::data::{CleanReport, Dataset, REQUIRED_COLUMNS};

/// What the user has picked. `None` fields fall back to the first option,
/// mirroring a fresh dashboard with untouched selectors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub country: Option<String>,
    pub year: Option<i32>,
    pub show_table: bool,
}

/// One named line on a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChartSpec {
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub x_bounds: (f64, f64),
    pub y_bounds: (f64, f64),
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChartSpec {
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub bars: Vec<(String, u64)>,
}

/// A small label/count table; empty rows render as a "no data" notice.
#[derive(Debug, Clone, PartialEq)]
pub struct FreqTable {
    pub title: &'static str,
    pub rows: Vec<(String, usize)>,
}

/// The map panel and its two selectors. Options are already ranked the
/// way the selectors present them; `country`/`year` are the resolved
/// picks, `None` only when the map-ready subset is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct MapModel {
    pub title: &'static str,
    pub countries: Vec<String>,
    pub years: Vec<i32>,
    pub country: Option<String>,
    pub year: Option<i32>,
    pub points: Vec<GeoPoint>,
}

/// The raw-data table, event date first and the derived news date last.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub header: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderModel {
    pub title: &'static str,
    pub events: usize,
    pub warnings: Vec<String>,
}

/// Everything one frame of the dashboard needs.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderModel {
    pub header: HeaderModel,
    pub table: Option<TableView>,
    pub yearly: LineChartSpec,
    pub country_bars: BarChartSpec,
    pub watchlist: LineChartSpec,
    pub type_frequency: BarChartSpec,
    pub type_by_year: LineChartSpec,
    pub map: MapModel,
    pub event_types: FreqTable,
    pub activists: FreqTable,
}

/// Build the full render model for one selection.
pub fn recompute(dataset: &Dataset, report: &CleanReport, selection: &Selection) -> RenderModel {
    let geo = aggregate::geo_table(dataset);
    let countries = aggregate::country_options(&geo);
    let years = aggregate::year_options(&geo);
    let country = resolve(selection.country.as_ref(), &countries);
    let year = resolve(selection.year.as_ref(), &years);

    let filtered = match (&country, year) {
        (Some(country), Some(year)) => aggregate::geo_filtered(&geo, country, year),
        _ => Vec::new(),
    };

    RenderModel {
        header: header_model(dataset, report),
        table: selection.show_table.then(|| table_view(dataset)),
        yearly: yearly_chart(dataset),
        country_bars: country_bar_chart(dataset),
        watchlist: watchlist_chart(dataset),
        type_frequency: type_frequency_chart(dataset),
        type_by_year: type_by_year_chart(dataset),
        event_types: FreqTable {
            title: "Event Types",
            rows: aggregate::value_counts(filtered.iter().map(|p| p.event_type.as_str())),
        },
        activists: FreqTable {
            title: "Activists",
            rows: aggregate::value_counts(filtered.iter().map(|p| p.actor1.as_str())),
        },
        map: MapModel {
            title: "Casuality on map",
            countries,
            years,
            country,
            year,
            points: filtered,
        },
    }
}

/// Requested value if it is still a valid option, otherwise the first
/// option (the selector default).
fn resolve<T: PartialEq + Clone>(requested: Option<&T>, options: &[T]) -> Option<T> {
    match requested {
        Some(value) if options.contains(value) => Some(value.clone()),
        _ => options.first().cloned(),
    }
}

fn header_model(dataset: &Dataset, report: &CleanReport) -> HeaderModel {
    let mut warnings = Vec::new();
    for column in &report.dropped_columns {
        warnings.push(format!("column `{column}` dropped: it contains missing values"));
    }
    if report.unparsed_dates > 0 {
        warnings.push(format!(
            "{} row(s) with unparsable EVENT_DATE kept with a null date",
            report.unparsed_dates
        ));
    }
    HeaderModel {
        title: "Analysis of Event Activities on East Asia Pacific regions from 2010 to 2022",
        events: dataset.len(),
        warnings,
    }
}

fn table_view(dataset: &Dataset) -> TableView {
    let mut header: Vec<&'static str> = REQUIRED_COLUMNS.to_vec();
    header.push("NEWS_DATE");
    let rows = dataset
        .records
        .iter()
        .map(|r| {
            vec![
                r.event_date.map_or_else(|| "-".to_string(), |d| d.to_string()),
                r.year.to_string(),
                r.event_type.clone(),
                r.sub_event_type.clone(),
                r.actor1.clone(),
                r.interaction.clone(),
                r.region.clone(),
                r.country.clone(),
                r.location.clone(),
                r.latitude.to_string(),
                r.longitude.to_string(),
                r.fatalities.to_string(),
                r.timestamp.to_string(),
                r.news_date.clone(),
            ]
        })
        .collect();
    TableView { header, rows }
}

fn yearly_chart(dataset: &Dataset) -> LineChartSpec {
    let buckets = aggregate::yearly_fatalities(dataset);
    let points: Vec<(f64, f64)> = buckets
        .iter()
        .map(|&(year, sum)| (f64::from(year), sum as f64))
        .collect();
    let x_bounds = match (buckets.first(), buckets.last()) {
        (Some(&(first, _)), Some(&(last, _))) => x_span(first, last),
        _ => span_of(YEAR_RANGE),
    };
    let series = vec![Series {
        name: "Fatalities".to_string(),
        points,
    }];
    LineChartSpec {
        title: "Yearly fatalities trend",
        x_label: "Event_date",
        y_label: "Fatalities",
        x_bounds,
        y_bounds: y_span(&series),
        series,
    }
}

fn country_bar_chart(dataset: &Dataset) -> BarChartSpec {
    BarChartSpec {
        title: "Fatalities all around East Asia Pacific",
        x_label: "Countries",
        y_label: "Fatalities",
        bars: aggregate::country_fatalities(dataset)
            .into_iter()
            .map(|(country, sum)| (country, sum.max(0) as u64))
            .collect(),
    }
}

fn watchlist_chart(dataset: &Dataset) -> LineChartSpec {
    let series: Vec<Series> = aggregate::watchlist_fatalities(dataset)
        .into_iter()
        .map(|WatchSeries { country, points }| Series {
            name: country.to_string(),
            points: points
                .into_iter()
                .map(|(year, sum)| (f64::from(year), sum as f64))
                .collect(),
        })
        .collect();
    LineChartSpec {
        title: "Remarkable fatalities around East Asia Pacific from 2010 to 2022",
        x_label: "Timeline",
        y_label: "Numbers of person",
        // The timeline spans the whole tracked range no matter which years
        // actually carry data.
        x_bounds: span_of(YEAR_RANGE),
        y_bounds: y_span(&series),
        series,
    }
}

fn type_frequency_chart(dataset: &Dataset) -> BarChartSpec {
    BarChartSpec {
        title: "EVENT_TYPE most happened all these year over East Asia Pacific",
        x_label: "EVENT_TYPE",
        y_label: "Number of Occurance",
        bars: aggregate::event_type_frequency(dataset)
            .into_iter()
            .map(|(event_type, count)| (event_type, count as u64))
            .collect(),
    }
}

fn type_by_year_chart(dataset: &Dataset) -> LineChartSpec {
    let series: Vec<Series> = aggregate::event_type_by_year(dataset)
        .into_iter()
        .map(|TypeSeries { event_type, points }| Series {
            name: event_type,
            points: points
                .into_iter()
                .map(|(year, count)| (f64::from(year), count as f64))
                .collect(),
        })
        .collect();
    LineChartSpec {
        title: "Remarkable Events around East Asia Pacific from 2010 to 2022",
        x_label: "Timeline",
        y_label: "Numbers of Occurance",
        x_bounds: span_of(YEAR_RANGE),
        y_bounds: y_span(&series),
        series,
    }
}

fn span_of(range: (i32, i32)) -> (f64, f64) {
    (f64::from(range.0), f64::from(range.1))
}

/// X bounds for a data-driven axis; a single year gets a unit of padding
/// so the point is not pinned to the chart edge.
fn x_span(first: i32, last: i32) -> (f64, f64) {
    if first == last {
        (f64::from(first - 1), f64::from(last + 1))
    } else {
        (f64::from(first), f64::from(last))
    }
}

/// Y bounds covering every series, floored at zero and never degenerate.
fn y_span(series: &[Series]) -> (f64, f64) {
    let mut min = 0.0f64;
    let mut max = 1.0f64;
    for s in series {
        for &(_, y) in &s.points {
            min = min.min(y);
            max = max.max(y);
        }
    }
    (min, max)
}
