//! Data loading and cleaning pipeline.
//!
//! One pass over the source CSV produces the immutable record set every
//! aggregate view reads from:
//! 1. read all rows,
//! 2. drop every column that contains at least one missing value,
//! 3. remove exact-duplicate rows over the surviving columns,
//! 4. project to the fixed 13-column event schema,
//! 5. parse field types, coercing unparsable event dates to `None`,
//! 6. derive the human-readable news date from the epoch timestamp.
//!
//! The column-level null drop is blunt and order-sensitive:
//! duplicates are judged on the surviving columns, and a required column
//! that loses even one cell disappears entirely (surfaced as a loud
//! warning and, for projected columns, a schema error).

use chrono::{Local, LocalResult, NaiveDate, TimeZone};
use csv::ReaderBuilder;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Columns the dashboard projects to, in display order, as they appear in
/// the source header (case-sensitive).
pub const REQUIRED_COLUMNS: [&str; 13] = [
    "EVENT_DATE",
    "YEAR",
    "EVENT_TYPE",
    "SUB_EVENT_TYPE",
    "ACTOR1",
    "INTERACTION",
    "REGION",
    "COUNTRY",
    "LOCATION",
    "LATITUDE",
    "LONGITUDE",
    "FATALITIES",
    "TIMESTAMP",
];

/// Date formats tried for `EVENT_DATE`, in order. The source data carries
/// "16 May 2022"-style dates; ISO and slashed forms show up in older
/// exports.
const EVENT_DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d %B %Y", "%d-%B-%Y", "%d %b %Y", "%m/%d/%Y"];

/// Format of the derived news date, e.g. "Monday, 2022/May/16, 08:00 AM".
const NEWS_DATE_FORMAT: &str = "%A, %Y/%b/%d, %I:%M %p";

/// Fatal errors from the load/clean pipeline. Anything here aborts the
/// whole load; nothing downstream renders.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Source file missing, unreadable, or structurally malformed
    /// (including non-numeric cells in numeric columns).
    #[error("failed to load dataset `{path}`: {message}")]
    DataLoad { path: String, message: String },

    /// A projected column is absent after cleaning. `dropped_by_cleaning`
    /// distinguishes "never in the file" from "removed by the null drop".
    #[error("required column `{column}` is missing{}", schema_note(.dropped_by_cleaning))]
    Schema {
        column: String,
        dropped_by_cleaning: bool,
    },

    /// An epoch value the news-date derivation cannot represent. Fails the
    /// whole load on the first bad row.
    #[error("row {row}: timestamp `{value}` is not a valid epoch")]
    Timestamp { row: usize, value: i64 },
}

fn schema_note(dropped: &bool) -> &'static str {
    if *dropped {
        " (dropped by cleaning: it contains missing values)"
    } else {
        ""
    }
}

/// One cleaned conflict event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    /// Parsed event date; `None` when the source value was unparsable.
    pub event_date: Option<NaiveDate>,
    pub year: i32,
    pub event_type: String,
    pub sub_event_type: String,
    /// Primary actor/activist name, free text.
    pub actor1: String,
    pub interaction: String,
    pub region: String,
    pub country: String,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Non-negativity is assumed, not enforced: a negative source value
    /// flows through and falls out of `fatalities > 0` filters instead of
    /// failing the parse.
    pub fatalities: i64,
    /// Source epoch seconds the news date was derived from.
    pub timestamp: i64,
    /// "Weekday, Year/Mon/Day, hh:mm AM/PM" in local time.
    pub news_date: String,
}

/// The cleaned record set: rows in source order (duplicates removed), with
/// the event date as the primary key carried on each row. Read-only after
/// construction; every aggregate view derives from it fresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub records: Vec<EventRecord>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Diagnostics from one load pass, surfaced in the dashboard header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanReport {
    /// Data rows read from the file before any cleaning.
    pub rows_read: usize,
    /// Exact-duplicate rows removed.
    pub duplicates_removed: usize,
    /// Columns removed because they contained at least one missing value.
    pub dropped_columns: Vec<String>,
    /// Rows whose event date could not be parsed (kept, with a null date).
    pub unparsed_dates: usize,
}

/// Load and clean the dataset at `path`, warning on stderr about dropped
/// columns before the terminal UI takes the screen.
pub fn load_dataset(path: &Path) -> Result<(Dataset, CleanReport), LoadError> {
    let origin = path.display().to_string();
    let file = File::open(path).map_err(|e| LoadError::DataLoad {
        path: origin.clone(),
        message: e.to_string(),
    })?;
    let (dataset, report) = load_from_reader(file, &origin)?;
    for column in &report.dropped_columns {
        eprintln!("warning: column `{column}` dropped: it contains missing values");
    }
    if report.unparsed_dates > 0 {
        eprintln!(
            "warning: {} row(s) with unparsable EVENT_DATE kept with a null date",
            report.unparsed_dates
        );
    }
    Ok((dataset, report))
}

/// Load and clean from any CSV byte stream. `origin` names the source in
/// error messages.
pub fn load_from_reader<R: Read>(
    reader: R,
    origin: &str,
) -> Result<(Dataset, CleanReport), LoadError> {
    let data_load = |message: String| LoadError::DataLoad {
        path: origin.to_string(),
        message,
    };

    // Flexible: short rows are tolerated here, and their absent trailing
    // cells count as missing values in the column-drop step.
    let mut csv_reader = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|e| data_load(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in csv_reader.records() {
        let record = result.map_err(|e| data_load(e.to_string()))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    let mut report = CleanReport {
        rows_read: rows.len(),
        ..CleanReport::default()
    };

    // Column-level null drop: a column survives only if every row has a
    // non-blank cell for it (vacuously true for an empty table).
    let mut kept: Vec<usize> = Vec::new();
    for (idx, name) in headers.iter().enumerate() {
        let complete = rows
            .iter()
            .all(|row| row.get(idx).is_some_and(|cell| !cell.trim().is_empty()));
        if complete {
            kept.push(idx);
        } else {
            report.dropped_columns.push(name.clone());
        }
    }

    // Exact-duplicate removal over the surviving columns, first occurrence
    // wins.
    let mut seen: HashSet<Vec<&str>> = HashSet::new();
    let mut deduped: Vec<&Vec<String>> = Vec::new();
    for row in &rows {
        let key: Vec<&str> = kept.iter().map(|&i| row[i].as_str()).collect();
        if seen.insert(key) {
            deduped.push(row);
        } else {
            report.duplicates_removed += 1;
        }
    }

    // Projection to the fixed schema.
    let mut column_index: Vec<usize> = Vec::with_capacity(REQUIRED_COLUMNS.len());
    for name in REQUIRED_COLUMNS {
        match kept.iter().find(|&&i| headers[i] == name) {
            Some(&i) => column_index.push(i),
            None => {
                return Err(LoadError::Schema {
                    column: name.to_string(),
                    dropped_by_cleaning: headers.iter().any(|h| h == name),
                })
            }
        }
    }

    // Typed parse. Only EVENT_DATE is lenient; every other field of the
    // projection must parse or the file counts as malformed. Indices below
    // follow REQUIRED_COLUMNS order: 0 EVENT_DATE, 1 YEAR, 2 EVENT_TYPE,
    // 3 SUB_EVENT_TYPE, 4 ACTOR1, 5 INTERACTION, 6 REGION, 7 COUNTRY,
    // 8 LOCATION, 9 LATITUDE, 10 LONGITUDE, 11 FATALITIES, 12 TIMESTAMP.
    let mut records: Vec<EventRecord> = Vec::with_capacity(deduped.len());
    for (row_no, row) in deduped.iter().enumerate() {
        let cell = |col: usize| row[column_index[col]].trim();
        let bad_cell = |col: usize, kind: &str| {
            data_load(format!(
                "row {}: column {} has non-{kind} value `{}`",
                row_no + 1,
                REQUIRED_COLUMNS[col],
                cell(col),
            ))
        };

        let year: i32 = cell(1).parse().map_err(|_| bad_cell(1, "integer"))?;
        let latitude: f64 = cell(9).parse().map_err(|_| bad_cell(9, "numeric"))?;
        let longitude: f64 = cell(10).parse().map_err(|_| bad_cell(10, "numeric"))?;
        let fatalities: i64 = cell(11).parse().map_err(|_| bad_cell(11, "integer"))?;
        let timestamp: i64 = cell(12).parse().map_err(|_| bad_cell(12, "integer"))?;

        let event_date = parse_event_date(cell(0));
        if event_date.is_none() {
            report.unparsed_dates += 1;
        }

        let news_date = news_date(timestamp).ok_or(LoadError::Timestamp {
            row: row_no + 1,
            value: timestamp,
        })?;

        records.push(EventRecord {
            event_date,
            year,
            event_type: cell(2).to_string(),
            sub_event_type: cell(3).to_string(),
            actor1: cell(4).to_string(),
            interaction: cell(5).to_string(),
            region: cell(6).to_string(),
            country: cell(7).to_string(),
            location: cell(8).to_string(),
            latitude,
            longitude,
            fatalities,
            timestamp,
            news_date,
        });
    }

    Ok((Dataset { records }, report))
}

/// Lenient event-date parse: first matching format wins, `None` otherwise.
fn parse_event_date(value: &str) -> Option<NaiveDate> {
    EVENT_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

/// Epoch seconds to the formatted local news date, `None` when the epoch
/// is outside the representable range.
fn news_date(epoch: i64) -> Option<String> {
    match Local.timestamp_opt(epoch, 0) {
        LocalResult::Single(dt) => Some(dt.format(NEWS_DATE_FORMAT).to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "EVENT_DATE,YEAR,EVENT_TYPE,SUB_EVENT_TYPE,ACTOR1,INTERACTION,REGION,COUNTRY,LOCATION,LATITUDE,LONGITUDE,FATALITIES,TIMESTAMP";

    fn load(csv: &str) -> Result<(Dataset, CleanReport), LoadError> {
        load_from_reader(csv.as_bytes(), "test")
    }

    fn row(date: &str, year: i32, event_type: &str, country: &str, fatalities: i64) -> String {
        format!(
            "{date},{year},{event_type},Sub,Actor A,60,East Asia Pacific,{country},Somewhere,12.5,104.2,{fatalities},1652688000"
        )
    }

    #[test]
    fn loads_well_formed_rows() {
        let csv = format!(
            "{HEADER}\n{}\n{}",
            row("2022-05-16", 2022, "Protests", "Thailand", 0),
            row("15 May 2022", 2022, "Battles", "Myanmar", 4),
        );
        let (dataset, report) = load(&csv).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(report.rows_read, 2);
        assert!(report.dropped_columns.is_empty());
        assert_eq!(
            dataset.records[0].event_date,
            NaiveDate::from_ymd_opt(2022, 5, 16)
        );
        assert_eq!(
            dataset.records[1].event_date,
            NaiveDate::from_ymd_opt(2022, 5, 15)
        );
        assert_eq!(dataset.records[1].fatalities, 4);
        assert_eq!(dataset.records[1].country, "Myanmar");
    }

    #[test]
    fn drops_columns_with_any_missing_value() {
        let csv = format!(
            "{HEADER},NOTES\n{},first note\n{},",
            row("2022-05-16", 2022, "Protests", "Thailand", 0),
            row("2022-05-15", 2022, "Battles", "Myanmar", 4),
        );
        let (dataset, report) = load(&csv).unwrap();
        assert_eq!(report.dropped_columns, vec!["NOTES".to_string()]);
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn schema_error_when_required_column_dropped_by_cleaning() {
        // One blank ACTOR1 cell wipes the whole column, which the
        // projection then cannot find.
        let with_blank_actor =
            "2022-05-15,2022,Battles,Sub,,60,East Asia Pacific,Myanmar,Somewhere,12.5,104.2,4,1652688000";
        let csv = format!(
            "{HEADER}\n{}\n{with_blank_actor}",
            row("2022-05-16", 2022, "Protests", "Thailand", 0),
        );
        let err = load(&csv).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Schema { ref column, dropped_by_cleaning: true } if column == "ACTOR1"
        ));
        assert!(err.to_string().contains("dropped by cleaning"));
    }

    #[test]
    fn schema_error_when_required_column_never_present() {
        let csv = "EVENT_DATE,YEAR\n2022-05-16,2022";
        let err = load(csv).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Schema { ref column, dropped_by_cleaning: false } if column == "EVENT_TYPE"
        ));
    }

    #[test]
    fn removes_exact_duplicate_rows() {
        let duplicate = row("2022-05-16", 2022, "Protests", "Thailand", 0);
        let csv = format!(
            "{HEADER}\n{duplicate}\n{duplicate}\n{}",
            row("2022-05-15", 2022, "Battles", "Myanmar", 4)
        );
        let (dataset, report) = load(&csv).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(report.duplicates_removed, 1);
        // Post-dedup, no two records are fully identical.
        for (i, a) in dataset.records.iter().enumerate() {
            for b in &dataset.records[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn invalid_event_date_becomes_null_and_is_counted() {
        let csv = format!(
            "{HEADER}\n{}\n{}",
            row("invalid", 2020, "Battles", "Myanmar", 5),
            row("2022-05-16", 2022, "Protests", "Thailand", 0),
        );
        let (dataset, report) = load(&csv).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records[0].event_date, None);
        assert_eq!(dataset.records[0].fatalities, 5);
        assert_eq!(report.unparsed_dates, 1);
    }

    #[test]
    fn negative_fatalities_flow_through_unenforced() {
        let csv = format!(
            "{HEADER}\n{}",
            row("2022-05-16", 2022, "Battles", "Myanmar", -3)
        );
        let (dataset, _) = load(&csv).unwrap();
        assert_eq!(dataset.records[0].fatalities, -3);
    }

    #[test]
    fn non_numeric_fatalities_is_a_data_load_error() {
        let csv = format!(
            "{HEADER}\n2022-05-16,2022,Battles,Sub,Actor A,60,East Asia Pacific,Myanmar,Somewhere,12.5,104.2,many,1652688000"
        );
        let err = load(&csv).unwrap_err();
        assert!(matches!(err, LoadError::DataLoad { .. }));
        assert!(err.to_string().contains("FATALITIES"));
    }

    #[test]
    fn out_of_range_timestamp_fails_the_whole_load() {
        let csv = format!(
            "{HEADER}\n2022-05-16,2022,Battles,Sub,Actor A,60,East Asia Pacific,Myanmar,Somewhere,12.5,104.2,4,{}",
            i64::MAX
        );
        let err = load(&csv).unwrap_err();
        assert!(matches!(err, LoadError::Timestamp { row: 1, .. }));
    }

    #[test]
    fn missing_file_is_a_data_load_error() {
        let err = load_dataset(Path::new("data/no-such-file.csv")).unwrap_err();
        assert!(matches!(err, LoadError::DataLoad { .. }));
    }

    #[test]
    fn bundled_dataset_loads_with_the_expected_cleaning() {
        let (dataset, report) =
            load_dataset(Path::new("data/East-Asia-Pacific_2018-2022_May20.csv")).unwrap();
        // NOTES is partially blank in the source file, so it is the one
        // column the cleaning pass drops, and one exact-duplicate row goes.
        assert_eq!(report.dropped_columns, vec!["NOTES".to_string()]);
        assert_eq!(report.rows_read, 50);
        assert_eq!(report.duplicates_removed, 1);
        assert_eq!(report.unparsed_dates, 0);
        assert_eq!(dataset.len(), 49);
        assert!(dataset.records.iter().all(|r| r.event_date.is_some()));
    }

    #[test]
    fn loading_twice_is_idempotent() {
        let csv = format!(
            "{HEADER}\n{}\n{}\n{}",
            row("2022-05-16", 2022, "Protests", "Thailand", 0),
            row("invalid", 2020, "Battles", "Myanmar", 5),
            row("2018-01-02", 2018, "Riots", "Indonesia", 2),
        );
        let first = load(&csv).unwrap();
        let second = load(&csv).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn event_date_formats_cover_the_source_variants() {
        let expected = NaiveDate::from_ymd_opt(2022, 5, 16);
        for value in ["2022-05-16", "16 May 2022", "16-May-2022", "05/16/2022"] {
            assert_eq!(parse_event_date(value), expected, "format of {value:?}");
        }
        assert_eq!(parse_event_date("not a date"), None);
    }

    #[test]
    fn news_date_format_matches_the_derivation() {
        // 2022-05-16 08:00:00 UTC, a Monday. The production path formats in
        // local time with the same format string.
        let dt = chrono::DateTime::from_timestamp(1652688000, 0).unwrap();
        assert_eq!(
            dt.format(NEWS_DATE_FORMAT).to_string(),
            "Monday, 2022/May/16, 08:00 AM"
        );
    }

    #[test]
    fn news_date_is_derived_for_every_row() {
        let csv = format!("{HEADER}\n{}", row("2022-05-16", 2022, "Battles", "Myanmar", 1));
        let (dataset, _) = load(&csv).unwrap();
        let parts: Vec<&str> = dataset.records[0].news_date.split(", ").collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[2].ends_with("AM") || parts[2].ends_with("PM"));
    }
}
