//! Timestamp parsing and calendar decomposition.
//!
//! Parsed timestamps are stored as `Datetime(ms)` holding UTC instants.
//! Offsets are converted to UTC and naive values are taken as UTC.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Utc, Weekday};
use polars::prelude::{Column, DataFrame, DataType, NamedFrom, Series, TimeUnit};
use tracing::debug;

use etl_common::column_text_values;
use etl_model::{QualityError, Result};

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Parse a timestamp string into a UTC instant.
///
/// Accepts RFC 3339, ISO-like naive date-times and bare dates. Returns
/// `None` for blank or unparseable input.
///
/// # Examples
///
/// ```
/// use etl_transform::parse_timestamp;
///
/// let ts = parse_timestamp("2025-03-01T10:00:00+02:00").unwrap();
/// assert_eq!(ts.to_rfc3339(), "2025-03-01T08:00:00+00:00");
/// assert!(parse_timestamp("not a date").is_none());
/// ```
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Read a text or temporal column as epoch milliseconds.
pub(crate) fn timestamp_millis(column: &Column) -> Result<Vec<Option<i64>>> {
    match column.dtype() {
        DataType::Datetime(_, _) | DataType::Date => {
            let millis = column
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
                .cast(&DataType::Int64)?;
            Ok(millis.i64()?.into_iter().collect())
        }
        _ => Ok(column_text_values(column)
            .into_iter()
            .map(|value| {
                value
                    .as_deref()
                    .and_then(parse_timestamp)
                    .map(|ts| ts.timestamp_millis())
            })
            .collect()),
    }
}

fn require_column<'a>(df: &'a DataFrame, name: &str, stage: &str) -> Result<&'a Column> {
    df.column(name).map_err(|_| QualityError::Schema {
        table: stage.to_string(),
        missing: vec![name.to_string()],
    })
}

/// Replace `col` with its parsed UTC timestamp. Unparseable values become null.
pub fn parse_datetime(df: &DataFrame, col: &str) -> Result<DataFrame> {
    let column = require_column(df, col, "parse_datetime")?;
    let millis = timestamp_millis(column)?;
    let present = column.len().saturating_sub(column.null_count());
    let unparsed = present.saturating_sub(millis.iter().flatten().count());
    if unparsed > 0 {
        debug!(column = col, unparsed, "timestamps could not be parsed and were set to null");
    }
    let parsed = Series::new(col.into(), millis)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
    let mut out = df.clone();
    out.with_column(parsed)?;
    Ok(out)
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Append `date`, `year`, `month`, `dow` and `hour` derived from `ts_col`.
pub fn add_time_parts(df: &DataFrame, ts_col: &str) -> Result<DataFrame> {
    let column = require_column(df, ts_col, "add_time_parts")?;
    let instants: Vec<Option<DateTime<Utc>>> = timestamp_millis(column)?
        .into_iter()
        .map(|ms| ms.and_then(DateTime::<Utc>::from_timestamp_millis))
        .collect();

    let days: Vec<Option<i32>> = instants
        .iter()
        .map(|ts| ts.map(|t| t.timestamp_millis().div_euclid(MILLIS_PER_DAY) as i32))
        .collect();
    let years: Vec<Option<i32>> = instants.iter().map(|ts| ts.map(|t| t.year())).collect();
    let months: Vec<Option<i32>> = instants
        .iter()
        .map(|ts| ts.map(|t| t.month() as i32))
        .collect();
    let dows: Vec<Option<&str>> = instants
        .iter()
        .map(|ts| ts.map(|t| weekday_name(t.weekday())))
        .collect();
    let hours: Vec<Option<i32>> = instants
        .iter()
        .map(|ts| ts.map(|t| t.hour() as i32))
        .collect();

    let mut out = df.clone();
    out.with_column(Series::new("date".into(), days).cast(&DataType::Date)?)?;
    out.with_column(Series::new("year".into(), years))?;
    out.with_column(Series::new("month".into(), months))?;
    out.with_column(Series::new("dow".into(), dows))?;
    out.with_column(Series::new("hour".into(), hours))?;
    Ok(out)
}
