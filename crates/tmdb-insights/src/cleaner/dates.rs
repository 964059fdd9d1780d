//! Release date parsing.
//!
//! Text that cannot be read as a date becomes null; it never raises.

use crate::error::{InsightsError, Result};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;

/// `num_days_from_ce` of 1970-01-01, the epoch of Polars' `Date` type.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a single date string, trying the supported formats in order.
pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date);
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(datetime.date());
        }
    }

    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.date_naive())
}

pub(crate) fn date_to_epoch_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

pub(crate) fn epoch_days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE)
}

/// Convert a column to Polars `Date`.
///
/// Returns the converted series and how many non-empty values failed to
/// parse. Columns that are already `Date` come back unchanged.
pub(crate) fn to_date_series(series: &Series) -> Result<(Series, usize)> {
    match series.dtype() {
        DataType::Date => return Ok((series.clone(), 0)),
        DataType::Datetime(_, _) => {
            let dates = series.cast(&DataType::Date)?;
            return Ok((dates, 0));
        }
        _ => {}
    }

    let name = series.name().clone();
    let strings = series
        .cast(&DataType::String)
        .map_err(|e| InsightsError::column_type(name.as_str(), "String", e))?;
    let chunked = strings
        .str()
        .map_err(|e| InsightsError::column_type(name.as_str(), "String", e))?;

    let mut unparsable = 0usize;
    let days: Vec<Option<i32>> = chunked
        .into_iter()
        .map(|value| match value {
            Some(raw) => {
                let parsed = parse_date(raw).map(date_to_epoch_days);
                if parsed.is_none() && !raw.trim().is_empty() {
                    unparsable += 1;
                }
                parsed
            }
            None => None,
        })
        .collect();

    let dates = Series::new(name, days).cast(&DataType::Date)?;
    Ok((dates, unparsable))
}

/// Calendar years of a `Date` (or date-like) series.
pub(crate) fn years(series: &Series) -> Result<Vec<Option<i32>>> {
    let (dates, _) = to_date_series(series)?;
    let days = dates.cast(&DataType::Int32)?;
    let chunked = days
        .i32()
        .map_err(|e| InsightsError::column_type(series.name().as_str(), "Date", e))?;

    Ok(chunked
        .into_iter()
        .map(|d| d.and_then(epoch_days_to_date).map(|date| date.year()))
        .collect())
}
