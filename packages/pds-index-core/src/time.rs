//! NASA day-of-year time formats and timestamp parsing for index columns.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};

use crate::error::{IndexError, Result};

pub const NASA_DATE_FORMAT: &str = "%Y-%j";
pub const NASA_DT_FORMAT: &str = "%Y-%jT%H:%M:%S";
pub const NASA_DT_FORMAT_WITH_MS: &str = "%Y-%jT%H:%M:%S%.f";
pub const STANDARD_DATE_FORMAT: &str = "%Y-%m-%d";
pub const STANDARD_DT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Substring marking a column as holding times.
pub const TIME_MARKER: &str = "TIME";
/// Substring marking a column as a counter even if it mentions time.
pub const COUNT_MARKER: &str = "COUNT";
/// Local solar time is not an absolute timestamp.
pub const LOCAL_TIME_COLUMN: &str = "LOCAL_TIME";

/// Formats tried by the default parse, after RFC 3339.
const DEFAULT_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    NASA_DT_FORMAT,
];

/// Whether values of the named column get converted to timestamps.
pub fn is_time_column(name: &str) -> bool {
    name.contains(TIME_MARKER) && !name.contains(COUNT_MARKER) && name != LOCAL_TIME_COLUMN
}

/// Parses a timestamp the way index time columns are written.
///
/// Returns `None` when no known format matches. Blank values parse to
/// `Some(None)`. A trailing `Z` is ignored; results are naive UTC times.
pub fn parse_timestamp(raw: &str) -> Option<Option<NaiveDateTime>> {
    let value = raw.trim();
    if value.is_empty() {
        return Some(None);
    }
    let value = value.strip_suffix('Z').unwrap_or(value);
    parse_default(value)
        .or_else(|| NaiveDateTime::parse_from_str(value, NASA_DT_FORMAT_WITH_MS).ok())
        .map(Some)
}

fn parse_default(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    for format in DEFAULT_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(value, STANDARD_DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn format_error(value: &str, format: &str) -> IndexError {
    IndexError::parse(format!("'{}' does not match format '{}'", value, format))
}

/// ISO rendering that only shows microseconds when they are non-zero.
fn isoformat(dt: &NaiveDateTime) -> String {
    if dt.nanosecond() == 0 {
        dt.format(STANDARD_DT_FORMAT).to_string()
    } else {
        dt.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

/// `2016-045` → `2016-02-14T00:00:00`
pub fn nasa_date_to_iso(datestr: &str) -> Result<String> {
    let date = NaiveDate::parse_from_str(datestr.trim(), NASA_DATE_FORMAT)
        .map_err(|_| format_error(datestr, NASA_DATE_FORMAT))?;
    let dt = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| format_error(datestr, NASA_DATE_FORMAT))?;
    Ok(isoformat(&dt))
}

/// `2016-02-14` → `2016-045`
pub fn iso_to_nasa_date(datestr: &str) -> Result<String> {
    let date = NaiveDate::parse_from_str(datestr.trim(), STANDARD_DATE_FORMAT)
        .map_err(|_| format_error(datestr, STANDARD_DATE_FORMAT))?;
    Ok(date.format(NASA_DATE_FORMAT).to_string())
}

/// `2016-045T12:00:00.250` → `2016-02-14T12:00:00.250000`
pub fn nasa_datetime_to_iso(dtimestr: &str) -> Result<String> {
    let dt = NaiveDateTime::parse_from_str(dtimestr.trim(), NASA_DT_FORMAT_WITH_MS)
        .map_err(|_| format_error(dtimestr, NASA_DT_FORMAT_WITH_MS))?;
    Ok(isoformat(&dt))
}

/// `2016-02-14T12:00:00` → `2016-045T12:00:00`
pub fn iso_to_nasa_datetime(dtimestr: &str) -> Result<String> {
    let dt = NaiveDateTime::parse_from_str(dtimestr.trim(), STANDARD_DT_FORMAT)
        .map_err(|_| format_error(dtimestr, STANDARD_DT_FORMAT))?;
    Ok(dt.format(NASA_DT_FORMAT).to_string())
}
