//! Text-stored dates.
//!
//! Dates live in the registry as plain text. New and edited values are
//! written as `YYYY-MM-DD`; older rows may carry day-first or slash/dot
//! spellings, sometimes followed by a time of day.

use chrono::{Datelike, Local, NaiveDate, NaiveTime};

/// Storage and export spelling of a date.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Excel day zero (serial `0`), accounting for the 1900 leap-year bug.
const SPREADSHEET_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// First date whose serial is unaffected by the fictitious 1900-02-29.
const FIRST_EXACT_SERIAL_DATE: (i32, u32, u32) = (1900, 3, 1);

const TIME_FORMATS: [&str; 3] = ["%H:%M", "%H:%M:%S", "%H:%M:%S%.f"];

/// Renders a date the way the registry stores it.
pub fn format_iso(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// Parses stored date text, reading ambiguous numeric dates day-first.
///
/// Accepts three numeric parts separated by `-`, `/` or `.`: year-first
/// when the first part has four digits (`YYYY-MM-DD`, `YYYY/MM/DD`), else
/// day-first (`DD/MM/YYYY`, `DD.MM.YY`, ...). A trailing time of day
/// (` HH:MM[:SS[.f]]` or `THH:MM...`) is accepted and ignored. A reading
/// with a month above 12 is retried with day and month swapped.
///
/// Two-digit years resolve to the year within 50 years of the current one.
///
/// Returns `None` for empty or unparseable text; callers choose the
/// fallback.
pub fn parse_day_first(text: &str) -> Option<NaiveDate> {
    parse_day_first_in(text, Local::now().year())
}

/// Same as [`parse_day_first`] with an explicit reference year for
/// two-digit years.
pub fn parse_day_first_in(text: &str, current_year: i32) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let date_part = strip_time(text)?;
    let parts: Vec<&str> = date_part.split(['/', '-', '.']).collect();
    let [first, second, third] = parts.as_slice() else {
        return None;
    };
    if [first, second, third]
        .iter()
        .any(|part| part.is_empty() || !part.chars().all(|ch| ch.is_ascii_digit()))
    {
        return None;
    }

    let (year, month, day) = if first.len() == 4 {
        (first.parse().ok()?, second.parse().ok()?, third.parse().ok()?)
    } else {
        let year = match third.len() {
            2 => expand_two_digit_year(third.parse().ok()?, current_year),
            4 => third.parse().ok()?,
            _ => return None,
        };
        (year, second.parse().ok()?, first.parse().ok()?)
    };

    NaiveDate::from_ymd_opt(year, month, day).or_else(|| NaiveDate::from_ymd_opt(year, day, month))
}

/// Days since the spreadsheet epoch, as stored in numeric date cells.
///
/// `None` before 1900-03-01, where spreadsheet serials are shifted by the
/// 1900 leap-year bug or negative.
pub fn spreadsheet_serial(date: NaiveDate) -> Option<i64> {
    let (year, month, day) = FIRST_EXACT_SERIAL_DATE;
    if date < NaiveDate::from_ymd_opt(year, month, day)? {
        return None;
    }
    let (year, month, day) = SPREADSHEET_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(date.signed_duration_since(epoch).num_days())
}

/// Returns the date portion of `text`, or `None` when a trailing part is
/// present but is not a time of day.
fn strip_time(text: &str) -> Option<&str> {
    let Some(split) = text.find([' ', 'T']) else {
        return Some(text);
    };
    let time = text[split + 1..].trim();
    TIME_FORMATS
        .iter()
        .any(|format| NaiveTime::parse_from_str(time, format).is_ok())
        .then(|| text[..split].trim_end())
}

/// Puts a two-digit year in the century that keeps it within 50 years of
/// `current_year`.
fn expand_two_digit_year(year: i32, current_year: i32) -> i32 {
    let candidate = current_year - current_year.rem_euclid(100) + year;
    if candidate >= current_year + 50 {
        candidate - 100
    } else if candidate < current_year - 50 {
        candidate + 100
    } else {
        candidate
    }
}
