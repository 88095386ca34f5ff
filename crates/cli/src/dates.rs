// crates/cli/src/dates.rs

//! Date threshold parsing.
//!
//! A threshold can be given at any precision from a bare year down to
//! full seconds; omitted components default to the start of their
//! range. The result is a Unix timestamp in the local time zone.

use time::macros::format_description;
use time::{PrimitiveDateTime, UtcOffset};

use crate::CliError;

pub(crate) fn parse_date(text: &str) -> Result<i64, CliError> {
    let expanded = expand(text).ok_or_else(|| bad_date(text))?;
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let parsed = PrimitiveDateTime::parse(&expanded, format).map_err(|_| bad_date(text))?;
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    Ok(parsed.assume_offset(offset).unix_timestamp())
}

fn bad_date(text: &str) -> CliError {
    CliError::Config(format!(
        "unrecognized date \"{text}\" (expected YYYY[-MM[-DD[ HH[:MM[:SS]]]]])"
    ))
}

/// Normalize a partial date to `YYYY-MM-DD HH:MM:SS`.
fn expand(text: &str) -> Option<String> {
    let text = text.trim();
    let (date, time) = match text.split_once(' ') {
        Some((date, time)) => (date, Some(time)),
        None => (text, None),
    };

    let mut date_parts = date.split('-');
    let year = date_parts.next()?;
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let month = date_parts.next().unwrap_or("1");
    let day = date_parts.next().unwrap_or("1");
    if date_parts.next().is_some() {
        return None;
    }

    let (hour, minute, second) = match time {
        None => ("0", "0", "0"),
        Some(time) => {
            let mut time_parts = time.split(':');
            let hour = time_parts.next()?;
            let minute = time_parts.next().unwrap_or("0");
            let second = time_parts.next().unwrap_or("0");
            if time_parts.next().is_some() {
                return None;
            }
            (hour, minute, second)
        }
    };

    Some(format!(
        "{year}-{:02}-{:02} {:02}:{:02}:{:02}",
        component(month)?,
        component(day)?,
        component(hour)?,
        component(minute)?,
        component(second)?
    ))
}

fn component(text: &str) -> Option<u8> {
    if text.is_empty() || text.len() > 2 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}
