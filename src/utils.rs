//! General utilities.

use chrono::{DateTime, Local, NaiveDate, TimeDelta};

/// Today's date in local time, respecting `SOURCE_DATE_EPOCH`.
///
/// When `SOURCE_DATE_EPOCH` is set, that instant is used instead of the
/// clock so log windows are reproducible in tests.
pub fn today() -> NaiveDate {
    epoch_date(std::env::var("SOURCE_DATE_EPOCH").ok().as_deref())
        .unwrap_or_else(|| Local::now().date_naive())
}

/// Local date of a `SOURCE_DATE_EPOCH` value, if it is a valid timestamp.
fn epoch_date(epoch: Option<&str>) -> Option<NaiveDate> {
    let secs = epoch?.trim().parse::<i64>().ok()?;
    let utc = DateTime::from_timestamp(secs, 0)?;
    Some(utc.with_timezone(&Local).date_naive())
}

/// The `--since` argument for a log window of `days` days ending `today`.
pub fn since_date(today: NaiveDate, days: u32) -> String {
    let since = today
        .checked_sub_signed(TimeDelta::days(i64::from(days)))
        .unwrap_or(NaiveDate::MIN);
    since.format("%Y-%m-%d").to_string()
}

/// Upper-case the first character, leaving the rest untouched.
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
