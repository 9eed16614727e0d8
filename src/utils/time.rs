use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone};
use chrono_english::{parse_date_string, Dialect};
use now::DateTimeNow;

use anyhow::{anyhow, Result};

/// This is the standard way of converting a date to a string in daybook.
pub fn format_day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parses a user supplied day such as "today", "yesterday", "15/03/2025" or "2025-03-15".
pub fn parse_day(input: &str, now: DateTime<Local>, dialect: Dialect) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d") {
        return Ok(date);
    }
    parse_date_string(input, now, dialect)
        .map(|v| v.date_naive())
        .map_err(|e| anyhow!("Can't parse \"{input}\" into a date: {e}"))
}

/// First and last day of the week `date` falls into. Weeks start on Monday.
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let moment = local_midday(date);
    (
        moment.beginning_of_week().date_naive(),
        moment.end_of_week().date_naive(),
    )
}

/// First and last day of the month `date` falls into.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let moment = local_midday(date);
    (
        moment.beginning_of_month().date_naive(),
        moment.end_of_month().date_naive(),
    )
}

pub fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

// Midday avoids DST transitions that could make midnight ambiguous or missing.
fn local_midday(date: NaiveDate) -> DateTime<Local> {
    let naive = date.and_hms_opt(12, 0, 0).unwrap_or_default();
    Local
        .from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| Local.from_utc_datetime(&naive))
}
