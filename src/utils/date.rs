// Date parsing and display helpers
//
// Calendar dates (due dates, last contact, estimate validity) are stored as
// `YYYY-MM-DD` text; event times are stored as Unix timestamps.

use chrono::{Duration, Local, NaiveDate, TimeZone};
use anyhow::Result;

const STORAGE_FORMAT: &str = "%Y-%m-%d";
const DISPLAY_FORMAT: &str = "%d.%m.%Y";

/// Parse a date expression into its storage form (`YYYY-MM-DD`).
///
/// Accepts `YYYY-MM-DD`, `DD.MM.YYYY`, `today` and `tomorrow`.
pub fn parse_date(expr: &str) -> Result<String> {
    let expr = expr.trim();
    let today = Local::now().date_naive();
    let date = match expr {
        "today" => today,
        "tomorrow" => today + Duration::days(1),
        _ => NaiveDate::parse_from_str(expr, STORAGE_FORMAT)
            .or_else(|_| NaiveDate::parse_from_str(expr, DISPLAY_FORMAT))
            .map_err(|_| anyhow::anyhow!(
                "Invalid date '{}'. Use YYYY-MM-DD, DD.MM.YYYY, today or tomorrow.", expr
            ))?,
    };
    Ok(date.format(STORAGE_FORMAT).to_string())
}

/// Today's date in storage form
pub fn today() -> String {
    Local::now().date_naive().format(STORAGE_FORMAT).to_string()
}

/// Render a stored date as `DD.MM.YYYY`. Unparseable values are returned as is.
pub fn format_date(stored: &str) -> String {
    NaiveDate::parse_from_str(stored, STORAGE_FORMAT)
        .map(|d| d.format(DISPLAY_FORMAT).to_string())
        .unwrap_or_else(|_| stored.to_string())
}

/// Render a Unix timestamp in local time as `DD.MM.YYYY HH:MM`
pub fn format_timestamp(ts: i64) -> String {
    match Local.timestamp_opt(ts, 0).single() {
        Some(dt) => dt.format("%d.%m.%Y %H:%M").to_string(),
        None => ts.to_string(),
    }
}
