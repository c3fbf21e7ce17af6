use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use chrono_english::{parse_date_string, Dialect};

/// Parses a calendar date, either ISO (`2025-03-15`) or natural language
/// ("tomorrow", "next friday") relative to `today`.
pub fn parse_date(date_str: &str, today: NaiveDate) -> Result<NaiveDate> {
    let date_str = date_str.trim();
    if let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
        return Ok(date);
    }

    // Anchor at noon so that day arithmetic never crosses midnight.
    let base = today.and_time(NaiveTime::MIN + chrono::Duration::hours(12)).and_utc();
    parse_date_string(date_str, base, Dialect::Us)
        .map(|dt| dt.date_naive())
        .map_err(|e| anyhow::anyhow!("Failed to parse date '{}': {}", date_str, e))
}
