use anyhow::{anyhow, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Date layout of the series files: year, day, month (`2020` `23` `03`).
/// Not ISO; existing data files depend on it.
pub const DATE_FMT: &str = "%Y%d%m";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FMT).to_string()
}

pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    // chrono accepts a variable-width %Y, pin it to the 8 digit layout
    if input.len() != 8 || !input.chars().all(|c| c.is_ascii_digit()) {
        return Err(anyhow!("Invalid date '{}', expected YYYYDDMM", input));
    }
    NaiveDate::parse_from_str(input, DATE_FMT)
        .map_err(|e| anyhow!("Invalid date '{}': {}", input, e))
}

/// Date a delta observed at `now` belongs to.
///
/// Sources publish the previous day's final numbers shortly after local
/// midnight, so anything observed before `cutoff` is credited to yesterday.
pub fn attribute_date(now: NaiveDateTime, cutoff: NaiveTime) -> NaiveDate {
    let today = now.date();
    if now.time() < cutoff {
        today - Duration::days(1)
    } else {
        today
    }
}

pub fn parse_cutoff(input: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(input.trim(), "%H:%M")
        .map_err(|_| anyhow!("Invalid cutoff '{}', expected HH:MM", input))
}

pub fn parse_duration(input: &str) -> Result<Duration> {
    let input = input.trim();
    let Some((unit_start, unit)) = input.char_indices().last() else {
        return Err(anyhow!("Empty duration string"));
    };
    let num_str = &input[..unit_start];

    let num: i64 = num_str.parse().map_err(|_| anyhow!("Invalid duration number"))?;

    let duration = match unit.to_ascii_lowercase() {
        's' => Duration::try_seconds(num),
        'm' => Duration::try_minutes(num),
        'h' => Duration::try_hours(num),
        'd' => Duration::try_days(num),
        _ => return Err(anyhow!("Unknown duration unit: {}", unit)),
    };
    duration.ok_or_else(|| anyhow!("Duration out of range: {}", input))
}
