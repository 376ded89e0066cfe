// Relative time formatting.
// "fromNow"-style phrases ("a few seconds ago", "3 hours ago", "in 2 days").

use chrono::{DateTime, Utc};

const SECS_PER_MINUTE: f64 = 60.0;
const SECS_PER_HOUR: f64 = 3_600.0;
const SECS_PER_DAY: f64 = 86_400.0;
/// Average month length in days over a 400-year cycle.
const DAYS_PER_MONTH: f64 = 146_097.0 / 4_800.0;

/// Format `dt` relative to `now`.
///
/// Each unit is rounded independently and the first threshold that matches wins:
/// 45 seconds, 45 minutes, 22 hours, 26 days, 11 months.
pub fn format_relative_time(dt: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(*dt).num_seconds();
    let phrase = humanize(delta.unsigned_abs() as f64);

    if delta < 0 {
        format!("in {}", phrase)
    } else {
        format!("{} ago", phrase)
    }
}

fn humanize(secs: f64) -> String {
    let seconds = secs.round();
    let minutes = (secs / SECS_PER_MINUTE).round();
    let hours = (secs / SECS_PER_HOUR).round();
    let days = (secs / SECS_PER_DAY).round();
    let months = (secs / SECS_PER_DAY / DAYS_PER_MONTH).round();
    let years = (secs / SECS_PER_DAY / DAYS_PER_MONTH / 12.0).round();

    if seconds < 45.0 {
        "a few seconds".to_string()
    } else if minutes <= 1.0 {
        "a minute".to_string()
    } else if minutes < 45.0 {
        format!("{} minutes", minutes as i64)
    } else if hours <= 1.0 {
        "an hour".to_string()
    } else if hours < 22.0 {
        format!("{} hours", hours as i64)
    } else if days <= 1.0 {
        "a day".to_string()
    } else if days < 26.0 {
        format!("{} days", days as i64)
    } else if months <= 1.0 {
        "a month".to_string()
    } else if months < 11.0 {
        format!("{} months", months as i64)
    } else if years <= 1.0 {
        "a year".to_string()
    } else {
        format!("{} years", years as i64)
    }
}
