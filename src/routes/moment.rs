//! Date rendering for pages: relative ("3 minutes ago") and absolute,
//! both in the configured server timezone.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

pub struct TimeFormatter {
    timezone: Tz,
    now: DateTime<Utc>,
}

impl TimeFormatter {
    pub fn new(timezone: Tz) -> Self {
        Self::at(timezone, Utc::now())
    }

    pub fn at(timezone: Tz, now: DateTime<Utc>) -> Self {
        Self { timezone, now }
    }

    pub fn absolute(&self, time: DateTime<Utc>) -> String {
        time.with_timezone(&self.timezone)
            .format("%b %e, %Y %H:%M %Z")
            .to_string()
    }

    pub fn relative(&self, time: DateTime<Utc>) -> String {
        last_moment(time, self.now)
    }
}

/// Humanized distance between `time` and `now`, using the usual
/// rounding thresholds (45s, 45m, 22h, 26d, 320d).
pub fn last_moment(time: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - time).num_seconds();
    let future = seconds < 0;
    let seconds = seconds.abs() as f64;

    let minutes = (seconds / 60.0).round() as i64;
    let hours = (seconds / 3600.0).round() as i64;
    let days = (seconds / 86_400.0).round() as i64;
    let months = (seconds / (86_400.0 * 30.44)).round() as i64;
    let years = (seconds / (86_400.0 * 365.25)).round() as i64;

    let phrase = if seconds < 45.0 {
        "a few seconds".to_string()
    } else if seconds < 90.0 {
        "a minute".to_string()
    } else if seconds < 45.0 * 60.0 {
        format!("{} minutes", minutes)
    } else if seconds < 90.0 * 60.0 {
        "an hour".to_string()
    } else if seconds < 22.0 * 3600.0 {
        format!("{} hours", hours)
    } else if seconds < 36.0 * 3600.0 {
        "a day".to_string()
    } else if seconds < 26.0 * 86_400.0 {
        format!("{} days", days)
    } else if seconds < 45.0 * 86_400.0 {
        "a month".to_string()
    } else if seconds < 320.0 * 86_400.0 {
        format!("{} months", months.max(2))
    } else if seconds < 548.0 * 86_400.0 {
        "a year".to_string()
    } else {
        format!("{} years", years.max(2))
    };

    if future {
        format!("in {}", phrase)
    } else {
        format!("{} ago", phrase)
    }
}
