//! Timestamp formatting for feed entries

use chrono::{DateTime, Utc};

const MINUTES_IN_HOUR: i64 = 60;
const MINUTES_IN_DAY: i64 = 1440;
const MINUTES_IN_ALMOST_TWO_DAYS: i64 = 2520;
const MINUTES_IN_MONTH: i64 = 43200;
const MINUTES_IN_TWO_MONTHS: i64 = 86400;

/// Long absolute form, e.g. `Monday March 04, 2024 01:02:03 PM`
pub fn absolute(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%A %B %d, %Y %I:%M:%S %p").to_string()
}

/// Distance between `timestamp` and `now` in words, with an `ago` / `in` suffix
pub fn relative(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - timestamp).num_seconds();
    let distance = distance_in_words(seconds.abs());
    if seconds >= 0 {
        format!("{distance} ago")
    } else {
        format!("in {distance}")
    }
}

fn distance_in_words(seconds: i64) -> String {
    let minutes = div_round(seconds, 60);

    if minutes < 2 {
        return if minutes == 0 {
            "less than a minute".to_string()
        } else {
            "1 minute".to_string()
        };
    }
    if minutes < 45 {
        return format!("{minutes} minutes");
    }
    if minutes < 90 {
        return "about 1 hour".to_string();
    }
    if minutes < MINUTES_IN_DAY {
        return format!("about {} hours", div_round(minutes, MINUTES_IN_HOUR));
    }
    if minutes < MINUTES_IN_ALMOST_TWO_DAYS {
        return "1 day".to_string();
    }
    if minutes < MINUTES_IN_MONTH {
        return format!("{} days", div_round(minutes, MINUTES_IN_DAY));
    }
    if minutes < MINUTES_IN_TWO_MONTHS {
        let months = div_round(minutes, MINUTES_IN_MONTH);
        return if months == 1 {
            "about 1 month".to_string()
        } else {
            format!("about {months} months")
        };
    }

    let months = minutes / MINUTES_IN_MONTH;
    if months < 12 {
        return format!("{} months", div_round(minutes, MINUTES_IN_MONTH));
    }

    let years = months / 12;
    let plural = |n: i64| if n == 1 { "year" } else { "years" };
    match months % 12 {
        0..=2 => format!("about {years} {}", plural(years)),
        3..=8 => format!("over {years} {}", plural(years)),
        _ => format!("almost {} years", years + 1),
    }
}

fn div_round(value: i64, by: i64) -> i64 {
    (value + by / 2) / by
}
