//! Time rendering for the Hearth console
//!
//! Scheduled and change timestamps are rendered with one fixed format
//! everywhere they appear: `YYYY-MM-DD HH:MM:SS±ZZZZ`.

use std::time::Duration;

use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

const TIMESTAMP_FORMAT: &[FormatItem<'static>] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second][offset_hour sign:mandatory][offset_minute]"
);

/// Render a timestamp in the console's fixed format
pub fn format_timestamp(ts: OffsetDateTime) -> String {
    ts.format(&TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| ts.to_string())
}

/// Render a duration as `H:MM:SS`, with a day count when it grows past one
/// day
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    let seconds = secs % 60;

    if days == 1 {
        format!("1 day, {}:{:02}:{:02}", hours, minutes, seconds)
    } else if days > 1 {
        format!("{} days, {}:{:02}:{:02}", days, hours, minutes, seconds)
    } else {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    }
}
