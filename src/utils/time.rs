use chrono::{Duration, NaiveDate};

/// This is the standard way of converting a date to a file name in wipwatch.
pub fn date_to_record_name(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Whole minutes in a duration, rounding half up. Sampling periods below a minute still count
/// as fractions when they are summed, so rounding only happens at display time.
pub fn rounded_minutes(duration: Duration) -> i64 {
    (duration.num_seconds() + 30).div_euclid(60)
}
