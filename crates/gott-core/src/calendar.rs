//! Local calendar helpers: day boundaries, ISO weeks and months.

use chrono::{
    DateTime, Datelike, Duration, Local, LocalResult, Months, NaiveDate, NaiveTime, TimeZone,
    Timelike,
};

/// Date format used by filters and edit documents (`YYYY-MM-DD`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Time-of-day format for tables and whole-minute times (`HH:MM`).
pub const TIME_FORMAT: &str = "%H:%M";

/// Time-of-day format with seconds (`HH:MM:SS`).
pub const TIME_SECONDS_FORMAT: &str = "%H:%M:%S";

/// Converts a local wall-clock date and time to a `DateTime<Local>`.
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant. Times that
/// do not exist (DST spring-forward gap) are shifted one hour forward.
pub fn local_datetime(date: NaiveDate, time: NaiveTime) -> DateTime<Local> {
    let naive = date.and_time(time);
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
        LocalResult::None => Local
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .unwrap_or_else(|| Local.from_utc_datetime(&naive)),
    }
}

/// Local midnight at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> DateTime<Local> {
    local_datetime(date, NaiveTime::MIN)
}

/// Monday and Sunday of the ISO week containing `today`.
pub fn week_bounds(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let days_since_monday = today.weekday().num_days_from_monday();
    let monday = today - Duration::days(i64::from(days_since_monday));
    (monday, monday + Duration::days(6))
}

/// First and last day of the month containing `today`.
pub fn month_bounds(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = today.with_day(1).unwrap_or(today);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(today);
    (first, last)
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
}

/// Parses an `HH:MM` or `HH:MM:SS` time of day.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(s, TIME_SECONDS_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(s, TIME_FORMAT))
}

/// Formats a time of day as `HH:MM`, or `HH:MM:SS` when seconds are set.
///
/// The result always parses back with [`parse_time_of_day`].
pub fn format_time_of_day(time: NaiveTime) -> String {
    let format = if time.second() == 0 {
        TIME_FORMAT
    } else {
        TIME_SECONDS_FORMAT
    };
    time.format(format).to_string()
}
