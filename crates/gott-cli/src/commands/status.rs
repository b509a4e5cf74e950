//! Status command for showing the running interval.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Duration, Local};

use gott_core::{FilterKeyword, Interval, duration};
use gott_db::Store;

use super::util::write_table;

/// Printed when nothing is being tracked.
pub const NOT_TRACKING: &str = "<< no tracking in progress >>";

const STAMP_FORMAT: &str = "%m-%d %H:%M";

pub fn run<W: Write>(writer: &mut W, store: &Store, now: DateTime<Local>) -> Result<()> {
    match store.current() {
        Some(current) => write_status(writer, store, current, now),
        None => {
            writeln!(writer, "{NOT_TRACKING}")?;
            Ok(())
        }
    }
}

/// Describes `interval` with its elapsed time and today's total.
pub fn write_status<W: Write>(
    writer: &mut W,
    store: &Store,
    interval: &Interval,
    now: DateTime<Local>,
) -> Result<()> {
    let mut headline = format!("tracking {}", interval.annotation);
    if let Some(project) = &interval.project {
        headline.push_str(&format!(" -- proj:{project}"));
    }
    if !interval.tags.is_empty() {
        headline.push_str(&format!(" -- {}", interval.tags.join(", ")));
    }
    if let Some(reference) = &interval.reference {
        headline.push_str(&format!(" -- ref:{reference}"));
    }
    writeln!(writer, "{}", headline.trim_end())?;

    let today_total = store
        .filter_at(&[FilterKeyword::Today.as_str()], now.date_naive())?
        .iter()
        .map(|i| i.elapsed(now))
        .fold(Duration::zero(), |acc, d| acc + d);

    let mut rows = Vec::new();
    if let Some(begin) = interval.begin {
        rows.push(line("Started", begin.format(STAMP_FORMAT).to_string()));
    }
    if let Some(end) = interval.end {
        rows.push(line("Stopped", end.format(STAMP_FORMAT).to_string()));
    }
    rows.push(line("Current", duration::format_clock(interval.elapsed(now))));
    rows.push(line("Total (today)", duration::format_clock(today_total)));
    write_table(writer, &rows)?;

    Ok(())
}

fn line(label: &str, value: String) -> Vec<String> {
    vec!["   ".to_string(), label.to_string(), value]
}
