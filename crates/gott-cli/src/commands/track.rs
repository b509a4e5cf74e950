//! Track command for recording a finished interval by duration.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};

use gott_core::calendar::{self, DATE_FORMAT};
use gott_core::{FilterKeyword, Interval, duration};
use gott_db::Store;

use crate::TrackArgs;

/// Resolves `:today`, `:yesterday` or a `YYYY-MM-DD` date.
fn resolve_date(arg: &str, today: NaiveDate) -> Result<NaiveDate> {
    match arg.parse::<FilterKeyword>() {
        Ok(FilterKeyword::Today) => Ok(today),
        Ok(FilterKeyword::Yesterday) => Ok(today - Duration::days(1)),
        _ => calendar::parse_date(arg)
            .with_context(|| format!("invalid date {arg:?}: use :today, :yesterday or YYYY-MM-DD")),
    }
}

pub fn run<W: Write>(
    writer: &mut W,
    store: &mut Store,
    args: &TrackArgs,
    today: NaiveDate,
) -> Result<()> {
    let day = resolve_date(&args.date, today)?;
    let elapsed = duration::parse(&args.duration).context("invalid duration")?;

    let mut interval = Interval::from_tokens(&args.tokens);
    let midnight = calendar::start_of_day(day);
    interval.begin = Some(midnight);
    interval.end = Some(midnight);
    interval.duration = elapsed;

    let id = store.append(interval)?;
    writeln!(
        writer,
        "tracked {} on {} ({id})",
        duration::format_clock(elapsed),
        day.format(DATE_FORMAT)
    )?;
    Ok(())
}
