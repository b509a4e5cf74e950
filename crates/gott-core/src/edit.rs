//! Plain-text bulk edit documents.
//!
//! A slice of intervals is rendered as one bracketed row per interval:
//!
//! ```text
//! [ID]  [DATE]  [BEGIN]  [END]  [DURATION]  [ANNOTATION TOKENS]
//! ```
//!
//! The user edits the document in an external editor; [`parse`] reads it
//! back and [`plan_reconcile`] works out which intervals to add, update and
//! remove. Parsing is all-or-nothing: one malformed row rejects the document.

use std::sync::LazyLock;

use chrono::{Duration, NaiveDate, NaiveTime};
use regex::Regex;
use thiserror::Error;

use crate::calendar::{self, DATE_FORMAT, format_time_of_day, local_datetime, start_of_day};
use crate::duration::{self, DurationParseError};
use crate::interval::Interval;
use crate::types::IntervalId;

static FIELD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\[\]]*)\]").unwrap());

/// Spaces between aligned columns.
const COLUMN_GAP: usize = 2;

/// Errors reading an edited document. Line numbers are 1-based.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("line {line}: date is empty but should be filled with format YYYY-MM-DD")]
    MissingDate { line: usize },

    #[error("line {line}: invalid date {value:?}, expected YYYY-MM-DD")]
    DateParse {
        line: usize,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("line {line}: invalid time {value:?}, expected HH:MM or HH:MM:SS")]
    TimeParse {
        line: usize,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("line {line}: {source}")]
    DurationParse {
        line: usize,
        #[source]
        source: DurationParseError,
    },
}

/// Renders intervals as an editable document.
///
/// `filter_args` is recorded in a trailing comment for reference only;
/// `today` fills the template row for new entries.
pub fn serialize<S: AsRef<str>>(intervals: &[Interval], filter_args: &[S], today: NaiveDate) -> String {
    let mut out = String::new();
    out.push_str("# Edit below values to change tracking data\n");
    out.push_str("# - delete rows to delete\n");
    out.push_str("# - set time values 00:00 or leave them empty to just set a duration\n");
    out.push_str("# - leave duration empty or 0s if you set begin and end\n");
    out.push_str("# - leave end empty to keep an interval running\n");
    out.push_str("# - prefix end with its date (YYYY-MM-DD HH:MM) if it is on a later day\n");
    out.push('\n');

    let rows: Vec<[String; 6]> = intervals.iter().map(|i| row(i, today)).collect();
    let mut widths = [0usize; 6];
    for cells in &rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }
    for cells in &rows {
        let mut line = String::new();
        for (n, cell) in cells.iter().enumerate() {
            if n + 1 == cells.len() {
                line.push_str(cell);
            } else {
                line.push_str(&format!("{cell:<width$}", width = widths[n] + COLUMN_GAP));
            }
        }
        out.push_str(&line);
        out.push('\n');
    }

    out.push_str("\n\n# NEW ENTRIES HERE #############################################\n");
    out.push_str("# [ID (empty)] [DATE] [BEGIN] [END] [DURATION] [ANNOTATION]\n");
    out.push_str(&format!("\n# [] [{}] [] [] [] []\n", today.format(DATE_FORMAT)));

    let filter: Vec<&str> = filter_args.iter().map(|a| a.as_ref()).collect();
    out.push_str("\n\n\n\n# meta #########################################################\n");
    out.push_str(&format!("# ;; filter == {}\n", filter.join(" ")));
    out
}

fn row(interval: &Interval, today: NaiveDate) -> [String; 6] {
    let bracket = |s: &str| format!("[{s}]");
    let day = interval.begin.map_or(today, |b| b.date_naive());
    let begin = interval
        .begin
        .map(|b| format_time_of_day(b.time()))
        .unwrap_or_default();
    let end = interval
        .end
        .map(|e| {
            let time = format_time_of_day(e.time());
            if e.date_naive() == day {
                time
            } else {
                format!("{} {time}", e.format(DATE_FORMAT))
            }
        })
        .unwrap_or_default();
    let tokens = interval.replay_tokens().join(" ");

    [
        bracket(interval.id_str()),
        bracket(&day.format(DATE_FORMAT).to_string()),
        bracket(&begin),
        bracket(&end),
        bracket(&duration::format(interval.duration)),
        bracket(&tokens),
    ]
}

/// Parses an edited document.
///
/// Blank lines and lines starting with `#` are skipped. Any malformed row
/// fails the whole parse.
pub fn parse(text: &str) -> Result<Vec<Interval>, EditError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim_start();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(|(n, line)| parse_line(line, n + 1))
        .collect()
}

fn parse_line(text: &str, line: usize) -> Result<Interval, EditError> {
    let fields: Vec<&str> = FIELD_RE
        .captures_iter(text)
        .map(|caps| caps.get(1).map_or("", |m| m.as_str()).trim())
        .collect();
    let field = |n: usize| fields.get(n).copied().unwrap_or("");
    let (id, date, begin, end, duration_text) = (field(0), field(1), field(2), field(3), field(4));

    let tokens: Vec<&str> = fields
        .iter()
        .skip(5)
        .flat_map(|f| f.split_whitespace())
        .collect();
    let mut interval = Interval::from_tokens(tokens);

    if date.is_empty() {
        return Err(EditError::MissingDate { line });
    }
    let day = parse_day(date, line)?;

    // END only matters once BEGIN is given.
    let (begin_time, end_cell) = if begin.is_empty() {
        (None, None)
    } else if end.is_empty() {
        (Some(parse_time(begin, line)?), None)
    } else {
        (Some(parse_time(begin, line)?), Some(parse_end(end, line)?))
    };

    // A bare midnight counts as "no time given".
    let begin_time = begin_time.filter(|t| *t != NaiveTime::MIN);
    match (begin_time, end_cell) {
        (Some(b), Some(EndCell::At(end_day, e))) => {
            interval.begin = Some(local_datetime(day, b));
            interval.end = Some(local_datetime(end_day, e));
        }
        (Some(b), Some(EndCell::Time(e))) if e != NaiveTime::MIN => {
            // An END earlier than BEGIN is on the following day.
            let end_day = if e < b {
                day.succ_opt().unwrap_or(day)
            } else {
                day
            };
            interval.begin = Some(local_datetime(day, b));
            interval.end = Some(local_datetime(end_day, e));
        }
        (Some(b), None) if is_unset_duration(duration_text) => {
            interval.begin = Some(local_datetime(day, b));
            interval.end = None;
        }
        _ => {
            let elapsed = duration::parse(duration_text)
                .map_err(|source| EditError::DurationParse { line, source })?;
            let midnight = start_of_day(day);
            interval.begin = Some(midnight);
            interval.end = Some(midnight);
            interval.duration = elapsed;
        }
    }

    interval.id = IntervalId::new(id).ok();
    Ok(interval)
}

/// An END cell: a time on the row's date, or a date and time of its own.
enum EndCell {
    Time(NaiveTime),
    At(NaiveDate, NaiveTime),
}

fn parse_end(value: &str, line: usize) -> Result<EndCell, EditError> {
    match value.split_once(char::is_whitespace) {
        Some((date, time)) => Ok(EndCell::At(
            parse_day(date, line)?,
            parse_time(time.trim(), line)?,
        )),
        None => Ok(EndCell::Time(parse_time(value, line)?)),
    }
}

fn parse_day(value: &str, line: usize) -> Result<NaiveDate, EditError> {
    calendar::parse_date(value).map_err(|source| EditError::DateParse {
        line,
        value: value.to_string(),
        source,
    })
}

fn parse_time(value: &str, line: usize) -> Result<NaiveTime, EditError> {
    calendar::parse_time_of_day(value).map_err(|source| EditError::TimeParse {
        line,
        value: value.to_string(),
        source,
    })
}

fn is_unset_duration(text: &str) -> bool {
    text.is_empty() || duration::parse(text).is_ok_and(|d| d == Duration::zero())
}

/// Changes inferred from an edited document.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Rows without an ID, to be stored as new intervals.
    pub appends: Vec<Interval>,
    /// Rows with an ID, replacing the stored interval of that ID.
    pub updates: Vec<Interval>,
    /// IDs that were in the document before editing and are gone now.
    pub removals: Vec<IntervalId>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.appends.is_empty() && self.updates.is_empty() && self.removals.is_empty()
    }
}

/// Diffs the parsed document against the IDs it was generated from.
///
/// Every row counts as an ID after the edit: updated rows keep theirs and
/// appended rows receive a fresh one when stored. Deletions are only
/// inferred when that count differs from the number of original rows, so
/// deleting one row while adding another removes nothing.
pub fn plan_reconcile(before_ids: &[IntervalId], parsed: Vec<Interval>) -> ReconcilePlan {
    let mut plan = ReconcilePlan::default();
    let mut after_ids = Vec::new();

    for interval in parsed {
        match &interval.id {
            None => plan.appends.push(interval),
            Some(id) => {
                after_ids.push(id.clone());
                plan.updates.push(interval);
            }
        }
    }

    if before_ids.len() != after_ids.len() + plan.appends.len() {
        plan.removals = before_ids
            .iter()
            .filter(|id| !after_ids.contains(id))
            .cloned()
            .collect();
    }

    tracing::debug!(
        appends = plan.appends.len(),
        updates = plan.updates.len(),
        removals = plan.removals.len(),
        "planned reconcile"
    );
    plan
}
