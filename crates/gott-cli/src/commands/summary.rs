//! Summary command for tabulating intervals with day and week totals.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Datelike, Duration, IsoWeek, Local, NaiveDate};

use gott_core::calendar::TIME_FORMAT;
use gott_core::{Interval, duration};
use gott_db::Store;

use super::util::{filter_or_today, write_table};

const HEADER: [&str; 8] = [
    "CWEEK",
    "DAY",
    "BEGIN",
    "END",
    "DURATION",
    "PROJECT",
    "TAGS",
    "ANNOTATION",
];

const DAY_FORMAT: &str = "%m-%d";
const RUNNING: &str = "tracking...";

pub fn run<W: Write>(
    writer: &mut W,
    store: &Store,
    filter_args: &[String],
    now: DateTime<Local>,
) -> Result<()> {
    let args = filter_or_today(filter_args);
    let mut intervals = store.filter_at(&args, now.date_naive())?;
    intervals.sort_by_key(|i| i.begin);
    tracing::debug!(filter = ?args, count = intervals.len(), "summarizing intervals");

    write_table(writer, &summary_rows(&intervals, now))?;
    Ok(())
}

/// Running totals for the current day and ISO week groups.
struct Groups {
    day: Option<NaiveDate>,
    week: Option<IsoWeek>,
    day_total: Duration,
    week_total: Duration,
}

impl Groups {
    fn new() -> Self {
        Self {
            day: None,
            week: None,
            day_total: Duration::zero(),
            week_total: Duration::zero(),
        }
    }

    fn close_day(&mut self, rows: &mut Vec<Vec<String>>) {
        if self.day_total > Duration::zero() {
            rows.push(total_row(3, "day =", self.day_total));
        }
        self.day_total = Duration::zero();
    }

    fn close_week(&mut self, rows: &mut Vec<Vec<String>>) {
        if self.week_total > Duration::zero() {
            rows.push(total_row(2, "wk =", self.week_total));
        }
        self.week_total = Duration::zero();
    }
}

fn summary_rows(intervals: &[Interval], now: DateTime<Local>) -> Vec<Vec<String>> {
    let mut rows = vec![HEADER.map(String::from).to_vec()];
    let mut groups = Groups::new();

    for interval in intervals {
        let Some(begin) = interval.begin else {
            continue;
        };
        let day = begin.date_naive();
        let week = day.iso_week();

        if groups.day.is_some_and(|d| d != day) {
            groups.close_day(&mut rows);
        }
        if groups.week.is_some_and(|w| w != week) {
            groups.close_week(&mut rows);
        }

        let day_cell = if groups.day == Some(day) {
            String::new()
        } else {
            begin.format(DAY_FORMAT).to_string()
        };
        let week_cell = if groups.week == Some(week) {
            String::new()
        } else {
            week.week().to_string()
        };
        groups.day = Some(day);
        groups.week = Some(week);

        let elapsed = interval.elapsed(now);
        groups.day_total += elapsed;
        groups.week_total += elapsed;

        rows.push(vec![
            week_cell,
            day_cell,
            begin.format(TIME_FORMAT).to_string(),
            interval
                .end
                .map_or_else(|| RUNNING.to_string(), |e| e.format(TIME_FORMAT).to_string()),
            duration::format_clock(elapsed),
            interval.project.clone().unwrap_or_default(),
            interval.tags.join(", "),
            interval.annotation.clone(),
        ]);
    }

    groups.close_day(&mut rows);
    groups.close_week(&mut rows);
    rows
}

fn total_row(label_column: usize, label: &str, total: Duration) -> Vec<String> {
    let mut row = vec![String::new(); HEADER.len()];
    row[label_column] = label.to_string();
    row[4] = duration::format_clock(total);
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;
    use gott_core::calendar::start_of_day;
    use insta::assert_snapshot;

    fn at(d: u32, h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, d, h, m, 0).unwrap()
    }

    fn closed(tokens: &[&str], begin: DateTime<Local>, end: DateTime<Local>) -> Interval {
        let mut interval = Interval::from_tokens(tokens);
        interval.begin = Some(begin);
        interval.end = Some(end);
        interval
    }

    fn render(store: &Store, filter: &[&str], now: DateTime<Local>) -> String {
        let filter: Vec<String> = filter.iter().map(ToString::to_string).collect();
        let mut output = Vec::new();
        run(&mut output, store, &filter, now).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn summary_groups_days_and_weeks() {
        let mut store = Store::in_memory();
        // Stored out of order; the summary sorts by begin.
        store
            .append(closed(&["beta"], at(5, 13, 0), at(5, 13, 45)))
            .unwrap();
        store
            .append(closed(&["alpha", "+x", "proj:p"], at(5, 9, 0), at(5, 10, 30)))
            .unwrap();
        let mut gamma = Interval::from_tokens(["gamma"]);
        gamma.begin = Some(start_of_day(NaiveDate::from_ymd_opt(2024, 1, 6).unwrap()));
        gamma.duration = Duration::hours(1);
        store.append(gamma).unwrap();
        store
            .start_at(Interval::from_tokens(["delta"]), at(8, 9, 0))
            .unwrap();

        let output = render(&store, &[":all"], at(8, 10, 0));
        assert_snapshot!(output, @r"
        CWEEK  DAY    BEGIN  END          DURATION  PROJECT  TAGS  ANNOTATION
        1      01-05  09:00  10:30        01:30     p        x     alpha
                      13:00  13:45        00:45                    beta
                             day =        02:15
               01-06  00:00  00:00        01:00                    gamma
                             day =        01:00
                      wk =                03:15
        2      01-08  09:00  tracking...  01:00                    delta
                             day =        01:00
                      wk =                01:00
        ");
    }

    #[test]
    fn summary_defaults_to_today() {
        let mut store = Store::in_memory();
        store
            .append(closed(&["old"], at(2, 9, 0), at(2, 10, 0)))
            .unwrap();
        store
            .append(closed(&["new"], at(3, 9, 0), at(3, 10, 0)))
            .unwrap();

        let output = render(&store, &[], at(3, 12, 0));
        assert!(output.contains("new"));
        assert!(!output.contains("old"));
    }

    #[test]
    fn summary_of_nothing_prints_header() {
        let store = Store::in_memory();
        let output = render(&store, &[":week"], at(3, 12, 0));
        assert_eq!(
            output,
            "CWEEK  DAY  BEGIN  END  DURATION  PROJECT  TAGS  ANNOTATION\n"
        );
    }

    #[test]
    fn summary_rejects_bad_filter() {
        let store = Store::in_memory();
        let filter = vec![":today".to_string(), ":week".to_string()];
        let mut output = Vec::new();
        assert!(run(&mut output, &store, &filter, at(3, 12, 0)).is_err());
    }
}
