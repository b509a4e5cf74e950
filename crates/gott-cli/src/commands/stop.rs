//! Stop command for closing the running interval.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Local};

use gott_db::Store;

use super::status::{NOT_TRACKING, write_status};

pub fn run<W: Write>(writer: &mut W, store: &mut Store, now: DateTime<Local>) -> Result<()> {
    match store.stop_at(now) {
        Some(stopped) => write_status(writer, store, &stopped, now),
        None => {
            writeln!(writer, "{NOT_TRACKING}")?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;
    use gott_core::Interval;
    use insta::assert_snapshot;

    fn at(h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 2, h, m, 0).unwrap()
    }

    #[test]
    fn stop_closes_and_reports() {
        let mut store = Store::in_memory();
        store
            .start_at(Interval::from_tokens(["review", "+pr"]), at(14, 0))
            .unwrap();

        let mut output = Vec::new();
        run(&mut output, &mut store, at(14, 40)).unwrap();

        assert!(store.current().is_none());
        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        tracking review -- pr
             Started        01-02 14:00
             Stopped        01-02 14:40
             Current        00:40
             Total (today)  00:40
        ");
    }

    #[test]
    fn stop_without_tracking() {
        let mut store = Store::in_memory();
        let mut output = Vec::new();
        run(&mut output, &mut store, at(14, 0)).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "<< no tracking in progress >>\n");
    }
}
