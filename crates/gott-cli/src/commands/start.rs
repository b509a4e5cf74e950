//! Start command for tracking a new interval.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Local};

use gott_core::Interval;
use gott_db::Store;

use super::status::write_status;

pub fn run<W: Write>(
    writer: &mut W,
    store: &mut Store,
    tokens: &[String],
    now: DateTime<Local>,
) -> Result<()> {
    let started = store.start_at(Interval::from_tokens(tokens), now)?.clone();
    write_status(writer, store, &started, now)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;
    use gott_db::StoreError;
    use insta::assert_snapshot;

    fn at(h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 2, h, m, 0).unwrap()
    }

    fn tokens(t: &[&str]) -> Vec<String> {
        t.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn start_prints_status() {
        let mut store = Store::in_memory();
        let mut output = Vec::new();
        run(&mut output, &mut store, &tokens(&["write", "docs", "proj:gott"]), at(9, 0)).unwrap();

        let current = store.current().unwrap();
        assert_eq!(current.project.as_deref(), Some("gott"));
        assert_eq!(current.raw, "write docs proj:gott");

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        tracking write docs -- proj:gott
             Started        01-02 09:00
             Current        00:00
             Total (today)  00:00
        ");
    }

    #[test]
    fn start_while_tracking_fails() {
        let mut store = Store::in_memory();
        let mut output = Vec::new();
        run(&mut output, &mut store, &tokens(&["a"]), at(9, 0)).unwrap();

        let err = run(&mut output, &mut store, &tokens(&["b"]), at(9, 5)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::AlreadyTracking { .. })
        ));
        assert_eq!(store.count(), 1);
    }
}
