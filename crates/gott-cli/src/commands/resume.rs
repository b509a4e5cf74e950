//! Continue command for restarting the most recent interval.

use std::io::Write;

use anyhow::{Result, bail};
use chrono::{DateTime, Local};

use gott_core::Interval;
use gott_db::Store;

use super::status::write_status;

pub fn run<W: Write>(writer: &mut W, store: &mut Store, now: DateTime<Local>) -> Result<()> {
    if let Some(current) = store.current() {
        bail!(
            "interval {} is still running; nothing to continue",
            current.id_str()
        );
    }

    let replay = Interval::from_tokens(store.latest()?.replay_tokens());
    let started = store.start_at(replay, now)?.clone();
    write_status(writer, store, &started, now)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, TimeZone};
    use gott_db::StoreError;

    fn at(h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 2, h, m, 0).unwrap()
    }

    #[test]
    fn continue_replays_latest_tokens() {
        let mut store = Store::in_memory();
        let mut older = Interval::from_tokens(["older"]);
        older.begin = Some(at(8, 0));
        older.end = Some(at(8, 30));
        store.append(older).unwrap();
        store
            .start_at(
                Interval::from_tokens(["deep", "work", "+focus", "proj:gott"]),
                at(9, 0),
            )
            .unwrap();
        store.stop_at(at(10, 0)).unwrap();

        let mut output = Vec::new();
        run(&mut output, &mut store, at(10, 15)).unwrap();

        let current = store.current().unwrap();
        assert_eq!(current.annotation, "deep work");
        assert_eq!(current.tags, ["focus"]);
        assert_eq!(current.project.as_deref(), Some("gott"));
        assert_eq!(current.begin, Some(at(10, 15)));
        assert_eq!(current.elapsed(at(10, 45)), Duration::minutes(30));
        assert_eq!(store.count(), 3);

        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("tracking deep work -- proj:gott -- focus\n"));
    }

    #[test]
    fn continue_while_tracking_fails() {
        let mut store = Store::in_memory();
        store.start_at(Interval::from_tokens(["a"]), at(9, 0)).unwrap();

        let mut output = Vec::new();
        let err = run(&mut output, &mut store, at(9, 5)).unwrap_err();
        assert!(err.to_string().contains("still running"));
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn continue_on_empty_store_fails() {
        let mut store = Store::in_memory();
        let mut output = Vec::new();
        let err = run(&mut output, &mut store, at(9, 0)).unwrap_err();
        assert!(matches!(err.downcast_ref::<StoreError>(), Some(StoreError::Empty)));
    }
}
