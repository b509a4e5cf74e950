//! Cancel command for discarding the running interval.

use std::io::Write;

use anyhow::Result;

use gott_db::Store;

pub fn run<W: Write>(writer: &mut W, store: &mut Store) -> Result<()> {
    match store.cancel() {
        Some(cancelled) => writeln!(writer, "cancelled {}", cancelled.raw)?,
        None => writeln!(writer, "no tracking in progress")?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Local, TimeZone};
    use gott_core::Interval;

    #[test]
    fn cancel_discards_current() {
        let mut store = Store::in_memory();
        let begin = Local.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap();
        store
            .start_at(Interval::from_tokens(["oops", "+x"]), begin)
            .unwrap();

        let mut output = Vec::new();
        run(&mut output, &mut store).unwrap();

        assert_eq!(store.count(), 0);
        assert_eq!(String::from_utf8(output).unwrap(), "cancelled oops +x\n");
    }

    #[test]
    fn cancel_without_tracking() {
        let mut store = Store::in_memory();
        let mut output = Vec::new();
        run(&mut output, &mut store).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "no tracking in progress\n");
    }
}
