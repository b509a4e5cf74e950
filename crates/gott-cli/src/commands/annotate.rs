//! Annotate command for re-describing the running interval.

use std::io::Write;

use anyhow::{Result, bail};
use chrono::{DateTime, Local};

use gott_db::Store;

use super::status::write_status;

pub fn run<W: Write>(
    writer: &mut W,
    store: &mut Store,
    tokens: &[String],
    now: DateTime<Local>,
) -> Result<()> {
    let Some(current) = store.current_mut() else {
        bail!("no tracking in progress; annotate only applies to a running interval");
    };
    current.reclassify(tokens);
    tracing::info!(id = %current.id_str(), "annotated interval");

    let current = current.clone();
    write_status(writer, store, &current, now)
}
