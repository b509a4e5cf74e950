//! Edit command for bulk changes through an external editor.
//!
//! The filtered intervals are written to a temporary document, the editor
//! runs until it exits, and the edited document is reconciled against the
//! intervals it started from.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;

use gott_core::{IntervalId, edit, plan_reconcile};
use gott_db::Store;

use super::util::filter_or_today;
use crate::config::FALLBACK_EDITOR;

pub fn run<W: Write>(
    writer: &mut W,
    store: &mut Store,
    filter_args: &[String],
    editor: &str,
    today: NaiveDate,
) -> Result<()> {
    let args = filter_or_today(filter_args);
    let selected = store.filter_at(&args, today)?;
    let before_ids: Vec<IntervalId> = selected.iter().filter_map(|i| i.id.clone()).collect();
    let document = edit::serialize(&selected, &args, today);

    let file = tempfile::Builder::new()
        .prefix("gott-")
        .suffix(".md")
        .tempfile()
        .context("failed to create edit document")?;
    fs::write(file.path(), &document).context("failed to write edit document")?;

    launch_editor(editor, file.path())?;

    let edited = fs::read_to_string(file.path()).context("failed to read edit document")?;
    if edited == document {
        writeln!(writer, "no changes")?;
        return Ok(());
    }

    let parsed = edit::parse(&edited).context("edit document rejected, nothing was changed")?;
    let plan = plan_reconcile(&before_ids, parsed);
    let summary = store.reconcile(plan)?;

    writeln!(
        writer,
        "{} added, {} updated, {} removed",
        summary.added.len(),
        summary.updated,
        summary.removed
    )?;
    Ok(())
}

/// Runs `editor` on `path` and waits for it to exit.
///
/// The command is split on whitespace; leading words after the program are
/// passed before the path.
fn launch_editor(editor: &str, path: &Path) -> Result<()> {
    let mut words = editor.split_whitespace();
    let program = words.next().unwrap_or(FALLBACK_EDITOR);
    tracing::debug!(program, path = ?path, "launching editor");

    let status = Command::new(program)
        .args(words)
        .arg(path)
        .status()
        .with_context(|| format!("failed to launch editor {program:?}"))?;
    if !status.success() {
        bail!("editor exited with {status}; nothing was changed");
    }
    Ok(())
}
