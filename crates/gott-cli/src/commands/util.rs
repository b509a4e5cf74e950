//! Shared utilities for CLI commands.

use std::io::{self, Write};

use gott_core::FilterKeyword;

/// Spaces between table columns.
const COLUMN_GAP: usize = 2;

/// Filter arguments, defaulting to `:today` when none were given.
pub fn filter_or_today(args: &[String]) -> Vec<String> {
    if args.is_empty() {
        vec![FilterKeyword::Today.to_string()]
    } else {
        args.to_vec()
    }
}

/// Writes rows as left-aligned columns separated by at least two spaces.
///
/// Trailing whitespace is trimmed from each line.
pub fn write_table<W: Write>(writer: &mut W, rows: &[Vec<String>]) -> io::Result<()> {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|c| {
            rows.iter()
                .filter_map(|row| row.get(c))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    for row in rows {
        let mut line = String::new();
        for (cell, width) in row.iter().zip(&widths) {
            line.push_str(cell);
            let pad = width - cell.chars().count() + COLUMN_GAP;
            line.extend(std::iter::repeat_n(' ', pad));
        }
        writeln!(writer, "{}", line.trim_end())?;
    }
    Ok(())
}
