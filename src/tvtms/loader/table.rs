//! Raw table reading
//!
//! A TVTMS file is a tab-separated table preceded by free-form header text. Only lines between
//! a `#DataStart` marker (any suffix, e.g. `#DataStart(Expanded)`) and an optional `#DataEnd`
//! are data.

use super::LoadError;
use crate::tvtms::record::RawRow;
use once_cell::sync::Lazy;
use regex::Regex;

pub const MIN_CELLS: usize = 4;
pub const MAX_CELLS: usize = 9;

/// First cell of a column header row.
pub const HEADER_CELL: &str = "SourceType";

static DATA_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^#\s*DataStart").expect("valid regex"));
static DATA_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^#\s*DataEnd").expect("valid regex"));

/// Split the data section of `text` into rows.
///
/// Column-count problems are not reported here: a row with the wrong shape is still a row, and
/// whether it aborts the run is up to the strictness policy.
pub fn read_table(text: &str) -> Result<Vec<RawRow>, LoadError> {
    let mut lines = text.lines().enumerate();

    if !lines.any(|(_, line)| DATA_START.is_match(line.trim_start())) {
        return Err(LoadError::MissingDataStart);
    }

    let mut rows = Vec::new();
    for (index, line) in lines {
        let trimmed = line.trim();
        if DATA_END.is_match(trimmed) {
            break;
        }
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let cells: Vec<String> = line
            .split('\t')
            .map(|cell| cell.trim().to_string())
            .collect();
        if cells
            .first()
            .is_some_and(|cell| cell.eq_ignore_ascii_case(HEADER_CELL))
        {
            continue;
        }

        rows.push(RawRow {
            line: index + 1,
            cells: trim_trailing_blanks(cells),
        });
    }
    Ok(rows)
}

/// Check the cell count of a row.
pub fn check_shape(row: &RawRow) -> Result<(), LoadError> {
    if (MIN_CELLS..=MAX_CELLS).contains(&row.cells.len()) {
        Ok(())
    } else {
        Err(LoadError::ColumnCount {
            line: row.line,
            found: row.cells.len(),
        })
    }
}

// Editors pad rows with empty tabs; those never count as columns.
fn trim_trailing_blanks(mut cells: Vec<String>) -> Vec<String> {
    while cells.len() > 1 && cells.last().is_some_and(|cell| cell.is_empty()) {
        cells.pop();
    }
    cells
}
