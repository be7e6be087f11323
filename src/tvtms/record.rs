//! Loaded TVTMS records

use crate::tvtms::action::ActionKind;
use crate::tvtms::condition::TestExpr;
use crate::tvtms::reference::{ReferenceSpec, VerseRef};
use crate::tvtms::tradition::TraditionTag;
use serde::Serialize;
use std::collections::BTreeSet;

/// One data row of the table, split into cells. `line` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub line: usize,
    pub cells: Vec<String>,
}

impl RawRow {
    /// The cell at `index`, or `""` if the row doesn't reach that column.
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }
}

/// A validated row, after range fan-out. Neither reference is ever a `Range`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingRecord {
    pub line: usize,
    pub source_type: TraditionTag,
    pub source_ref: ReferenceSpec,
    pub standard_ref: ReferenceSpec,
    pub action: ActionKind,
    pub note_marker: String,
    pub note_a: String,
    pub note_b: String,
    pub applicable_traditions: BTreeSet<TraditionTag>,
    pub test_condition: Option<TestExpr>,
}

impl MappingRecord {
    /// The coordinate the record is about: the source side if it is concrete, else the
    /// standard side.
    pub fn subject(&self) -> Option<&VerseRef> {
        self.source_ref.primary().or_else(|| self.standard_ref.primary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tvtms::reference::parse_reference;

    fn record(source: &str, standard: &str) -> MappingRecord {
        MappingRecord {
            line: 1,
            source_type: TraditionTag::Hebrew,
            source_ref: parse_reference(source).unwrap(),
            standard_ref: parse_reference(standard).unwrap(),
            action: ActionKind::MarkAbsent,
            note_marker: String::new(),
            note_a: String::new(),
            note_b: String::new(),
            applicable_traditions: BTreeSet::new(),
            test_condition: None,
        }
    }

    #[test]
    fn test_subject_prefers_source() {
        let r = record("Rom.16.25", "Rom.14.24");
        assert_eq!(r.subject().unwrap().to_string(), "Rom.16.25");

        let r = record("Absent", "Rom.14.24");
        assert_eq!(r.subject().unwrap().to_string(), "Rom.14.24");

        assert!(record("Absent", "Absent").subject().is_none());
    }

    #[test]
    fn test_raw_row_missing_cells_are_blank() {
        let row = RawRow {
            line: 3,
            cells: vec!["Hebrew".into()],
        };
        assert_eq!(row.cell(0), "Hebrew");
        assert_eq!(row.cell(8), "");
    }
}
