//! Engine output and the store seam
//!
//! A [VersificationMapping] is the unit handed to the external store. The store reads it
//! through the flat [StoreRow] layout and executes the [MoveOp]; nothing in this crate moves
//! verse text itself.

use crate::tvtms::action::ActionKind;
use crate::tvtms::reference::VerseRef;
use crate::tvtms::tradition::TraditionTag;
use serde::Serialize;
use std::convert::Infallible;
use std::fmt;

/// The text operation a mapping asks the store to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MoveOp {
    /// Copy the source text to the same-numbered standard coordinate.
    MoveText,
    /// Append the source text to an existing verse.
    MergeInto(VerseRef),
    /// Move the source text to a differently-numbered verse.
    RenumberTo(VerseRef),
    /// The coordinate has no text in the standard tradition.
    MarkAbsent,
}

impl MoveOp {
    pub fn name(&self) -> &'static str {
        match self {
            MoveOp::MoveText => "move-text",
            MoveOp::MergeInto(_) => "merge-into",
            MoveOp::RenumberTo(_) => "renumber-to",
            MoveOp::MarkAbsent => "mark-absent",
        }
    }
}

impl fmt::Display for MoveOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveOp::MergeInto(target) | MoveOp::RenumberTo(target) => {
                write!(f, "{}({})", self.name(), target)
            }
            MoveOp::MoveText | MoveOp::MarkAbsent => f.write_str(self.name()),
        }
    }
}

/// `target` is `None` exactly when the operation is `MarkAbsent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersificationMapping {
    pub source: VerseRef,
    pub source_tradition: TraditionTag,
    pub target: Option<VerseRef>,
    pub target_tradition: TraditionTag,
    pub operation: MoveOp,
    pub action: ActionKind,
    /// Table line of the row the mapping came from.
    pub line: usize,
}

impl VersificationMapping {
    pub fn to_store_row(&self) -> StoreRow {
        let (target_book, target_chapter, target_verse, target_subverse) = match &self.target {
            Some(target) => (
                Some(target.book.code().to_string()),
                Some(target.chapter.to_string()),
                Some(target.verse),
                target.subverse.map(|tag| tag.to_string()),
            ),
            None => (None, None, None, None),
        };
        StoreRow {
            source_book: self.source.book.code().to_string(),
            source_chapter: self.source.chapter.to_string(),
            source_verse: self.source.verse,
            source_subverse: self.source.subverse.map(|tag| tag.to_string()),
            target_book,
            target_chapter,
            target_verse,
            target_subverse,
            operation: self.operation.name().to_string(),
            source_tradition: self.source_tradition.name().to_string(),
            target_tradition: self.target_tradition.name().to_string(),
        }
    }
}

impl fmt::Display for VersificationMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Some(target) => write!(f, "{} -> {} {}", self.source, target, self.operation.name()),
            None => write!(f, "{} {}", self.source, self.operation.name()),
        }
    }
}

/// Flat persisted layout, one row per mapping. Target columns are NULL for `MarkAbsent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreRow {
    pub source_book: String,
    pub source_chapter: String,
    pub source_verse: u32,
    pub source_subverse: Option<String>,
    pub target_book: Option<String>,
    pub target_chapter: Option<String>,
    pub target_verse: Option<u32>,
    pub target_subverse: Option<String>,
    pub operation: String,
    pub source_tradition: String,
    pub target_tradition: String,
}

impl StoreRow {
    pub const COLUMNS: &'static [&'static str] = &[
        "source_book",
        "source_chapter",
        "source_verse",
        "source_subverse",
        "target_book",
        "target_chapter",
        "target_verse",
        "target_subverse",
        "operation",
        "source_tradition",
        "target_tradition",
    ];

    /// Cells in [StoreRow::COLUMNS] order; NULLs are empty strings.
    pub fn cells(&self) -> Vec<String> {
        let opt = |value: &Option<String>| value.clone().unwrap_or_default();
        vec![
            self.source_book.clone(),
            self.source_chapter.clone(),
            self.source_verse.to_string(),
            opt(&self.source_subverse),
            opt(&self.target_book),
            opt(&self.target_chapter),
            self.target_verse.map(|v| v.to_string()).unwrap_or_default(),
            opt(&self.target_subverse),
            self.operation.clone(),
            self.source_tradition.clone(),
            self.target_tradition.clone(),
        ]
    }
}

/// Write surface of the external store.
pub trait MappingSink {
    type Error: std::error::Error;

    fn write(&mut self, mapping: &VersificationMapping) -> Result<(), Self::Error>;

    fn write_all(&mut self, mappings: &[VersificationMapping]) -> Result<usize, Self::Error> {
        for mapping in mappings {
            self.write(mapping)?;
        }
        Ok(mappings.len())
    }
}

/// Collects store rows in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    rows: Vec<StoreRow>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[StoreRow] {
        &self.rows
    }
}

impl MappingSink for MemorySink {
    type Error = Infallible;

    fn write(&mut self, mapping: &VersificationMapping) -> Result<(), Self::Error> {
        self.rows.push(mapping.to_store_row());
        Ok(())
    }
}
