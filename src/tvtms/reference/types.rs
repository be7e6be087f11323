//! Reference value types

use crate::tvtms::books::BookCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A chapter is either numbered or lettered (Esther `A`..`F`, Daniel prologues).
///
/// The derived ordering only exists so coordinates can key ordered maps. Letter chapters are
/// never compared numerically with numbered ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChapterId {
    Numeric(u32),
    Letter(char),
}

impl fmt::Display for ChapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChapterId::Numeric(n) => write!(f, "{}", n),
            ChapterId::Letter(c) => write!(f, "{}", c),
        }
    }
}

/// Finer division of a verse. Numeric and alphabetic tags come from different traditions and
/// are never normalized into one another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SubverseTag {
    Numeric(u8),
    Alpha(char),
}

impl SubverseTag {
    pub fn same_kind(&self, other: &SubverseTag) -> bool {
        matches!(
            (self, other),
            (SubverseTag::Numeric(_), SubverseTag::Numeric(_))
                | (SubverseTag::Alpha(_), SubverseTag::Alpha(_))
        )
    }
}

impl fmt::Display for SubverseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubverseTag::Numeric(n) => write!(f, "{}", n),
            SubverseTag::Alpha(c) => write!(f, "{}", c),
        }
    }
}

/// A single verse coordinate. `verse == 0` is the title line of a psalm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VerseRef {
    pub book: BookCode,
    pub chapter: ChapterId,
    pub verse: u32,
    pub subverse: Option<SubverseTag>,
}

impl VerseRef {
    pub fn new(book: BookCode, chapter: ChapterId, verse: u32) -> Self {
        VerseRef {
            book,
            chapter,
            verse,
            subverse: None,
        }
    }

    pub fn with_subverse(mut self, tag: SubverseTag) -> Self {
        self.subverse = Some(tag);
        self
    }

    pub fn is_title(&self) -> bool {
        self.verse == 0
    }

    /// The same coordinate without its subverse tag.
    pub fn whole_verse(&self) -> VerseRef {
        VerseRef {
            subverse: None,
            ..*self
        }
    }

    pub fn same_chapter(&self, other: &VerseRef) -> bool {
        self.book == other.book && self.chapter == other.chapter
    }
}

impl fmt::Display for VerseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.book, self.chapter, self.verse)?;
        if let Some(tag) = self.subverse {
            write!(f, ".{}", tag)?;
        }
        Ok(())
    }
}

/// Parsed form of one reference cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceSpec {
    Single(VerseRef),
    /// Inclusive, same book and chapter.
    Range(VerseRef, VerseRef),
    Absent,
    /// An alternate numbering printed next to the primary one.
    VariantAlternate {
        primary: VerseRef,
        alternate: VerseRef,
    },
}

impl ReferenceSpec {
    /// The coordinate this spec stands for; the start for a range, `None` for `Absent`.
    pub fn primary(&self) -> Option<&VerseRef> {
        match self {
            ReferenceSpec::Single(verse) => Some(verse),
            ReferenceSpec::Range(start, _) => Some(start),
            ReferenceSpec::Absent => None,
            ReferenceSpec::VariantAlternate { primary, .. } => Some(primary),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, ReferenceSpec::Absent)
    }

    pub fn is_range(&self) -> bool {
        matches!(self, ReferenceSpec::Range(..))
    }
}

impl fmt::Display for ReferenceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceSpec::Single(verse) => write!(f, "{}", verse),
            ReferenceSpec::Absent => f.write_str(super::ABSENT_KEYWORD),
            ReferenceSpec::Range(start, end) => {
                write!(f, "{}-", start)?;
                match end.subverse {
                    None => write!(f, "{}", end.verse),
                    Some(tag @ SubverseTag::Alpha(_)) => write!(f, "{}.{}", end.verse, tag),
                    // `V.N` would read back as chapter.verse
                    Some(tag @ SubverseTag::Numeric(_)) => {
                        write!(f, "{}.{}.{}", end.chapter, end.verse, tag)
                    }
                }
            }
            ReferenceSpec::VariantAlternate { primary, alternate } => {
                write!(f, "{}(", primary)?;
                if alternate.book != primary.book {
                    write!(f, "{}.", alternate.book)?;
                }
                write!(f, "{}.{}", alternate.chapter, alternate.verse)?;
                if let Some(tag) = alternate.subverse {
                    write!(f, ".{}", tag)?;
                }
                f.write_str(")")
            }
        }
    }
}
