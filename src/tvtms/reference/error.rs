use serde::Serialize;
use std::fmt;
use std::ops::Range;
use thiserror::Error;

/// Why a reference cell was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ParseErrorKind {
    Empty,
    InvalidCharacter,
    UnknownBook,
    BadChapterToken,
    BadVerseToken,
    UnbalancedBracket,
    RangeSpansChapters,
    TrailingInput,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ParseErrorKind::Empty => "empty reference",
            ParseErrorKind::InvalidCharacter => "invalid character",
            ParseErrorKind::UnknownBook => "unknown book",
            ParseErrorKind::BadChapterToken => "bad chapter token",
            ParseErrorKind::BadVerseToken => "bad verse token",
            ParseErrorKind::UnbalancedBracket => "unbalanced bracket",
            ParseErrorKind::RangeSpansChapters => "range spans chapters",
            ParseErrorKind::TrailingInput => "trailing input",
        };
        f.write_str(text)
    }
}

/// A malformed reference cell. `span` indexes into `raw`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{kind} in '{raw}': {detail}")]
pub struct ParseError {
    pub raw: String,
    pub kind: ParseErrorKind,
    pub span: Range<usize>,
    pub detail: String,
}

impl ParseError {
    pub fn new(
        raw: &str,
        kind: ParseErrorKind,
        span: Range<usize>,
        detail: impl Into<String>,
    ) -> Self {
        ParseError {
            raw: raw.to_string(),
            kind,
            span,
            detail: detail.into(),
        }
    }

    /// The text the error points at.
    pub fn offending_text(&self) -> &str {
        self.raw.get(self.span.clone()).unwrap_or("")
    }
}
