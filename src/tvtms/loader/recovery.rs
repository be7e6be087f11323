//! Best-effort repair of reference cells (permissive policy only)
//!
//! Each repair is driven by the span of the [ParseError] and rewrites the cell text, which is
//! then parsed again from scratch:
//!
//!     bad chapter token        -> chapter 1
//!     bad verse token          -> verse 1 (a dangling range end or alternate is dropped)
//!     unbalanced bracket       -> alternate dropped
//!     range spanning chapters  -> start point only
//!     trailing input           -> truncated
//!     invalid character        -> character removed
//!
//! Unknown books and empty cells cannot be repaired: there is no coordinate to guess.

use super::RefField;
use crate::tvtms::reference::{parse_reference, ParseError, ParseErrorKind, ReferenceSpec};
use serde::Serialize;

pub const MAX_ATTEMPTS: usize = 4;

/// A repaired cell, kept for the run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recovery {
    pub line: usize,
    pub field: RefField,
    pub original: String,
    pub recovered: String,
    pub reasons: Vec<ParseErrorKind>,
}

/// Rewrite `error.raw` so the failing token is gone. `None` when no rewrite applies.
pub fn repair(error: &ParseError) -> Option<String> {
    let raw = error.raw.as_str();
    let start = error.span.start.min(raw.len());
    let end = error.span.end.clamp(start, raw.len());
    let offending = raw.get(start..end)?;

    match error.kind {
        ParseErrorKind::Empty | ParseErrorKind::UnknownBook => None,
        ParseErrorKind::BadChapterToken | ParseErrorKind::BadVerseToken => {
            if offending.is_empty() {
                Some(insert_component(raw, start))
            } else if offending.starts_with(|c: char| !c.is_ascii_alphanumeric()) {
                truncate(raw, start)
            } else {
                Some(format!("{}1{}", &raw[..start], &raw[end..]))
            }
        }
        ParseErrorKind::UnbalancedBracket
        | ParseErrorKind::RangeSpansChapters
        | ParseErrorKind::TrailingInput => truncate(raw, start),
        ParseErrorKind::InvalidCharacter => {
            let repaired = format!("{}{}", &raw[..start], &raw[end..]);
            (!repaired.trim().is_empty()).then_some(repaired)
        }
    }
}

/// Parse a cell, repairing it up to [MAX_ATTEMPTS] times.
///
/// On failure the error of the first attempt is returned, since that is the one that describes
/// the cell as written.
pub fn parse_with_recovery(
    cell: &str,
) -> Result<(ReferenceSpec, Option<(String, Vec<ParseErrorKind>)>), ParseError> {
    let first = match parse_reference(cell) {
        Ok(spec) => return Ok((spec, None)),
        Err(error) => error,
    };

    let mut reasons = vec![first.kind];
    let mut error = first.clone();
    for _ in 0..MAX_ATTEMPTS {
        let Some(text) = repair(&error) else {
            break;
        };
        if text == error.raw {
            break;
        }
        match parse_reference(&text) {
            Ok(spec) => return Ok((spec, Some((text.trim().to_string(), reasons)))),
            Err(next) => {
                reasons.push(next.kind);
                error = next;
            }
        }
    }
    Err(first)
}

fn truncate(raw: &str, at: usize) -> Option<String> {
    let kept = raw[..at].trim_end();
    (!kept.is_empty()).then(|| kept.to_string())
}

fn insert_component(raw: &str, at: usize) -> String {
    let before = &raw[..at];
    if before.ends_with(['.', ':']) {
        format!("{}1{}", before, &raw[at..])
    } else {
        format!("{}.1{}", before, &raw[at..])
    }
}
