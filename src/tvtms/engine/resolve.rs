//! Per-record resolution
//!
//! Turns one record into the mapping its action implies:
//!
//! | Action        | Needs                               | Operation             |
//! |---------------|-------------------------------------|-----------------------|
//! | Merged        | source and standard                 | MergeInto(standard)   |
//! | Renumber      | source and standard                 | RenumberTo(standard)  |
//! | RenumberTitle | both, verse 0 on one side           | RenumberTo(standard)  |
//! | KeepVerse     | source and standard                 | MoveText              |
//! | PsalmTitle    | both, verse 0 on the standard side  | MoveText              |
//! | MarkAbsent    | any coordinate                      | MarkAbsent            |

use super::context::ResolutionContext;
use crate::tvtms::action::ActionKind;
use crate::tvtms::mapping::{MoveOp, VersificationMapping};
use crate::tvtms::record::MappingRecord;
use crate::tvtms::reference::VerseRef;
use crate::tvtms::tradition::TraditionTag;
use serde::Serialize;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FailureReason {
    AbsentSource,
    AbsentStandard,
    /// Neither side names a coordinate.
    NoCoordinate,
    /// Alphabetic and numeric subverses would end up in one verse.
    SubverseKindMismatch,
    MissingTitleVerse,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FailureReason::AbsentSource => "action needs a source coordinate",
            FailureReason::AbsentStandard => "action needs a standard coordinate",
            FailureReason::NoCoordinate => "neither side names a coordinate",
            FailureReason::SubverseKindMismatch => "alphabetic and numeric subverses cannot merge",
            FailureReason::MissingTitleVerse => "title action without a verse 0",
        };
        f.write_str(text)
    }
}

/// A record that produced no mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionFailure {
    pub line: usize,
    pub action: ActionKind,
    pub subject: Option<VerseRef>,
    pub reason: FailureReason,
}

impl fmt::Display for ResolutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} ({}): {}", self.line, self.action, self.reason)?;
        if let Some(subject) = &self.subject {
            write!(f, " at {}", subject)?;
        }
        Ok(())
    }
}

pub fn resolve(
    record: &MappingRecord,
    ctx: &ResolutionContext,
    target_tradition: TraditionTag,
) -> Result<VersificationMapping, ResolutionFailure> {
    let fail = |reason| ResolutionFailure {
        line: record.line,
        action: record.action,
        subject: record.subject().copied(),
        reason,
    };

    let source = record.source_ref.primary().map(|source| {
        match ctx.redirect(source) {
            Some(moved) => {
                debug!("line {}: {} was merged into {}", record.line, source, moved);
                moved
            }
            None => *source,
        }
    });
    let standard = record.standard_ref.primary().copied();

    let both = || match (source, standard) {
        (Some(source), Some(standard)) => Ok((source, standard)),
        (None, _) => Err(fail(FailureReason::AbsentSource)),
        (_, None) => Err(fail(FailureReason::AbsentStandard)),
    };

    let (source, target, operation) = match record.action {
        ActionKind::Merged => {
            let (source, target) = both()?;
            let mismatched = |other: &VerseRef| match (source.subverse, other.subverse) {
                (Some(a), Some(b)) => !a.same_kind(&b),
                _ => false,
            };
            if mismatched(&target)
                || ctx
                    .merged_subverses(&target)
                    .iter()
                    .any(|tag| source.subverse.is_some_and(|own| !own.same_kind(tag)))
            {
                return Err(fail(FailureReason::SubverseKindMismatch));
            }
            (source, Some(target), MoveOp::MergeInto(target))
        }
        ActionKind::Renumber => {
            let (source, target) = both()?;
            (source, Some(target), MoveOp::RenumberTo(target))
        }
        ActionKind::RenumberTitle => {
            let (source, target) = both()?;
            if !source.is_title() && !target.is_title() {
                return Err(fail(FailureReason::MissingTitleVerse));
            }
            (source, Some(target), MoveOp::RenumberTo(target))
        }
        ActionKind::KeepVerse => {
            let (source, target) = both()?;
            (source, Some(target), MoveOp::MoveText)
        }
        ActionKind::PsalmTitle => {
            let (source, target) = both()?;
            if !target.is_title() {
                return Err(fail(FailureReason::MissingTitleVerse));
            }
            (source, Some(target), MoveOp::MoveText)
        }
        ActionKind::MarkAbsent => {
            let subject = source
                .or(standard)
                .ok_or_else(|| fail(FailureReason::NoCoordinate))?;
            (subject, None, MoveOp::MarkAbsent)
        }
    };

    Ok(VersificationMapping {
        source,
        source_tradition: record.source_type,
        target,
        target_tradition,
        operation,
        action: record.action,
        line: record.line,
    })
}
