//! Resolution state of one engine run
//!
//! The context is the single writer for claimed coordinates. It is passed down explicitly and
//! owned by one run; there is no global "current state".
//!
//! A mapping claims its target, or its own coordinate for `MarkAbsent`. All live claims on a
//! coordinate always belong to one priority group.

use super::Severity;
use crate::tvtms::mapping::{MoveOp, VersificationMapping};
use crate::tvtms::reference::{SubverseTag, VerseRef};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CollisionKind {
    /// Two mappings of one group claim the same coordinate.
    SameGroup,
    /// A later group retargets a coordinate marked absent, or marks a claimed one absent.
    AbsentConflict,
    /// A later group replaced an earlier group's mapping.
    Superseded,
}

impl fmt::Display for CollisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollisionKind::SameGroup => f.write_str("same-group"),
            CollisionKind::AbsentConflict => f.write_str("absent-conflict"),
            CollisionKind::Superseded => f.write_str("superseded"),
        }
    }
}

/// Two mappings claiming one coordinate. `rejected` is not part of the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionCollision {
    pub coordinate: VerseRef,
    pub kind: CollisionKind,
    pub severity: Severity,
    pub kept: VersificationMapping,
    pub rejected: VersificationMapping,
}

impl fmt::Display for ResolutionCollision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} at {}: kept line {} ({}), rejected line {} ({})",
            self.severity,
            self.kind,
            self.coordinate,
            self.kept.line,
            self.kept,
            self.rejected.line,
            self.rejected
        )
    }
}

/// What happened to a mapping handed to [ResolutionContext::claim].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    Claimed,
    /// Merged into a target other merges of the same group already use.
    Accumulated,
    /// Identical to a mapping already emitted by the same group; dropped.
    Duplicate,
    /// Rejected by a collision.
    Flagged,
    /// Claimed after removing this many mappings of an earlier group.
    Superseded(usize),
}

#[derive(Debug, Clone, Copy)]
struct Claim {
    slot: usize,
    rank: usize,
}

#[derive(Debug, Default)]
pub struct ResolutionContext {
    /// Emitted mappings in emission order; `None` once superseded.
    slots: Vec<Option<VersificationMapping>>,
    claims: HashMap<VerseRef, Vec<Claim>>,
    /// Merged-away source to the slot of its merge, visible from the next group on.
    redirects: HashMap<VerseRef, usize>,
    pending_redirects: Vec<(VerseRef, usize)>,
    collisions: Vec<ResolutionCollision>,
}

/// The coordinate a mapping claims.
pub fn claim_key(mapping: &VersificationMapping) -> VerseRef {
    match mapping.operation {
        MoveOp::MarkAbsent => mapping.source,
        _ => mapping.target.unwrap_or(mapping.source),
    }
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Where the text of `source` lives now, if an earlier group merged it away.
    pub fn redirect(&self, source: &VerseRef) -> Option<VerseRef> {
        let slot = self.redirects.get(source)?;
        match self.slots.get(*slot)?.as_ref()?.operation {
            MoveOp::MergeInto(target) => Some(target),
            _ => None,
        }
    }

    /// Subverse tags of the sources already merged into `target`.
    pub fn merged_subverses(&self, target: &VerseRef) -> Vec<SubverseTag> {
        self.live(target)
            .filter(|mapping| matches!(mapping.operation, MoveOp::MergeInto(_)))
            .filter_map(|mapping| mapping.source.subverse)
            .collect()
    }

    pub fn claim(&mut self, mapping: VersificationMapping, rank: usize) -> ClaimOutcome {
        let key = claim_key(&mapping);
        let existing = self.claims.get(&key).cloned().unwrap_or_default();
        let Some(first) = existing.first().copied() else {
            return self.emit(key, mapping, rank, ClaimOutcome::Claimed);
        };
        let first_mapping = self.slots[first.slot].clone();
        let Some(first_mapping) = first_mapping else {
            return self.emit(key, mapping, rank, ClaimOutcome::Claimed);
        };

        if first.rank == rank {
            if self
                .live(&key)
                .any(|m| m.source == mapping.source && m.operation == mapping.operation)
            {
                debug!("dropping duplicate mapping {} (line {})", mapping, mapping.line);
                return ClaimOutcome::Duplicate;
            }
            let all_merges = matches!(mapping.operation, MoveOp::MergeInto(_))
                && self
                    .live(&key)
                    .all(|m| matches!(m.operation, MoveOp::MergeInto(_)));
            if all_merges {
                return self.emit(key, mapping, rank, ClaimOutcome::Accumulated);
            }
            self.flag(key, CollisionKind::SameGroup, first_mapping, mapping);
            return ClaimOutcome::Flagged;
        }

        let touches_absent = mapping.operation == MoveOp::MarkAbsent
            || self.live(&key).any(|m| m.operation == MoveOp::MarkAbsent);
        if touches_absent {
            self.flag(key, CollisionKind::AbsentConflict, first_mapping, mapping);
            return ClaimOutcome::Flagged;
        }

        let mut removed = 0;
        for claim in existing {
            if let Some(old) = self.slots[claim.slot].take() {
                debug!("{} supersedes {} at {}", mapping, old, key);
                self.collisions.push(ResolutionCollision {
                    coordinate: key,
                    kind: CollisionKind::Superseded,
                    severity: Severity::Warning,
                    kept: mapping.clone(),
                    rejected: old,
                });
                removed += 1;
            }
        }
        self.claims.remove(&key);
        self.emit(key, mapping, rank, ClaimOutcome::Superseded(removed))
    }

    /// Make this group's merges visible to the groups after it.
    pub fn finish_group(&mut self) {
        for (source, slot) in self.pending_redirects.drain(..) {
            self.redirects.insert(source, slot);
        }
    }

    /// Live mappings in emission order.
    pub fn mappings(&self) -> impl Iterator<Item = &VersificationMapping> {
        self.slots.iter().flatten()
    }

    pub fn collisions(&self) -> &[ResolutionCollision] {
        &self.collisions
    }

    pub fn into_parts(self) -> (Vec<VersificationMapping>, Vec<ResolutionCollision>) {
        (self.slots.into_iter().flatten().collect(), self.collisions)
    }

    fn live<'a>(&'a self, key: &VerseRef) -> impl Iterator<Item = &'a VersificationMapping> + 'a {
        self.claims
            .get(key)
            .into_iter()
            .flatten()
            .filter_map(|claim| self.slots.get(claim.slot).and_then(Option::as_ref))
    }

    fn emit(
        &mut self,
        key: VerseRef,
        mapping: VersificationMapping,
        rank: usize,
        outcome: ClaimOutcome,
    ) -> ClaimOutcome {
        let slot = self.slots.len();
        if let MoveOp::MergeInto(_) = mapping.operation {
            self.pending_redirects.push((mapping.source, slot));
        }
        self.slots.push(Some(mapping));
        self.claims.entry(key).or_default().push(Claim { slot, rank });
        outcome
    }

    fn flag(
        &mut self,
        key: VerseRef,
        kind: CollisionKind,
        kept: VersificationMapping,
        rejected: VersificationMapping,
    ) {
        debug!(
            "{} collision at {}: line {} rejected in favour of line {}",
            kind, key, rejected.line, kept.line
        );
        self.collisions.push(ResolutionCollision {
            coordinate: key,
            kind,
            severity: Severity::Error,
            kept,
            rejected,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tvtms::action::ActionKind;
    use crate::tvtms::books::BookCode;
    use crate::tvtms::reference::ChapterId;
    use crate::tvtms::tradition::TraditionTag;

    fn gen(verse: u32) -> VerseRef {
        VerseRef::new(BookCode::Genesis, ChapterId::Numeric(1), verse)
    }

    fn mapping(source: u32, operation: MoveOp, line: usize) -> VersificationMapping {
        let target = match operation {
            MoveOp::MarkAbsent => None,
            MoveOp::MergeInto(t) | MoveOp::RenumberTo(t) => Some(t),
            MoveOp::MoveText => Some(gen(source)),
        };
        VersificationMapping {
            source: gen(source),
            source_tradition: TraditionTag::Hebrew,
            target,
            target_tradition: TraditionTag::English,
            operation,
            action: ActionKind::Renumber,
            line,
        }
    }

    #[test]
    fn test_redirects_wait_for_the_next_group() {
        let mut ctx = ResolutionContext::new();
        ctx.claim(mapping(2, MoveOp::MergeInto(gen(1)), 1), 0);
        assert_eq!(ctx.redirect(&gen(2)), None);
        ctx.finish_group();
        assert_eq!(ctx.redirect(&gen(2)), Some(gen(1)));
    }

    #[test]
    fn test_superseded_merge_stops_redirecting() {
        let mut ctx = ResolutionContext::new();
        ctx.claim(mapping(2, MoveOp::MergeInto(gen(1)), 1), 0);
        ctx.finish_group();
        let outcome = ctx.claim(mapping(5, MoveOp::RenumberTo(gen(1)), 2), 1);
        assert_eq!(outcome, ClaimOutcome::Superseded(1));
        assert_eq!(ctx.redirect(&gen(2)), None);
        assert_eq!(ctx.mappings().count(), 1);
        assert_eq!(ctx.collisions()[0].rejected.line, 1);
    }

    #[test]
    fn test_absent_claims_its_own_coordinate() {
        let mut ctx = ResolutionContext::new();
        assert_eq!(
            ctx.claim(mapping(4, MoveOp::MarkAbsent, 1), 0),
            ClaimOutcome::Claimed
        );
        assert_eq!(
            ctx.claim(mapping(9, MoveOp::RenumberTo(gen(4)), 2), 1),
            ClaimOutcome::Flagged
        );
        assert_eq!(ctx.collisions()[0].kind, CollisionKind::AbsentConflict);
    }

    #[test]
    fn test_merged_subverses() {
        let mut ctx = ResolutionContext::new();
        let mut tagged = mapping(2, MoveOp::MergeInto(gen(1)), 1);
        tagged.source = tagged.source.with_subverse(SubverseTag::Alpha('a'));
        ctx.claim(tagged, 0);
        assert_eq!(ctx.merged_subverses(&gen(1)), vec![SubverseTag::Alpha('a')]);
    }
}
