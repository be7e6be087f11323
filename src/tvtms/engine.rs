//! Mapping engine
//!
//!     Records are grouped by action and the groups are applied in [PriorityTable] order,
//!     input order within a group. Every resolved mapping claims a coordinate in an explicit
//!     [ResolutionContext]; later groups see what earlier groups left behind:
//!
//!     - a source merged away by an earlier group now lives in its merge target, so later
//!       records about it are redirected there;
//!     - a later group may retarget a coordinate an earlier group claimed (the earlier mapping
//!       is superseded and reported), except where either side marks the coordinate absent;
//!     - two mappings of the same group claiming one coordinate is always an error, except
//!       for merges, which accumulate.
//!
//!     Nothing is silently resolved: superseded and flagged mappings end up in the
//!     [ValidationReport], next to unresolved records and per-book coverage.
//!
//!     The engine keeps no state between runs and never talks to the store.

pub mod context;
pub mod coverage;
pub mod resolve;

use crate::tvtms::action::PriorityTable;
use crate::tvtms::catalog::VerseCatalog;
use crate::tvtms::mapping::VersificationMapping;
use crate::tvtms::record::MappingRecord;
use crate::tvtms::report::RunStatus;
use crate::tvtms::tradition::TraditionTag;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

pub use context::{ClaimOutcome, CollisionKind, ResolutionCollision, ResolutionContext};
pub use coverage::{BookCoverage, CoverageViolation};
pub use resolve::{FailureReason, ResolutionFailure};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// Coverage below `error_floor` fails a book, below `warning_floor` warns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageFloors {
    pub error_floor: f64,
    pub warning_floor: f64,
}

impl Default for CoverageFloors {
    fn default() -> Self {
        CoverageFloors {
            error_floor: 0.80,
            warning_floor: 0.90,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    pub priorities: PriorityTable,
    pub floors: CoverageFloors,
    pub target_tradition: TraditionTag,
    /// Expected verses per book. Without it coverage is measured against the records.
    pub catalog: Option<VerseCatalog>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub collisions: Vec<ResolutionCollision>,
    pub unresolved: Vec<ResolutionFailure>,
    pub coverage: Vec<BookCoverage>,
    pub violations: Vec<CoverageViolation>,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        self.collisions.iter().any(|c| c.severity == Severity::Error)
            || self.violations.iter().any(|v| v.level == Severity::Error)
    }

    pub fn has_warnings(&self) -> bool {
        !self.unresolved.is_empty()
            || self.collisions.iter().any(|c| c.severity == Severity::Warning)
            || self.violations.iter().any(|v| v.level == Severity::Warning)
    }

    pub fn status(&self) -> RunStatus {
        if self.has_errors() {
            RunStatus::Failed
        } else if self.has_warnings() {
            RunStatus::Warnings
        } else {
            RunStatus::Ok
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MappingEngine {
    options: EngineOptions,
}

impl MappingEngine {
    pub fn new(options: EngineOptions) -> Self {
        MappingEngine { options }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn build(
        &self,
        records: &[MappingRecord],
    ) -> (Vec<VersificationMapping>, ValidationReport) {
        let mut ctx = ResolutionContext::new();
        let mut unresolved = Vec::new();

        for &kind in self.options.priorities.order() {
            let rank = self.options.priorities.rank(kind);
            let group: Vec<&MappingRecord> =
                records.iter().filter(|record| record.action == kind).collect();
            if group.is_empty() {
                continue;
            }
            debug!("applying {} group: {} records", kind, group.len());

            for record in group {
                match resolve::resolve(record, &ctx, self.options.target_tradition) {
                    Ok(mapping) => {
                        let outcome = ctx.claim(mapping, rank);
                        debug!("line {}: {:?}", record.line, outcome);
                    }
                    Err(failure) => {
                        debug!("line {}: unresolved: {}", record.line, failure.reason);
                        unresolved.push(failure);
                    }
                }
            }
            ctx.finish_group();
        }

        let (mappings, collisions) = ctx.into_parts();
        let coverage = coverage::measure(records, &mappings, self.options.catalog.as_ref());
        let violations = coverage::violations(&coverage, &self.options.floors);

        (
            mappings,
            ValidationReport {
                collisions,
                unresolved,
                coverage,
                violations,
            },
        )
    }
}

/// Build mappings with the default options.
pub fn build_mappings(records: &[MappingRecord]) -> (Vec<VersificationMapping>, ValidationReport) {
    MappingEngine::default().build(records)
}
