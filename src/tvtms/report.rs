//! Run report
//!
//! Everything an operator needs to accept or reject a run: row accounting from the loader,
//! collisions and unresolved records from the engine, and coverage per book.

use crate::tvtms::books::BookCode;
use crate::tvtms::engine::{
    BookCoverage, CoverageViolation, ResolutionCollision, ResolutionFailure, ValidationReport,
};
use crate::tvtms::loader::recovery::Recovery;
use crate::tvtms::loader::{LoadOutput, Strictness};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Overall outcome, ordered from best to worst.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    #[default]
    Ok,
    Warnings,
    Failed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Ok => f.write_str("ok"),
            RunStatus::Warnings => f.write_str("warnings"),
            RunStatus::Failed => f.write_str("failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub strictness: Strictness,
    pub total_rows: usize,
    pub parsed: usize,
    pub skipped: usize,
    pub recovered: usize,
    pub filtered: usize,
    pub records: usize,
    pub mappings: usize,
    pub skip_budget_exceeded: bool,
    pub recoveries: Vec<Recovery>,
    pub collisions: Vec<ResolutionCollision>,
    pub unresolved: Vec<ResolutionFailure>,
    pub coverage_by_book: BTreeMap<BookCode, BookCoverage>,
    pub coverage_violations: Vec<CoverageViolation>,
    pub overall_status: RunStatus,
}

impl RunReport {
    /// Combine loader and engine results. `skip_budget` is the fraction of skipped rows above
    /// which the run only succeeds with warnings.
    pub fn assemble(
        strictness: Strictness,
        load: &LoadOutput,
        mappings: usize,
        validation: ValidationReport,
        skip_budget: f64,
    ) -> RunReport {
        let skip_budget_exceeded = load.report.skip_ratio() > skip_budget;

        let mut overall_status = validation.status();
        if skip_budget_exceeded || load.report.recovered > 0 {
            overall_status = overall_status.max(RunStatus::Warnings);
        }

        RunReport {
            strictness,
            total_rows: load.report.total_rows,
            parsed: load.report.parsed,
            skipped: load.report.skipped,
            recovered: load.report.recovered,
            filtered: load.report.filtered,
            records: load.report.records,
            mappings,
            skip_budget_exceeded,
            recoveries: load.recoveries.clone(),
            collisions: validation.collisions,
            unresolved: validation.unresolved,
            coverage_by_book: validation
                .coverage
                .into_iter()
                .map(|coverage| (coverage.book, coverage))
                .collect(),
            coverage_violations: validation.violations,
            overall_status,
        }
    }

    pub fn coverage(&self, book: BookCode) -> Option<f64> {
        self.coverage_by_book.get(&book).map(|c| c.ratio)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "status: {}", self.overall_status)?;
        writeln!(
            f,
            "rows: {} total, {} parsed, {} skipped, {} recovered, {} filtered ({})",
            self.total_rows,
            self.parsed,
            self.skipped,
            self.recovered,
            self.filtered,
            self.strictness
        )?;
        writeln!(f, "records: {}, mappings: {}", self.records, self.mappings)?;
        if self.skip_budget_exceeded {
            writeln!(f, "skip budget exceeded")?;
        }
        for recovery in &self.recoveries {
            writeln!(
                f,
                "recovered line {} {}: '{}' -> '{}'",
                recovery.line, recovery.field, recovery.original, recovery.recovered
            )?;
        }
        for collision in &self.collisions {
            writeln!(f, "collision: {}", collision)?;
        }
        for failure in &self.unresolved {
            writeln!(f, "unresolved: {}", failure)?;
        }
        for coverage in self.coverage_by_book.values() {
            writeln!(
                f,
                "coverage {}: {}/{} ({:.1}%)",
                coverage.book,
                coverage.mapped,
                coverage.expected,
                coverage.ratio * 100.0
            )?;
        }
        for violation in &self.coverage_violations {
            writeln!(f, "violation: {}", violation)?;
        }
        Ok(())
    }
}
