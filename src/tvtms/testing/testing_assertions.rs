//! Fluent assertion API for mappings and run reports

use crate::tvtms::action::ActionKind;
use crate::tvtms::books::BookCode;
use crate::tvtms::engine::{CollisionKind, Severity};
use crate::tvtms::mapping::VersificationMapping;
use crate::tvtms::report::{RunReport, RunStatus};
use crate::tvtms::tradition::TraditionTag;

// ============================================================================
// Entry Points
// ============================================================================

/// Create an assertion builder for an ordered mapping list
pub fn assert_mappings(mappings: &[VersificationMapping]) -> MappingsAssertion<'_> {
    MappingsAssertion { mappings }
}

/// Create an assertion builder for a run report
pub fn assert_report(report: &RunReport) -> ReportAssertion<'_> {
    ReportAssertion { report }
}

// ============================================================================
// Mapping List Assertions
// ============================================================================

pub struct MappingsAssertion<'a> {
    mappings: &'a [VersificationMapping],
}

impl<'a> MappingsAssertion<'a> {
    /// Assert the number of mappings
    pub fn count(self, expected: usize) -> Self {
        let actual = self.mappings.len();
        assert_eq!(
            actual,
            expected,
            "Expected {} mappings, found {}: [{}]",
            expected,
            actual,
            summarize(self.mappings)
        );
        self
    }

    /// Assert on a specific mapping by index
    pub fn mapping<F>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(MappingAssertion<'a>),
    {
        assert!(
            index < self.mappings.len(),
            "Mapping index {} out of bounds (found {} mappings: [{}])",
            index,
            self.mappings.len(),
            summarize(self.mappings)
        );
        assertion(MappingAssertion {
            mapping: &self.mappings[index],
            context: format!("mappings[{}]", index),
        });
        self
    }

    /// Assert some mapping reads exactly `expected` in its display form
    pub fn contains(self, expected: &str) -> Self {
        assert!(
            self.mappings.iter().any(|m| m.to_string() == expected),
            "Expected a mapping '{}', found: [{}]",
            expected,
            summarize(self.mappings)
        );
        self
    }

    /// Assert no mapping has this source coordinate
    pub fn no_source(self, source: &str) -> Self {
        let found: Vec<String> = self
            .mappings
            .iter()
            .filter(|m| m.source.to_string() == source)
            .map(|m| m.to_string())
            .collect();
        assert!(
            found.is_empty(),
            "Expected no mapping from {}, found: [{}]",
            source,
            found.join(", ")
        );
        self
    }
}

// ============================================================================
// Single Mapping Assertions
// ============================================================================

pub struct MappingAssertion<'a> {
    mapping: &'a VersificationMapping,
    context: String,
}

impl<'a> MappingAssertion<'a> {
    pub fn source(self, expected: &str) -> Self {
        let actual = self.mapping.source.to_string();
        assert_eq!(
            actual, expected,
            "{}: Expected source {}, found {} ({})",
            self.context, expected, actual, self.mapping
        );
        self
    }

    pub fn target(self, expected: &str) -> Self {
        let actual = self.mapping.target.map(|t| t.to_string());
        assert_eq!(
            actual.as_deref(),
            Some(expected),
            "{}: Expected target {}, found {:?} ({})",
            self.context,
            expected,
            actual,
            self.mapping
        );
        self
    }

    pub fn no_target(self) -> Self {
        assert!(
            self.mapping.target.is_none(),
            "{}: Expected no target ({})",
            self.context,
            self.mapping
        );
        self
    }

    /// Operation name, e.g. `merge-into`
    pub fn operation(self, expected: &str) -> Self {
        let actual = self.mapping.operation.name();
        assert_eq!(
            actual, expected,
            "{}: Expected operation {}, found {} ({})",
            self.context, expected, actual, self.mapping
        );
        self
    }

    pub fn action(self, expected: ActionKind) -> Self {
        assert_eq!(
            self.mapping.action, expected,
            "{}: Expected action {}, found {}",
            self.context, expected, self.mapping.action
        );
        self
    }

    pub fn source_tradition(self, expected: TraditionTag) -> Self {
        assert_eq!(
            self.mapping.source_tradition, expected,
            "{}: Expected source tradition {}, found {}",
            self.context, expected, self.mapping.source_tradition
        );
        self
    }

    pub fn line(self, expected: usize) -> Self {
        assert_eq!(
            self.mapping.line, expected,
            "{}: Expected table line {}, found {}",
            self.context, expected, self.mapping.line
        );
        self
    }
}

// ============================================================================
// Report Assertions
// ============================================================================

pub struct ReportAssertion<'a> {
    report: &'a RunReport,
}

impl<'a> ReportAssertion<'a> {
    pub fn status(self, expected: RunStatus) -> Self {
        assert_eq!(
            self.report.overall_status, expected,
            "Expected status {}, found {}. Report:\n{}",
            expected, self.report.overall_status, self.report
        );
        self
    }

    pub fn total_rows(self, expected: usize) -> Self {
        assert_eq!(self.report.total_rows, expected, "Report:\n{}", self.report);
        self
    }

    pub fn skipped(self, expected: usize) -> Self {
        assert_eq!(
            self.report.skipped, expected,
            "Expected {} skipped rows, found {}. Report:\n{}",
            expected, self.report.skipped, self.report
        );
        self
    }

    pub fn recovered(self, expected: usize) -> Self {
        assert_eq!(
            self.report.recovered, expected,
            "Expected {} recovered rows, found {}. Report:\n{}",
            expected, self.report.recovered, self.report
        );
        self
    }

    pub fn filtered(self, expected: usize) -> Self {
        assert_eq!(self.report.filtered, expected, "Report:\n{}", self.report);
        self
    }

    pub fn mappings(self, expected: usize) -> Self {
        assert_eq!(self.report.mappings, expected, "Report:\n{}", self.report);
        self
    }

    pub fn collision_count(self, expected: usize) -> Self {
        assert_eq!(
            self.report.collisions.len(),
            expected,
            "Expected {} collisions. Report:\n{}",
            expected,
            self.report
        );
        self
    }

    /// Assert some collision of `kind` happened at `coordinate`
    pub fn collision(self, kind: CollisionKind, coordinate: &str) -> Self {
        assert!(
            self.report
                .collisions
                .iter()
                .any(|c| c.kind == kind && c.coordinate.to_string() == coordinate),
            "Expected a {} collision at {}. Report:\n{}",
            kind,
            coordinate,
            self.report
        );
        self
    }

    pub fn unresolved_count(self, expected: usize) -> Self {
        assert_eq!(
            self.report.unresolved.len(),
            expected,
            "Expected {} unresolved records. Report:\n{}",
            expected,
            self.report
        );
        self
    }

    /// Coverage ratio of `book`, compared to within 0.001
    pub fn coverage(self, book: BookCode, expected: f64) -> Self {
        match self.report.coverage(book) {
            Some(actual) => assert!(
                (actual - expected).abs() < 1e-3,
                "Expected {} coverage {:.3}, found {:.3}",
                book,
                expected,
                actual
            ),
            None => panic!("No coverage for {}. Report:\n{}", book, self.report),
        }
        self
    }

    pub fn violation(self, book: BookCode, level: Severity) -> Self {
        assert!(
            self.report
                .coverage_violations
                .iter()
                .any(|v| v.book == book && v.level == level),
            "Expected a {} coverage violation for {}. Report:\n{}",
            level,
            book,
            self.report
        );
        self
    }

    pub fn no_violations(self) -> Self {
        assert!(
            self.report.coverage_violations.is_empty(),
            "Expected no coverage violations. Report:\n{}",
            self.report
        );
        self
    }
}

fn summarize(mappings: &[VersificationMapping]) -> String {
    mappings
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tvtms::engine::build_mappings;
    use crate::tvtms::loader::{RecordLoader, Strictness};

    fn mappings() -> Vec<VersificationMapping> {
        let table = "#DataStart\n\
                     English\tRom.16.25\tAbsent\tMissing verse\n\
                     Hebrew\tPsa.3.0\tPsa.3.1\tRenumber title\n";
        let load = RecordLoader::new(Strictness::Strict).load(table).unwrap();
        build_mappings(&load.records).0
    }

    #[test]
    fn test_fluent_mapping_checks() {
        let mappings = mappings();
        assert_mappings(&mappings)
            .count(2)
            .contains("Rom.16.25 mark-absent")
            .no_source("Gen.1.1");
    }

    #[test]
    #[should_panic(expected = "Expected 5 mappings")]
    fn test_count_mismatch_panics() {
        assert_mappings(&mappings()).count(5);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_index_out_of_bounds_panics() {
        assert_mappings(&mappings()).mapping(9, |_| {});
    }
}
