//! Per-book coverage
//!
//! A verse is covered when a live mapping names it as source or target; subverses count for
//! the verse they divide. Expected verses come from the catalog when there is one, otherwise
//! from the coordinates the records are about.

use super::{CoverageFloors, Severity};
use crate::tvtms::books::BookCode;
use crate::tvtms::catalog::VerseCatalog;
use crate::tvtms::mapping::VersificationMapping;
use crate::tvtms::record::MappingRecord;
use crate::tvtms::reference::VerseRef;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookCoverage {
    pub book: BookCode,
    pub expected: usize,
    pub mapped: usize,
    /// `mapped / expected`; 1.0 for a book with nothing expected.
    pub ratio: f64,
}

impl BookCoverage {
    pub fn new(book: BookCode, expected: usize, mapped: usize) -> Self {
        let ratio = if expected == 0 {
            1.0
        } else {
            mapped as f64 / expected as f64
        };
        BookCoverage {
            book,
            expected,
            mapped,
            ratio,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageViolation {
    pub book: BookCode,
    pub ratio: f64,
    pub floor: f64,
    pub level: Severity,
}

impl fmt::Display for CoverageViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} coverage {:.1}% is below the {} floor of {:.1}%",
            self.book,
            self.ratio * 100.0,
            self.level,
            self.floor * 100.0
        )
    }
}

pub fn measure(
    records: &[MappingRecord],
    mappings: &[VersificationMapping],
    catalog: Option<&VerseCatalog>,
) -> Vec<BookCoverage> {
    let covered: BTreeSet<VerseRef> = mappings
        .iter()
        .flat_map(|m| std::iter::once(m.source).chain(m.target))
        .map(|verse| verse.whole_verse())
        .collect();

    match catalog {
        Some(catalog) => catalog
            .books()
            .map(|book| {
                let mapped = covered
                    .iter()
                    .filter(|verse| verse.book == book && catalog.is_expected(verse))
                    .count();
                BookCoverage::new(book, catalog.expected_count(book), mapped)
            })
            .collect(),
        None => {
            let mut expected: BTreeMap<BookCode, BTreeSet<VerseRef>> = BTreeMap::new();
            for subject in records.iter().filter_map(MappingRecord::subject) {
                expected
                    .entry(subject.book)
                    .or_default()
                    .insert(subject.whole_verse());
            }
            expected
                .into_iter()
                .map(|(book, verses)| {
                    let mapped = verses.iter().filter(|verse| covered.contains(verse)).count();
                    BookCoverage::new(book, verses.len(), mapped)
                })
                .collect()
        }
    }
}

pub fn violations(coverage: &[BookCoverage], floors: &CoverageFloors) -> Vec<CoverageViolation> {
    coverage
        .iter()
        .filter(|book| book.expected > 0)
        .filter_map(|book| {
            let ratio = book.ratio;
            let (floor, level) = if ratio < floors.error_floor {
                (floors.error_floor, Severity::Error)
            } else if ratio < floors.warning_floor {
                (floors.warning_floor, Severity::Warning)
            } else {
                return None;
            };
            Some(CoverageViolation {
                book: book.book,
                ratio,
                floor,
                level,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(expected: usize, mapped: usize) -> BookCoverage {
        BookCoverage::new(BookCode::Ruth, expected, mapped)
    }

    #[test]
    fn test_floors() {
        let floors = CoverageFloors::default();
        assert_eq!(violations(&[book(10, 7)], &floors)[0].level, Severity::Error);
        assert_eq!(
            violations(&[book(20, 17)], &floors)[0].level,
            Severity::Warning
        );
        assert!(violations(&[book(10, 9)], &floors).is_empty());
        assert!(violations(&[book(0, 0)], &floors).is_empty());
    }

    #[test]
    fn test_exactly_at_floor_is_not_a_violation() {
        let floors = CoverageFloors::default();
        let at_error_floor = violations(&[book(10, 8)], &floors);
        assert_eq!(at_error_floor[0].level, Severity::Warning);
    }
}
