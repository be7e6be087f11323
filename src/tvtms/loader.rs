//! Record loader
//!
//!     Turns table rows into [MappingRecord]s, one per verse. Columns, in order:
//!
//!         SourceType  SourceRef  StandardRef  Action  NoteMarker  NoteA  NoteB  AncientVersions  Tests
//!
//!     The first four are required. What happens to a failing row depends on the run's
//!     [Strictness]. With `parallel` set rows are parsed on the rayon pool, but the policy is
//!     still applied in row order.

pub mod recovery;
pub mod table;

use crate::tvtms::action::{ActionKind, UnknownAction};
use crate::tvtms::condition::{parse_test_condition, ConditionError};
use crate::tvtms::record::{MappingRecord, RawRow};
use crate::tvtms::reference::{parse_reference, ParseError, ReferenceSpec};
use crate::tvtms::tradition::{parse_tradition_list, TraditionTag, UnknownTradition};
use rayon::prelude::*;
use recovery::Recovery;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{error, info, warn};

pub use table::read_table;

/// Longest range a single cell may expand to. The longest chapter has 176 verses.
pub const MAX_RANGE_VERSES: usize = 200;

/// How malformed rows are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// The first failing row aborts the load.
    Strict,
    /// Failing rows are logged and skipped.
    #[default]
    Tolerant,
    /// Broken reference cells are repaired ([recovery]); other failures skip the row.
    Permissive,
}

impl Strictness {
    pub fn name(self) -> &'static str {
        match self {
            Strictness::Strict => "strict",
            Strictness::Tolerant => "tolerant",
            Strictness::Permissive => "permissive",
        }
    }
}

impl fmt::Display for Strictness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strictness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Strictness::Strict),
            "tolerant" => Ok(Strictness::Tolerant),
            "permissive" => Ok(Strictness::Permissive),
            other => Err(format!(
                "unknown strictness '{}' (expected strict, tolerant or permissive)",
                other
            )),
        }
    }
}

/// The two reference columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RefField {
    SourceRef,
    StandardRef,
}

impl RefField {
    pub fn column(self) -> usize {
        match self {
            RefField::SourceRef => 1,
            RefField::StandardRef => 2,
        }
    }
}

impl fmt::Display for RefField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefField::SourceRef => f.write_str("SourceRef"),
            RefField::StandardRef => f.write_str("StandardRef"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("no #DataStart marker found")]
    MissingDataStart,
    #[error("line {line}: expected 4 to 9 columns, found {found}")]
    ColumnCount { line: usize, found: usize },
    #[error("line {line}: {source}")]
    UnknownTradition {
        line: usize,
        source: UnknownTradition,
    },
    #[error("line {line}: {source}")]
    UnknownAction { line: usize, source: UnknownAction },
    #[error("line {line}: {source}")]
    BadTestCondition { line: usize, source: ConditionError },
    #[error("line {line}, {field}: {source}")]
    Reference {
        line: usize,
        field: RefField,
        source: ParseError,
    },
    #[error(
        "line {line}: source expands to {source_len} verses but standard expands to {standard_len}"
    )]
    RangeLengthMismatch {
        line: usize,
        source_len: usize,
        standard_len: usize,
    },
    #[error("line {line}, {field}: range covers {len} verses, more than the {max} allowed")]
    RangeTooLong {
        line: usize,
        field: RefField,
        len: usize,
        max: usize,
    },
}

impl LoadError {
    /// The table line the error refers to, if it refers to one.
    pub fn line(&self) -> Option<usize> {
        match self {
            LoadError::MissingDataStart => None,
            LoadError::ColumnCount { line, .. }
            | LoadError::UnknownTradition { line, .. }
            | LoadError::UnknownAction { line, .. }
            | LoadError::BadTestCondition { line, .. }
            | LoadError::Reference { line, .. }
            | LoadError::RangeLengthMismatch { line, .. }
            | LoadError::RangeTooLong { line, .. } => Some(*line),
        }
    }
}

/// Row accounting for one load. `total_rows == parsed + skipped`; filtered rows count as
/// parsed and `records` is the number of records after fan-out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub total_rows: usize,
    pub parsed: usize,
    pub skipped: usize,
    pub recovered: usize,
    pub filtered: usize,
    pub records: usize,
}

impl LoadReport {
    pub fn skip_ratio(&self) -> f64 {
        if self.total_rows == 0 {
            0.0
        } else {
            self.skipped as f64 / self.total_rows as f64
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadOutput {
    pub records: Vec<MappingRecord>,
    pub report: LoadReport,
    /// Why each skipped row was skipped, in row order.
    pub skips: Vec<LoadError>,
    pub recoveries: Vec<Recovery>,
}

/// Result of parsing one row, before the policy is applied.
#[derive(Debug, Default)]
struct ParsedRow {
    records: Vec<MappingRecord>,
    recoveries: Vec<Recovery>,
    filtered: bool,
}

#[derive(Debug, Clone)]
pub struct RecordLoader {
    strictness: Strictness,
    tradition: TraditionTag,
    parallel: bool,
}

impl Default for RecordLoader {
    fn default() -> Self {
        RecordLoader::new(Strictness::default())
    }
}

impl RecordLoader {
    pub fn new(strictness: Strictness) -> Self {
        RecordLoader {
            strictness,
            tradition: TraditionTag::English,
            parallel: false,
        }
    }

    /// The tradition test conditions are evaluated against.
    pub fn with_tradition(mut self, tradition: TraditionTag) -> Self {
        self.tradition = tradition;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Read the table in `text` and load its rows.
    pub fn load(&self, text: &str) -> Result<LoadOutput, LoadError> {
        let rows = read_table(text)?;
        self.load_rows(&rows)
    }

    pub fn load_rows(&self, rows: &[RawRow]) -> Result<LoadOutput, LoadError> {
        let outcomes: Vec<Result<ParsedRow, LoadError>> = if self.parallel {
            rows.par_iter().map(|row| self.parse_row(row)).collect()
        } else {
            rows.iter().map(|row| self.parse_row(row)).collect()
        };

        let mut output = LoadOutput::default();
        output.report.total_rows = rows.len();

        for (row, outcome) in rows.iter().zip(outcomes) {
            match outcome {
                Ok(parsed) => {
                    output.report.parsed += 1;
                    if parsed.filtered {
                        output.report.filtered += 1;
                    }
                    if !parsed.recoveries.is_empty() {
                        output.report.recovered += 1;
                    }
                    for recovery in &parsed.recoveries {
                        error!(
                            "line {}: recovered {} '{}' as '{}' ({:?})",
                            recovery.line,
                            recovery.field,
                            recovery.original,
                            recovery.recovered,
                            recovery.reasons
                        );
                    }
                    output.records.extend(parsed.records);
                    output.recoveries.extend(parsed.recoveries);
                }
                Err(err) if self.strictness == Strictness::Strict => {
                    error!("aborting load under strict policy: {}", err);
                    return Err(err);
                }
                Err(err) => {
                    warn!("skipping row {}: {} [{}]", row.line, err, row.cells.join(" | "));
                    output.report.skipped += 1;
                    output.skips.push(err);
                }
            }
        }

        output.report.records = output.records.len();
        info!(
            "loaded {} records from {} rows ({} skipped, {} recovered, {} filtered)",
            output.report.records,
            output.report.total_rows,
            output.report.skipped,
            output.report.recovered,
            output.report.filtered
        );
        Ok(output)
    }

    fn parse_row(&self, row: &RawRow) -> Result<ParsedRow, LoadError> {
        let line = row.line;
        table::check_shape(row)?;

        let source_type = source_type(row)?;
        let action = ActionKind::from_keyword(row.cell(3))
            .map_err(|source| LoadError::UnknownAction { line, source })?;
        let test_condition = parse_test_condition(row.cell(8))
            .map_err(|source| LoadError::BadTestCondition { line, source })?;

        if let Some(expr) = &test_condition {
            if !expr.evaluate(self.tradition) {
                return Ok(ParsedRow {
                    filtered: true,
                    ..ParsedRow::default()
                });
            }
        }

        let mut recoveries = Vec::new();
        let source = self.reference(row, RefField::SourceRef, &mut recoveries)?;
        let standard = self.reference(row, RefField::StandardRef, &mut recoveries)?;
        check_range_len(line, RefField::SourceRef, &source)?;
        check_range_len(line, RefField::StandardRef, &standard)?;
        let pairs = fan_out(line, &source.expand(), &standard.expand())?;

        let applicable_traditions = parse_tradition_list(row.cell(7));
        let records = pairs
            .into_iter()
            .map(|(source_ref, standard_ref)| MappingRecord {
                line,
                source_type,
                source_ref,
                standard_ref,
                action,
                note_marker: row.cell(4).to_string(),
                note_a: row.cell(5).to_string(),
                note_b: row.cell(6).to_string(),
                applicable_traditions: applicable_traditions.clone(),
                test_condition: test_condition.clone(),
            })
            .collect();

        Ok(ParsedRow {
            records,
            recoveries,
            filtered: false,
        })
    }

    fn reference(
        &self,
        row: &RawRow,
        field: RefField,
        recoveries: &mut Vec<Recovery>,
    ) -> Result<ReferenceSpec, LoadError> {
        let cell = row.cell(field.column());
        let parsed = match self.strictness {
            Strictness::Permissive => recovery::parse_with_recovery(cell),
            Strictness::Strict | Strictness::Tolerant => {
                parse_reference(cell).map(|spec| (spec, None))
            }
        };
        let (spec, repair) = parsed.map_err(|source| LoadError::Reference {
            line: row.line,
            field,
            source,
        })?;

        if let Some((recovered, reasons)) = repair {
            recoveries.push(Recovery {
                line: row.line,
                field,
                original: cell.trim().to_string(),
                recovered,
                reasons,
            });
        }
        Ok(spec)
    }
}

/// The tradition named in the SourceType cell. Markers after the name (`Hebrew*`, `Greek2`)
/// are ignored.
fn source_type(row: &RawRow) -> Result<TraditionTag, LoadError> {
    row.cell(0)
        .trim_end_matches(|c: char| !c.is_ascii_alphabetic())
        .parse()
        .map_err(|source| LoadError::UnknownTradition {
            line: row.line,
            source,
        })
}

fn check_range_len(line: usize, field: RefField, spec: &ReferenceSpec) -> Result<(), LoadError> {
    let len = spec.expanded_len();
    if len > MAX_RANGE_VERSES {
        return Err(LoadError::RangeTooLong {
            line,
            field,
            len,
            max: MAX_RANGE_VERSES,
        });
    }
    Ok(())
}

/// Pair the expansions of both reference columns.
///
/// Equal lengths pair element-wise; a single coordinate (or `Absent`) pairs with every element
/// of the other side.
fn fan_out(
    line: usize,
    sources: &[ReferenceSpec],
    standards: &[ReferenceSpec],
) -> Result<Vec<(ReferenceSpec, ReferenceSpec)>, LoadError> {
    match (sources, standards) {
        _ if sources.len() == standards.len() => Ok(sources
            .iter()
            .cloned()
            .zip(standards.iter().cloned())
            .collect()),
        ([source], _) => Ok(standards
            .iter()
            .map(|standard| (source.clone(), standard.clone()))
            .collect()),
        (_, [standard]) => Ok(sources
            .iter()
            .map(|source| (source.clone(), standard.clone()))
            .collect()),
        _ => Err(LoadError::RangeLengthMismatch {
            line,
            source_len: sources.len(),
            standard_len: standards.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tvtms::reference::ParseErrorKind;

    fn table(rows: &[&str]) -> String {
        let mut text = String::from("TVTMS test table\n#DataStart(Expanded)\n");
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_range_fans_out_element_wise() {
        let text = table(&["Hebrew\tGen.32.1-3\tGen.31.55-55\tRenumber verse"]);
        // a range has to cover more than one verse
        let err = RecordLoader::new(Strictness::Strict).load(&text).unwrap_err();
        assert!(matches!(err, LoadError::Reference { field: RefField::StandardRef, .. }));

        let text = table(&["Hebrew\tPsa.3.1-3\tPsa.3.2-4\tRenumber verse"]);
        let output = RecordLoader::new(Strictness::Strict).load(&text).unwrap();
        let pairs: Vec<(String, String)> = output
            .records
            .iter()
            .map(|r| (r.source_ref.to_string(), r.standard_ref.to_string()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("Psa.3.1".to_string(), "Psa.3.2".to_string()),
                ("Psa.3.2".to_string(), "Psa.3.3".to_string()),
                ("Psa.3.3".to_string(), "Psa.3.4".to_string()),
            ]
        );
        assert_eq!(output.report.records, 3);
        assert_eq!(output.report.parsed, 1);
    }

    #[test]
    fn test_single_side_pairs_with_every_element() {
        let text = table(&["Latin\tAbsent\tRom.16.25-27\tEmpty verse"]);
        let output = RecordLoader::default().load(&text).unwrap();
        assert_eq!(output.records.len(), 3);
        assert!(output.records.iter().all(|r| r.source_ref.is_absent()));
    }

    #[test]
    fn test_range_length_mismatch() {
        let text = table(&["Hebrew\tPsa.3.1-3\tPsa.3.1-2\tRenumber verse"]);
        let err = RecordLoader::new(Strictness::Strict).load(&text).unwrap_err();
        assert_eq!(
            err,
            LoadError::RangeLengthMismatch {
                line: 3,
                source_len: 3,
                standard_len: 2
            }
        );
    }

    #[test]
    fn test_oversized_range_is_refused_before_expansion() {
        let text = table(&[
            "English\tGen.1.1\tGen.1.1\tKeep verse",
            "English\tGen.1.1-3000000\tGen.1.1\tKeep verse",
        ]);
        let err = RecordLoader::new(Strictness::Strict).load(&text).unwrap_err();
        assert_eq!(
            err,
            LoadError::RangeTooLong {
                line: 4,
                field: RefField::SourceRef,
                len: 3_000_000,
                max: MAX_RANGE_VERSES,
            }
        );

        let output = RecordLoader::new(Strictness::Tolerant).load(&text).unwrap();
        assert_eq!(output.records.len(), 1);
        assert_eq!(output.report.skipped, 1);
        assert!(matches!(output.skips[0], LoadError::RangeTooLong { line: 4, .. }));
    }

    #[test]
    fn test_longest_psalm_fits_the_range_cap() {
        let text = table(&["Hebrew\tPsa.119.1-176\tPsa.119.1-176\tKeep verse"]);
        let output = RecordLoader::new(Strictness::Strict).load(&text).unwrap();
        assert_eq!(output.records.len(), 176);
    }

    #[test]
    fn test_short_row_under_each_policy() {
        let text = table(&[
            "English\tGen.1.1\tGen.1.1\tKeep verse",
            "English\tGen.1.2",
        ]);
        let err = RecordLoader::new(Strictness::Strict).load(&text).unwrap_err();
        assert_eq!(err, LoadError::ColumnCount { line: 4, found: 2 });

        for strictness in [Strictness::Tolerant, Strictness::Permissive] {
            let output = RecordLoader::new(strictness).load(&text).unwrap();
            assert_eq!(output.records.len(), 1, "{}", strictness);
            assert_eq!(output.report.skipped, 1, "{}", strictness);
            assert_eq!(output.report.recovered, 0, "{}", strictness);
            assert_eq!(output.skips, vec![LoadError::ColumnCount { line: 4, found: 2 }]);
        }
    }

    #[test]
    fn test_unknown_action_fails_loudly() {
        let text = table(&["Hebrew\tGen.1.1\tGen.1.1\tSplit verse"]);
        let err = RecordLoader::new(Strictness::Strict).load(&text).unwrap_err();
        assert!(matches!(err, LoadError::UnknownAction { line: 3, .. }));

        let output = RecordLoader::new(Strictness::Permissive).load(&text).unwrap();
        assert_eq!(output.report.skipped, 1);
    }

    #[test]
    fn test_tolerant_skips_and_reports() {
        let text = table(&[
            "English\tGen.1.1\tGen.1.1\tKeep verse",
            "English\tGen.x.2\tGen.1.2\tKeep verse",
            "English\tGen.1.3\tGen.1.3\tKeep verse",
        ]);
        let output = RecordLoader::new(Strictness::Tolerant).load(&text).unwrap();
        assert_eq!(output.report.total_rows, 3);
        assert_eq!(output.report.parsed, 2);
        assert_eq!(output.report.skipped, 1);
        assert_eq!(output.skips[0].line(), Some(4));
        match &output.skips[0] {
            LoadError::Reference { source, .. } => {
                assert_eq!(source.kind, ParseErrorKind::BadChapterToken)
            }
            other => panic!("unexpected skip reason {:?}", other),
        }
    }

    #[test]
    fn test_permissive_recovers() {
        let text = table(&["English\tGen.x.2\tGen.1.2\tKeep verse"]);
        let output = RecordLoader::new(Strictness::Permissive).load(&text).unwrap();
        assert_eq!(output.report.recovered, 1);
        assert_eq!(output.records[0].source_ref.to_string(), "Gen.1.2");
        assert_eq!(output.recoveries[0].original, "Gen.x.2");
        assert_eq!(output.recoveries[0].field, RefField::SourceRef);
    }

    #[test]
    fn test_test_condition_filters_rows() {
        let text = table(&[
            "Hebrew\tPsa.3.0\tPsa.3.0\tKeep verse\t\t\t\t\tHebrew",
            "Hebrew\tPsa.3.1\tPsa.3.1\tKeep verse\t\t\t\t\t!Hebrew",
        ]);
        let output = RecordLoader::default()
            .with_tradition(TraditionTag::Hebrew)
            .load(&text)
            .unwrap();
        assert_eq!(output.records.len(), 1);
        assert_eq!(output.report.filtered, 1);
        assert_eq!(output.report.skipped, 0);
        assert_eq!(output.report.parsed, 2);
    }

    #[test]
    fn test_notes_and_traditions_are_carried() {
        let text = table(&["Greek*\tMat.17.15[17.14]\tMat.17.15\tKeep\tN\tNote A\tNote B\tGreek, Latin"]);
        let output = RecordLoader::default().load(&text).unwrap();
        let record = &output.records[0];
        assert_eq!(record.source_type, TraditionTag::Greek);
        assert_eq!(record.note_marker, "N");
        assert_eq!(record.note_b, "Note B");
        assert!(record.applicable_traditions.contains(&TraditionTag::Latin));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let rows: Vec<String> = (1..=40)
            .map(|v| format!("English\tGen.2.{}\tGen.2.{}\tKeep verse", v, v))
            .collect();
        let text = table(&rows.iter().map(String::as_str).collect::<Vec<_>>());
        let sequential = RecordLoader::default().load(&text).unwrap();
        let parallel = RecordLoader::default().with_parallel(true).load(&text).unwrap();
        assert_eq!(sequential.records, parallel.records);
        assert_eq!(sequential.report, parallel.report);
    }
}
