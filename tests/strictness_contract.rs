//! Strictness policies over the same table
//!
//! 99 well-formed rows plus one row whose source cell has a bad chapter token. Strict aborts,
//! tolerant skips the row, permissive repairs it.

use versemap::tvtms::config::EngineConfig;
use versemap::tvtms::loader::{LoadError, RefField, Strictness};
use versemap::tvtms::pipeline::{run, RunError};
use versemap::tvtms::processor::samples::TvtmsSources;
use versemap::tvtms::testing::{assert_mappings, assert_report};
use versemap::tvtms::RunStatus;

const BAD_LINE: usize = 101;

fn table() -> String {
    let mut text = String::from("#DataStart\n");
    for verse in 1..=99 {
        text.push_str(&format!("English\tGen.2.{0}\tGen.2.{0}\tKeep verse\n", verse));
    }
    text.push_str("English\tGen.x.1\tGen.1.1\tKeep verse\n");
    text
}

fn config(strictness: Strictness) -> EngineConfig {
    EngineConfig {
        strictness,
        ..EngineConfig::default()
    }
}

#[test]
fn test_strict_aborts_on_first_bad_row() {
    match run(&table(), &config(Strictness::Strict)) {
        Err(RunError::Aborted(LoadError::Reference { line, field, .. })) => {
            assert_eq!(line, BAD_LINE);
            assert_eq!(field, RefField::SourceRef);
        }
        Err(other) => panic!("unexpected error {}", other),
        Ok(output) => panic!("strict run should abort, got:\n{}", output.report),
    }
}

#[test]
fn test_tolerant_skips_and_continues() {
    let output = run(&table(), &config(Strictness::Tolerant)).unwrap();
    assert_mappings(&output.mappings)
        .count(99)
        .no_source("Gen.1.1");
    assert_report(&output.report)
        .total_rows(100)
        .skipped(1)
        .recovered(0)
        .collision_count(0)
        // one skip in a hundred rows is exactly the default budget
        .status(RunStatus::Ok);
}

#[test]
fn test_permissive_recovers_the_row() {
    let output = run(&table(), &config(Strictness::Permissive)).unwrap();
    assert_mappings(&output.mappings)
        .count(100)
        .contains("Gen.1.1 -> Gen.1.1 move-text");
    assert_report(&output.report)
        .skipped(0)
        .recovered(1)
        .status(RunStatus::Warnings);

    let recovery = &output.report.recoveries[0];
    assert_eq!(recovery.line, BAD_LINE);
    assert_eq!(recovery.original, "Gen.x.1");
    assert_eq!(recovery.recovered, "Gen.1.1");
}

#[test]
fn test_parallel_loading_matches_sequential() {
    let sequential = run(&table(), &config(Strictness::Permissive)).unwrap();
    let parallel = run(
        &table(),
        &EngineConfig {
            parallel: true,
            ..config(Strictness::Permissive)
        },
    )
    .unwrap();
    assert_eq!(parallel.mappings, sequential.mappings);
    assert_eq!(parallel.report, sequential.report);
}

#[test]
fn test_malformed_sample_under_each_policy() {
    let strict = TvtmsSources::get_run_with("040-malformed-rows.tsv", &config(Strictness::Strict));
    assert!(strict.is_err());

    let tolerant =
        TvtmsSources::get_run_with("040-malformed-rows.tsv", &config(Strictness::Tolerant))
            .unwrap();
    assert_report(&tolerant.report)
        .total_rows(4)
        .skipped(2)
        .mappings(2)
        .status(RunStatus::Warnings);
    assert!(tolerant.report.skip_budget_exceeded);

    let permissive =
        TvtmsSources::get_run_with("040-malformed-rows.tsv", &config(Strictness::Permissive))
            .unwrap();
    // an unknown action is never repaired
    assert_report(&permissive.report)
        .skipped(1)
        .recovered(1)
        .mappings(3)
        .status(RunStatus::Warnings);
}
