//! End-to-end run: table text in, mappings and a report out
//!
//! A run either completes or fails as a whole. Partial mapping sets are never returned,
//! since applying half a versification to text is worse than applying none.

use crate::tvtms::catalog::VerseCatalog;
use crate::tvtms::config::{ConfigError, EngineConfig};
use crate::tvtms::engine::MappingEngine;
use crate::tvtms::loader::{read_table, LoadError};
use crate::tvtms::mapping::{MappingSink, VersificationMapping};
use crate::tvtms::record::MappingRecord;
use crate::tvtms::report::RunReport;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("cannot read table: {0}")]
    Table(#[source] LoadError),
    #[error("run aborted: {0}")]
    Aborted(#[source] LoadError),
    #[error("run exceeded its time budget of {budget_ms} ms while {stage}")]
    BudgetExceeded { budget_ms: u64, stage: &'static str },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub catalog: Option<VerseCatalog>,
}

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub records: Vec<MappingRecord>,
    pub mappings: Vec<VersificationMapping>,
    pub report: RunReport,
}

impl RunOutput {
    /// Hand every mapping to the store, in output order.
    pub fn persist<S: MappingSink>(&self, sink: &mut S) -> Result<usize, S::Error> {
        sink.write_all(&self.mappings)
    }
}

struct Deadline {
    started: Instant,
    budget: Option<Duration>,
}

impl Deadline {
    fn new(budget_ms: Option<u64>) -> Self {
        Deadline {
            started: Instant::now(),
            budget: budget_ms.map(Duration::from_millis),
        }
    }

    fn check(&self, stage: &'static str) -> Result<(), RunError> {
        match self.budget {
            Some(budget) if self.started.elapsed() > budget => {
                error!("time budget exceeded while {}", stage);
                Err(RunError::BudgetExceeded {
                    budget_ms: budget.as_millis() as u64,
                    stage,
                })
            }
            _ => Ok(()),
        }
    }
}

pub fn run(text: &str, config: &EngineConfig) -> Result<RunOutput, RunError> {
    run_with(text, config, RunOptions::default())
}

pub fn run_with(
    text: &str,
    config: &EngineConfig,
    options: RunOptions,
) -> Result<RunOutput, RunError> {
    config.validate()?;
    let deadline = Deadline::new(config.time_budget_ms);

    let rows = read_table(text).map_err(RunError::Table)?;
    deadline.check("reading the table")?;

    let load = config
        .record_loader()
        .load_rows(&rows)
        .map_err(RunError::Aborted)?;
    deadline.check("loading records")?;

    let engine = MappingEngine::new(config.engine_options(options.catalog)?);
    let (mappings, validation) = engine.build(&load.records);
    deadline.check("building mappings")?;

    let report = RunReport::assemble(
        config.strictness,
        &load,
        mappings.len(),
        validation,
        config.skip_budget,
    );
    info!(
        "run finished with status {}: {} mappings from {} rows",
        report.overall_status, report.mappings, report.total_rows
    );

    Ok(RunOutput {
        records: load.records,
        mappings,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tvtms::loader::Strictness;
    use crate::tvtms::mapping::MemorySink;
    use crate::tvtms::report::RunStatus;

    const TABLE: &str = "#DataStart\n\
                         English\tGen.1.1\tGen.1.1\tRenumber verse\n\
                         English\tEst.A.1\tEst.A.1\tKeep verse\n\
                         English\tPsa.20.1.0\tPsa.20.1.0\tKeep verse\n";

    #[test]
    fn test_run_and_persist() {
        let output = run(TABLE, &EngineConfig::default()).unwrap();
        assert_eq!(output.mappings.len(), 3);
        assert_eq!(output.report.overall_status, RunStatus::Ok);

        let mut sink = MemorySink::new();
        assert_eq!(output.persist(&mut sink), Ok(3));
        assert_eq!(sink.rows()[1].source_chapter, "A");
    }

    #[test]
    fn test_missing_marker_fails_in_every_policy() {
        let config = EngineConfig {
            strictness: Strictness::Permissive,
            ..EngineConfig::default()
        };
        let err = run("English\tGen.1.1\tGen.1.1\tKeep\n", &config).unwrap_err();
        assert!(matches!(err, RunError::Table(LoadError::MissingDataStart)));
    }

    #[test]
    fn test_zero_budget_aborts_without_partial_output() {
        let config = EngineConfig {
            time_budget_ms: Some(0),
            ..EngineConfig::default()
        };
        match run(TABLE, &config) {
            Err(RunError::BudgetExceeded { budget_ms, .. }) => assert_eq!(budget_ms, 0),
            Err(other) => panic!("unexpected error {}", other),
            // a coarse clock can report no elapsed time at all
            Ok(_) => {}
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EngineConfig {
            skip_budget: 2.0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            run(TABLE, &config),
            Err(RunError::Config(ConfigError::Invalid(_)))
        ));
    }
}
