//! Engine configuration
//!
//! `defaults/tvtms.default.toml` is embedded into the binary so the documented defaults and
//! the runtime behavior stay in sync. Callers layer their own files and overrides on top via
//! [Loader] before deserializing into [EngineConfig].

use crate::tvtms::action::{ActionKind, PriorityTable};
use crate::tvtms::catalog::VerseCatalog;
use crate::tvtms::engine::{CoverageFloors, EngineOptions};
use crate::tvtms::loader::{RecordLoader, Strictness};
use crate::tvtms::tradition::TraditionTag;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError as SettingsError, File, FileFormat, ValueKind};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

const DEFAULT_TOML: &str = include_str!("../../defaults/tvtms.default.toml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub strictness: Strictness,
    pub standard_tradition: TraditionTag,
    pub skip_budget: f64,
    pub parallel: bool,
    #[serde(default)]
    pub time_budget_ms: Option<u64>,
    pub coverage: CoverageFloors,
    pub priority: Vec<ActionKind>,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let CoverageFloors {
            error_floor,
            warning_floor,
        } = self.coverage;
        if !(0.0..=1.0).contains(&error_floor) || !(0.0..=1.0).contains(&warning_floor) {
            return Err(ConfigError::Invalid(
                "coverage floors must be between 0 and 1".to_string(),
            ));
        }
        if error_floor > warning_floor {
            return Err(ConfigError::Invalid(format!(
                "coverage.error_floor ({}) is above coverage.warning_floor ({})",
                error_floor, warning_floor
            )));
        }
        if !(0.0..=1.0).contains(&self.skip_budget) {
            return Err(ConfigError::Invalid(
                "skip_budget must be between 0 and 1".to_string(),
            ));
        }

        let table = self.priority_table()?;
        if table.rank(ActionKind::Merged) > table.rank(ActionKind::Renumber) {
            return Err(ConfigError::Invalid(
                "merged must be applied before renumber".to_string(),
            ));
        }
        Ok(())
    }

    pub fn priority_table(&self) -> Result<PriorityTable, ConfigError> {
        PriorityTable::new(self.priority.clone())
            .map_err(|err| ConfigError::Invalid(err.to_string()))
    }

    pub fn record_loader(&self) -> RecordLoader {
        RecordLoader::new(self.strictness)
            .with_tradition(self.standard_tradition)
            .with_parallel(self.parallel)
    }

    pub fn engine_options(
        &self,
        catalog: Option<VerseCatalog>,
    ) -> Result<EngineOptions, ConfigError> {
        Ok(EngineOptions {
            priorities: self.priority_table()?,
            floors: self.coverage,
            target_tradition: self.standard_tradition,
            catalog,
        })
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            strictness: Strictness::default(),
            standard_tradition: TraditionTag::default(),
            skip_budget: 0.01,
            parallel: false,
            time_budget_ms: None,
            coverage: CoverageFloors::default(),
            priority: PriorityTable::default().order().to_vec(),
        }
    }
}

/// Layers user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files are an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer a configuration file if it exists.
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (used for command line flags).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize, deserialize and validate.
    pub fn build(self) -> Result<EngineConfig, ConfigError> {
        let config: EngineConfig = self.builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn load_defaults() -> Result<EngineConfig, ConfigError> {
    Loader::new().build()
}
