//! Output formats for mappings and reports
//!
//! Mappings render as a TSV of store rows (the persisted layout), JSON, YAML, or one line per
//! mapping. Reports render as JSON, YAML, or the plain summary.
//!
//! # Sample Sources
//!
//! The [samples] module gives access to the verified TVTMS tables under `docs/samples/`.
//! Tests should load tables through it instead of inlining copies, so every test reads the
//! same curated data.
//!
//! ```rust
//! use versemap::tvtms::processor::samples::TvtmsSources;
//!
//! let table = TvtmsSources::get_string("000-basic.tsv").unwrap();
//! let output = TvtmsSources::get_run("000-basic.tsv").unwrap();
//! let tsv = TvtmsSources::get_processed("030-merge-then-renumber.tsv", "tsv").unwrap();
//! ```

use crate::tvtms::mapping::{StoreRow, VersificationMapping};
use crate::tvtms::report::RunReport;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Tsv,
    Json,
    Yaml,
    Simple,
}

impl OutputFormat {
    pub const ALL: &'static [OutputFormat] = &[
        OutputFormat::Tsv,
        OutputFormat::Json,
        OutputFormat::Yaml,
        OutputFormat::Simple,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Tsv => "tsv",
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Simple => "simple",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tsv" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "simple" => Ok(OutputFormat::Simple),
            other => Err(ProcessingError::InvalidFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    #[error("Format '{0}' is not available for {1}")]
    Unsupported(OutputFormat, &'static str),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error(transparent)]
    Run(#[from] crate::tvtms::pipeline::RunError),
}

/// Every format name accepted by [OutputFormat::from_str].
pub fn available_formats() -> Vec<String> {
    OutputFormat::ALL.iter().map(|f| f.name().to_string()).collect()
}

pub fn format_mappings(
    mappings: &[VersificationMapping],
    format: OutputFormat,
) -> Result<String, ProcessingError> {
    match format {
        OutputFormat::Tsv => {
            let mut out = StoreRow::COLUMNS.join("\t");
            out.push('\n');
            for mapping in mappings {
                out.push_str(&mapping.to_store_row().cells().join("\t"));
                out.push('\n');
            }
            Ok(out)
        }
        OutputFormat::Json => serde_json::to_string_pretty(mappings)
            .map_err(|e| ProcessingError::Serialization(e.to_string())),
        OutputFormat::Yaml => serde_yaml::to_string(mappings)
            .map_err(|e| ProcessingError::Serialization(e.to_string())),
        OutputFormat::Simple => Ok(mappings
            .iter()
            .map(|mapping| format!("{}\n", mapping))
            .collect()),
    }
}

pub fn format_report(report: &RunReport, format: OutputFormat) -> Result<String, ProcessingError> {
    match format {
        OutputFormat::Simple => Ok(report.to_string()),
        OutputFormat::Json => serde_json::to_string_pretty(report)
            .map_err(|e| ProcessingError::Serialization(e.to_string())),
        OutputFormat::Yaml => serde_yaml::to_string(report)
            .map_err(|e| ProcessingError::Serialization(e.to_string())),
        OutputFormat::Tsv => Err(ProcessingError::Unsupported(format, "reports")),
    }
}

/// Access to the verified sample tables
pub mod samples {
    use super::*;
    use crate::tvtms::config::EngineConfig;
    use crate::tvtms::pipeline::{run, RunOutput};
    use std::fs;

    pub const SAMPLES_DIR: &str = "docs/samples";

    /// Available sample tables (canonical sources)
    pub const AVAILABLE_SAMPLES: &[&str] = &[
        "000-basic.tsv",
        "010-psalm-titles.tsv",
        "020-ranges-and-alternates.tsv",
        "030-merge-then-renumber.tsv",
        "040-malformed-rows.tsv",
        "050-test-conditions.tsv",
    ];

    pub struct TvtmsSources;

    impl TvtmsSources {
        fn sample_path(filename: &str) -> String {
            format!("{}/{}", SAMPLES_DIR, filename)
        }

        fn validate_sample(filename: &str) -> Result<(), ProcessingError> {
            if !AVAILABLE_SAMPLES.contains(&filename) {
                return Err(ProcessingError::FileNotFound(format!(
                    "Sample '{}' is not available. Available samples: {:?}",
                    filename, AVAILABLE_SAMPLES
                )));
            }
            Ok(())
        }

        /// Raw table text.
        pub fn get_string(filename: &str) -> Result<String, ProcessingError> {
            Self::validate_sample(filename)?;
            let path = Self::sample_path(filename);
            fs::read_to_string(&path)
                .map_err(|e| ProcessingError::IoError(format!("Failed to read {}: {}", path, e)))
        }

        /// Run the sample through the pipeline with the default configuration.
        pub fn get_run(filename: &str) -> Result<RunOutput, ProcessingError> {
            Self::get_run_with(filename, &EngineConfig::default())
        }

        pub fn get_run_with(
            filename: &str,
            config: &EngineConfig,
        ) -> Result<RunOutput, ProcessingError> {
            let text = Self::get_string(filename)?;
            Ok(run(&text, config)?)
        }

        /// The mappings of a default run, rendered in `format`.
        pub fn get_processed(filename: &str, format: &str) -> Result<String, ProcessingError> {
            let format: OutputFormat = format.parse()?;
            let output = Self::get_run(filename)?;
            format_mappings(&output.mappings, format)
        }

        pub fn list_samples() -> Vec<&'static str> {
            AVAILABLE_SAMPLES.to_vec()
        }

        pub fn get_sample_info(filename: &str) -> Result<SampleInfo, ProcessingError> {
            let content = Self::get_string(filename)?;
            Ok(SampleInfo {
                filename: filename.to_string(),
                line_count: content.lines().count(),
                description: content
                    .lines()
                    .next()
                    .map(|line| line.trim_start_matches('#').trim().to_string()),
            })
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct SampleInfo {
        pub filename: String,
        pub line_count: usize,
        /// First line of the header text.
        pub description: Option<String>,
    }

}
