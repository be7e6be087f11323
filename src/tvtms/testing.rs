//! Testing utilities for engine output
//!
//! Engine tests should use two tools together:
//!
//! 1. **[TvtmsSources](crate::tvtms::processor::samples::TvtmsSources)** for table content.
//!    The TVTMS layout has many small conventions (the `#DataStart` marker, tab-separated
//!    columns, free-text action names) that are easy to get subtly wrong in an inline string.
//!    The sample files under `docs/samples/` are verified once and shared.
//! 2. **[assert_mappings]** and **[assert_report]** for verifying results. Each mapping is
//!    checked field by field against its textual form, which keeps expectations readable:
//!
//! ```rust
//! use versemap::tvtms::processor::samples::TvtmsSources;
//! use versemap::tvtms::testing::{assert_mappings, assert_report};
//! use versemap::tvtms::RunStatus;
//!
//! let output = TvtmsSources::get_run("030-merge-then-renumber.tsv").unwrap();
//! assert_mappings(&output.mappings)
//!     .count(2)
//!     .mapping(0, |m| {
//!         m.source("Psa.9.21").target("Psa.9.20").operation("merge-into");
//!     });
//! assert_report(&output.report).status(RunStatus::Ok).skipped(0);
//! ```

mod testing_assertions;

pub use testing_assertions::{
    assert_mappings, assert_report, MappingAssertion, MappingsAssertion, ReportAssertion,
};
