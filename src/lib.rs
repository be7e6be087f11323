//! # versemap
//!
//! Parser and mapping engine for TVTMS versification tables.
//!
//! ## Testing
//!
//! Tests should read their input from the curated tables exposed by
//! [TvtmsSources](tvtms::processor::samples::TvtmsSources) and verify results with the
//! fluent assertions in the [testing module](tvtms::testing).

pub mod tvtms;
