//! TVTMS versification engine
//!
//!     Turns a TVTMS table into a deterministic list of per-verse mapping operations. Data
//!     flows one way: [reference] parses cells, [loader] builds records, [engine] resolves
//!     them and [pipeline] ties the stages together into a [RunReport](report::RunReport).

pub mod action;
pub mod books;
pub mod catalog;
pub mod condition;
pub mod config;
pub mod engine;
pub mod loader;
pub mod mapping;
pub mod pipeline;
pub mod processor;
pub mod record;
pub mod reference;
pub mod report;
pub mod testing;
pub mod tradition;

pub use action::{ActionKind, PriorityTable};
pub use books::BookCode;
pub use engine::{build_mappings, EngineOptions, MappingEngine};
pub use loader::{RecordLoader, Strictness};
pub use mapping::{MoveOp, VersificationMapping};
pub use pipeline::{run, RunError, RunOutput};
pub use record::MappingRecord;
pub use reference::{
    parse_reference, ChapterId, ParseError, ParseErrorKind, ReferenceSpec, SubverseTag, VerseRef,
};
pub use report::{RunReport, RunStatus};
pub use tradition::TraditionTag;
