//! Reference parsing
//!
//!     Converts a raw TVTMS reference cell into a [ReferenceSpec]:
//!
//!         Gen.1.1          Gen.1:1         plain coordinates
//!         Est.A:1                          letter chapter
//!         Psa.20:0         Psa.20:1.0      title verse
//!         Gen.1.1.2        Gen.1.1.a       numeric and alphabetic subverses
//!         Gen.50:24-26     Gen.50:24-50:26 ranges inside one chapter
//!         Mat.15.6(15.5)   Mat.17.15[17.14]   Rom.16.25{14.24}   alternate numbering
//!         Absent
//!
//!     The parser never guesses. Recovery belongs to the loader.

pub mod error;
pub mod expand;
pub mod parser;
pub mod tokens;
pub mod types;

pub use error::{ParseError, ParseErrorKind};
pub use expand::expand_range;
pub use parser::{parse_reference, ABSENT_KEYWORD};
pub use tokens::{tokenize_with_spans, RefToken};
pub use types::{ChapterId, ReferenceSpec, SubverseTag, VerseRef};
