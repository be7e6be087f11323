//! Expected-verse catalog
//!
//! The read surface of the store: which verses each book is expected to have. Coverage is
//! measured against it. A catalog table has one `Book<TAB>Chapter<TAB>VerseCount` line per
//! chapter; `#` starts a comment.

use crate::tvtms::books::BookCode;
use crate::tvtms::reference::{ChapterId, VerseRef};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("catalog line {line}: {message}")]
pub struct CatalogError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerseCatalog {
    books: BTreeMap<BookCode, BTreeMap<ChapterId, u32>>,
}

impl VerseCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Result<Self, CatalogError> {
        let mut catalog = VerseCatalog::new();
        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            let content = line.split('#').next().unwrap_or("").trim();
            if content.is_empty() {
                continue;
            }
            let error = |message: String| CatalogError {
                line: line_no,
                message,
            };

            let cells: Vec<&str> = content.split('\t').map(str::trim).collect();
            let [book, chapter, count] = cells.as_slice() else {
                return Err(error(format!("expected 3 columns, found {}", cells.len())));
            };
            let book = BookCode::from_code(book)
                .ok_or_else(|| error(format!("unknown book '{}'", book)))?;
            let chapter = parse_chapter(chapter)
                .ok_or_else(|| error(format!("bad chapter '{}'", chapter)))?;
            let count = count
                .parse::<u32>()
                .map_err(|_| error(format!("bad verse count '{}'", count)))?;
            catalog.insert(book, chapter, count);
        }
        Ok(catalog)
    }

    /// Declare that `chapter` of `book` has verses `1..=count`.
    pub fn insert(&mut self, book: BookCode, chapter: ChapterId, count: u32) {
        self.books.entry(book).or_default().insert(chapter, count);
    }

    pub fn with_chapter(mut self, book: BookCode, chapter: ChapterId, count: u32) -> Self {
        self.insert(book, chapter, count);
        self
    }

    pub fn books(&self) -> impl Iterator<Item = BookCode> + '_ {
        self.books.keys().copied()
    }

    /// Number of verses expected in `book`. Title verses are never expected.
    pub fn expected_count(&self, book: BookCode) -> usize {
        self.books
            .get(&book)
            .map(|chapters| chapters.values().map(|count| *count as usize).sum())
            .unwrap_or(0)
    }

    /// Whether `verse` is one of the expected verses (subverse ignored).
    pub fn is_expected(&self, verse: &VerseRef) -> bool {
        self.books
            .get(&verse.book)
            .and_then(|chapters| chapters.get(&verse.chapter))
            .is_some_and(|count| (1..=*count).contains(&verse.verse))
    }
}

fn parse_chapter(text: &str) -> Option<ChapterId> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_uppercase() => Some(ChapterId::Letter(c)),
        _ => text
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .map(ChapterId::Numeric),
    }
}
