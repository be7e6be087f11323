//! Reference parser
//!
//! Grammar (separators `.` and `:` are interchangeable, `sep` below):
//!
//! ```text
//! reference  = "Absent" | primary [ alternate | "-" range-end ]
//! primary    = book sep chapter sep verse [ "." subverse ]
//! chapter    = positive-number | UPPERCASE-LETTER
//! subverse   = number | lowercase-letter          ; ".0" after verse 1 marks the title
//! alternate  = open [ book sep ] parts close      ; open/close: () [] {}
//! range-end  = [ book sep ] parts
//! parts      = verse | verse "." lowercase | chapter sep verse | chapter sep verse sep subverse
//! ```

use super::error::{ParseError, ParseErrorKind};
use super::tokens::{tokenize_with_spans, RefToken};
use super::types::{ChapterId, ReferenceSpec, SubverseTag, VerseRef};
use crate::tvtms::books::BookCode;
use std::cmp::Ordering;
use std::ops::Range;

/// Cell value meaning "no corresponding verse in this tradition".
pub const ABSENT_KEYWORD: &str = "Absent";

type TokenSpan = (RefToken, Range<usize>);

/// Parse one reference cell.
///
/// Surrounding whitespace is ignored; spans in the returned error index into the trimmed text.
pub fn parse_reference(raw: &str) -> Result<ReferenceSpec, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseError::new(
            trimmed,
            ParseErrorKind::Empty,
            0..0,
            "reference cell is empty",
        ));
    }
    if trimmed.eq_ignore_ascii_case(ABSENT_KEYWORD) {
        return Ok(ReferenceSpec::Absent);
    }

    let tokens = tokenize_with_spans(trimmed).map_err(|span| {
        ParseError::new(
            trimmed,
            ParseErrorKind::InvalidCharacter,
            span,
            "character is not part of the reference grammar",
        )
    })?;

    RefParser {
        raw: trimmed,
        tokens,
        pos: 0,
    }
    .parse()
}

struct RefParser<'s> {
    raw: &'s str,
    tokens: Vec<TokenSpan>,
    pos: usize,
}

impl<'s> RefParser<'s> {
    fn parse(mut self) -> Result<ReferenceSpec, ParseError> {
        let primary = self.primary()?;

        match self.bump() {
            None => Ok(ReferenceSpec::Single(primary)),
            Some((token, span)) if token.is_open_bracket() => {
                let alternate = self.alternate(token, span, &primary)?;
                self.expect_end()?;
                Ok(ReferenceSpec::VariantAlternate { primary, alternate })
            }
            Some((RefToken::Dash, span)) => {
                let end = self.range_end(span, &primary)?;
                Ok(ReferenceSpec::Range(primary, end))
            }
            Some((token, span)) if token.is_close_bracket() => Err(self.error(
                ParseErrorKind::UnbalancedBracket,
                span.start..self.raw.len(),
                "closing bracket without an opening one",
            )),
            Some((_, span)) => Err(self.error(
                ParseErrorKind::TrailingInput,
                span.start..self.raw.len(),
                "unexpected text after the reference",
            )),
        }
    }

    fn primary(&mut self) -> Result<VerseRef, ParseError> {
        let (token, span) = self.bump().ok_or_else(|| {
            self.error(ParseErrorKind::Empty, 0..0, "reference cell is empty")
        })?;
        let book = match token {
            RefToken::Word => BookCode::from_code(self.text(&span)),
            _ => None,
        }
        .ok_or_else(|| {
            self.error(
                ParseErrorKind::UnknownBook,
                span.clone(),
                format!("'{}' is not a book code", self.text(&span)),
            )
        })?;

        self.separator(ParseErrorKind::BadChapterToken, "expected '.' or ':' after the book")?;
        let (token, span) = self.expect_component(ParseErrorKind::BadChapterToken, "chapter")?;
        let chapter = self.chapter(token, &span)?;

        self.separator(ParseErrorKind::BadVerseToken, "expected '.' or ':' after the chapter")?;
        let (token, span) = self.expect_component(ParseErrorKind::BadVerseToken, "verse")?;
        let verse = self.verse(token, &span)?;

        let mut subverse = None;
        if let Some((RefToken::Dot, dot_span)) = self.peek().cloned() {
            self.pos += 1;
            let (token, span) = match self.bump() {
                Some(pair) if pair.0.is_component() => pair,
                Some((_, span)) => {
                    return Err(self.error(
                        ParseErrorKind::BadVerseToken,
                        span,
                        "expected a subverse after '.'",
                    ))
                }
                None => {
                    return Err(self.error(
                        ParseErrorKind::BadVerseToken,
                        dot_span,
                        "dangling '.' after the verse",
                    ))
                }
            };
            subverse = Some((self.subverse(token, &span)?, span));
        }

        self.finish(book, chapter, verse, subverse)
    }

    fn alternate(
        &mut self,
        open: RefToken,
        open_span: Range<usize>,
        primary: &VerseRef,
    ) -> Result<VerseRef, ParseError> {
        let closer = open.closer();
        let close_at = self.tokens[self.pos..]
            .iter()
            .position(|(token, _)| token.is_bracket())
            .map(|offset| self.pos + offset)
            .filter(|&index| Some(self.tokens[index].0) == closer);

        let Some(close_at) = close_at else {
            return Err(self.error(
                ParseErrorKind::UnbalancedBracket,
                open_span.start..self.raw.len(),
                "alternate reference is not closed by a matching bracket",
            ));
        };

        let inner: Vec<TokenSpan> = self.tokens[self.pos..close_at].to_vec();
        self.pos = close_at + 1;

        if inner.is_empty() {
            return Err(self.error(
                ParseErrorKind::BadVerseToken,
                open_span.start..self.tokens[close_at].1.end,
                "empty alternate reference",
            ));
        }
        self.relative(&inner, primary)
    }

    fn range_end(&mut self, dash: Range<usize>, start: &VerseRef) -> Result<VerseRef, ParseError> {
        let rest: Vec<TokenSpan> = self.tokens[self.pos..].to_vec();
        self.pos = self.tokens.len();

        if rest.is_empty() {
            return Err(self.error(
                ParseErrorKind::BadVerseToken,
                dash,
                "range has no end point",
            ));
        }
        let end = self.relative(&rest, start)?;

        if !end.same_chapter(start) {
            return Err(self.error(
                ParseErrorKind::RangeSpansChapters,
                dash.start..self.raw.len(),
                format!("range {} to {} leaves the chapter", start, end),
            ));
        }

        let whole = dash.start..self.raw.len();
        match end.verse.cmp(&start.verse) {
            Ordering::Less => Err(self.error(
                ParseErrorKind::BadVerseToken,
                whole,
                "range ends before it starts",
            )),
            Ordering::Greater => Ok(end),
            Ordering::Equal => match (start.subverse, end.subverse) {
                (Some(a), Some(b)) if a.same_kind(&b) && b > a => Ok(end),
                (Some(a), Some(b)) if !a.same_kind(&b) => Err(self.error(
                    ParseErrorKind::BadVerseToken,
                    whole,
                    "range mixes numeric and alphabetic subverses",
                )),
                _ => Err(self.error(
                    ParseErrorKind::BadVerseToken,
                    whole,
                    "range does not cover more than one coordinate",
                )),
            },
        }
    }

    /// Resolve the `[book sep] parts` form used by alternates and range ends.
    /// Missing book and chapter are inherited from `base`.
    fn relative(&self, tokens: &[TokenSpan], base: &VerseRef) -> Result<VerseRef, ParseError> {
        let mut parts: Vec<&TokenSpan> = Vec::new();
        let mut expect_part = true;
        for pair in tokens {
            let (token, span) = pair;
            if expect_part && token.is_component() {
                parts.push(pair);
            } else if !expect_part && token.is_separator() {
                // separator between parts
            } else if token.is_bracket() {
                return Err(self.error(
                    ParseErrorKind::UnbalancedBracket,
                    span.clone(),
                    "unexpected bracket",
                ));
            } else if token.is_component() || token.is_separator() {
                return Err(self.error(
                    ParseErrorKind::BadVerseToken,
                    span.clone(),
                    "expected '.' or ':' between reference parts",
                ));
            } else {
                return Err(self.error(
                    ParseErrorKind::TrailingInput,
                    span.clone(),
                    "unexpected text in reference",
                ));
            }
            expect_part = !expect_part;
        }
        if expect_part {
            // ended on a separator
            let span = tokens.last().map(|(_, s)| s.clone()).unwrap_or(0..0);
            return Err(self.error(
                ParseErrorKind::BadVerseToken,
                span,
                "reference ends with a separator",
            ));
        }

        let mut book = base.book;
        let first = parts[0];
        if first.0 == RefToken::Word && !is_letter_chapter(self.text(&first.1)) {
            book = BookCode::from_code(self.text(&first.1)).ok_or_else(|| {
                self.error(
                    ParseErrorKind::UnknownBook,
                    first.1.clone(),
                    format!("'{}' is not a book code", self.text(&first.1)),
                )
            })?;
            parts.remove(0);
            if parts.len() < 2 {
                let span = parts.last().map(|p| p.1.clone()).unwrap_or(first.1.clone());
                return Err(self.error(
                    ParseErrorKind::BadChapterToken,
                    span,
                    "a reference with a book needs a chapter and a verse",
                ));
            }
        }

        match parts.as_slice() {
            [verse] => {
                let number = self.verse(verse.0, &verse.1)?;
                self.finish(book, base.chapter, number, None)
            }
            [verse, tag] if is_alpha_subverse(self.text(&tag.1)) => {
                let number = self.verse(verse.0, &verse.1)?;
                let subverse = self.subverse(tag.0, &tag.1)?;
                self.finish(book, base.chapter, number, Some((subverse, tag.1.clone())))
            }
            [chapter, verse] => {
                let chapter = self.chapter(chapter.0, &chapter.1)?;
                let number = self.verse(verse.0, &verse.1)?;
                self.finish(book, chapter, number, None)
            }
            [chapter, verse, tag] => {
                let chapter = self.chapter(chapter.0, &chapter.1)?;
                let number = self.verse(verse.0, &verse.1)?;
                let subverse = self.subverse(tag.0, &tag.1)?;
                self.finish(book, chapter, number, Some((subverse, tag.1.clone())))
            }
            _ => {
                let start = parts.get(3).map(|p| p.1.start).unwrap_or(0);
                let span = start..self.raw.len();
                Err(self.error(
                    ParseErrorKind::TrailingInput,
                    span,
                    "too many reference parts",
                ))
            }
        }
    }

    fn chapter(&self, token: RefToken, span: &Range<usize>) -> Result<ChapterId, ParseError> {
        let text = self.text(span);
        let chapter = match token {
            RefToken::Number => text
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .map(ChapterId::Numeric),
            RefToken::Word if is_letter_chapter(text) => text.chars().next().map(ChapterId::Letter),
            _ => None,
        };
        chapter.ok_or_else(|| {
            self.error(
                ParseErrorKind::BadChapterToken,
                span.clone(),
                format!(
                    "'{}' is neither a positive number nor an uppercase letter",
                    text
                ),
            )
        })
    }

    fn verse(&self, token: RefToken, span: &Range<usize>) -> Result<u32, ParseError> {
        let text = self.text(span);
        match token {
            RefToken::Number => text.parse::<u32>().ok(),
            _ => None,
        }
        .ok_or_else(|| {
            self.error(
                ParseErrorKind::BadVerseToken,
                span.clone(),
                format!("'{}' is not a verse number", text),
            )
        })
    }

    fn subverse(&self, token: RefToken, span: &Range<usize>) -> Result<SubverseTag, ParseError> {
        let text = self.text(span);
        let tag = match token {
            RefToken::Number => text.parse::<u8>().ok().map(SubverseTag::Numeric),
            RefToken::Word if is_alpha_subverse(text) => text.chars().next().map(SubverseTag::Alpha),
            _ => None,
        };
        tag.ok_or_else(|| {
            self.error(
                ParseErrorKind::BadVerseToken,
                span.clone(),
                format!("'{}' is not a subverse tag", text),
            )
        })
    }

    /// Apply the title-marker rule: `.0` after verse 1 is verse 0.
    fn finish(
        &self,
        book: BookCode,
        chapter: ChapterId,
        verse: u32,
        subverse: Option<(SubverseTag, Range<usize>)>,
    ) -> Result<VerseRef, ParseError> {
        let reference = VerseRef::new(book, chapter, verse);
        match subverse {
            None => Ok(reference),
            Some((SubverseTag::Numeric(0), _)) if verse == 1 => Ok(VerseRef::new(book, chapter, 0)),
            Some((SubverseTag::Numeric(0), span)) => Err(self.error(
                ParseErrorKind::BadVerseToken,
                span,
                "the '.0' title marker only follows verse 1",
            )),
            Some((tag, _)) => Ok(reference.with_subverse(tag)),
        }
    }

    fn separator(&mut self, kind: ParseErrorKind, detail: &str) -> Result<(), ParseError> {
        match self.bump() {
            Some((token, _)) if token.is_separator() => Ok(()),
            Some((_, span)) => Err(self.error(kind, span, detail)),
            None => Err(self.error(kind, self.raw.len()..self.raw.len(), detail)),
        }
    }

    fn expect_component(
        &mut self,
        kind: ParseErrorKind,
        what: &str,
    ) -> Result<TokenSpan, ParseError> {
        match self.bump() {
            Some(pair) if pair.0.is_component() => Ok(pair),
            Some((_, span)) => Err(self.error(kind, span, format!("expected a {}", what))),
            None => Err(self.error(
                kind,
                self.raw.len()..self.raw.len(),
                format!("missing {}", what),
            )),
        }
    }

    fn expect_end(&mut self) -> Result<(), ParseError> {
        match self.bump() {
            None => Ok(()),
            Some((_, span)) => Err(self.error(
                ParseErrorKind::TrailingInput,
                span.start..self.raw.len(),
                "unexpected text after the alternate reference",
            )),
        }
    }

    fn peek(&self) -> Option<&TokenSpan> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<TokenSpan> {
        let pair = self.tokens.get(self.pos).cloned();
        if pair.is_some() {
            self.pos += 1;
        }
        pair
    }

    fn text(&self, span: &Range<usize>) -> &'s str {
        &self.raw[span.clone()]
    }

    fn error(
        &self,
        kind: ParseErrorKind,
        span: Range<usize>,
        detail: impl Into<String>,
    ) -> ParseError {
        ParseError::new(self.raw, kind, span, detail)
    }
}

fn is_letter_chapter(text: &str) -> bool {
    text.len() == 1 && text.chars().all(|c| c.is_ascii_uppercase())
}

fn is_alpha_subverse(text: &str) -> bool {
    text.len() == 1 && text.chars().all(|c| c.is_ascii_lowercase())
}
