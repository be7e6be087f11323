//! Token definitions for reference cells
//!
//! Book codes may start with a digit (`1Sa`, `2Ki`), so a word is an optional leading digit
//! followed by a letter; logos' longest match keeps `1Sa` a single word while `12` stays a
//! number.

use logos::Logos;
use std::ops::Range;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefToken {
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token("-")]
    Dash,
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("[")]
    OpenSquare,
    #[token("]")]
    CloseSquare,
    #[token("{")]
    OpenCurly,
    #[token("}")]
    CloseCurly,

    #[regex("[0-9]+")]
    Number,

    #[regex("[0-9]?[A-Za-z][A-Za-z0-9]*")]
    Word,
}

impl RefToken {
    pub fn is_separator(&self) -> bool {
        matches!(self, RefToken::Dot | RefToken::Colon)
    }

    pub fn is_component(&self) -> bool {
        matches!(self, RefToken::Number | RefToken::Word)
    }

    pub fn is_open_bracket(&self) -> bool {
        matches!(
            self,
            RefToken::OpenParen | RefToken::OpenSquare | RefToken::OpenCurly
        )
    }

    pub fn is_close_bracket(&self) -> bool {
        matches!(
            self,
            RefToken::CloseParen | RefToken::CloseSquare | RefToken::CloseCurly
        )
    }

    pub fn is_bracket(&self) -> bool {
        self.is_open_bracket() || self.is_close_bracket()
    }

    /// The closing token matching an opening bracket.
    pub fn closer(&self) -> Option<RefToken> {
        match self {
            RefToken::OpenParen => Some(RefToken::CloseParen),
            RefToken::OpenSquare => Some(RefToken::CloseSquare),
            RefToken::OpenCurly => Some(RefToken::CloseCurly),
            _ => None,
        }
    }
}

/// Tokenize a reference cell, keeping byte spans.
///
/// Returns the span of the first character logos could not match.
pub fn tokenize_with_spans(source: &str) -> Result<Vec<(RefToken, Range<usize>)>, Range<usize>> {
    let mut lexer = RefToken::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.span())),
            Err(()) => return Err(lexer.span()),
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<RefToken> {
        tokenize_with_spans(source)
            .unwrap()
            .into_iter()
            .map(|(t, _)| t)
            .collect()
    }

    #[test]
    fn test_plain_reference() {
        assert_eq!(
            kinds("Gen.1:2"),
            vec![
                RefToken::Word,
                RefToken::Dot,
                RefToken::Number,
                RefToken::Colon,
                RefToken::Number
            ]
        );
    }

    #[test]
    fn test_digit_led_book_is_one_word() {
        let tokens = tokenize_with_spans("1Sa.3.4").unwrap();
        assert_eq!(tokens[0], (RefToken::Word, 0..3));
        assert_eq!(tokens[2], (RefToken::Number, 4..5));
    }

    #[test]
    fn test_brackets() {
        assert_eq!(
            kinds("Rom.16.25{14.24}"),
            vec![
                RefToken::Word,
                RefToken::Dot,
                RefToken::Number,
                RefToken::Dot,
                RefToken::Number,
                RefToken::OpenCurly,
                RefToken::Number,
                RefToken::Dot,
                RefToken::Number,
                RefToken::CloseCurly
            ]
        );
        assert_eq!(RefToken::OpenSquare.closer(), Some(RefToken::CloseSquare));
    }

    #[test]
    fn test_unknown_character_reports_span() {
        assert_eq!(tokenize_with_spans("Gen.1 1"), Err(5..6));
    }
}
