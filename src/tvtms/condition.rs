//! Test conditions
//!
//! The Tests column restricts a row to some traditions. A condition is a boolean expression
//! over tradition names:
//!
//! ```text
//! expr  = and ( "|" and )*
//! and   = unary ( "&" unary )*
//! unary = "!"* atom
//! atom  = Tradition | "(" expr ")"
//! ```
//!
//! An atom holds when it names the tradition the run is converting for. The grammar is parsed
//! with chumsky, so precedence (`!` > `&` > `|`) falls out of the combinator nesting.

use crate::tvtms::tradition::TraditionTag;
use chumsky::prelude::*;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TestExpr {
    Tradition(TraditionTag),
    Not(Box<TestExpr>),
    And(Box<TestExpr>, Box<TestExpr>),
    Or(Box<TestExpr>, Box<TestExpr>),
}

impl TestExpr {
    pub fn evaluate(&self, active: TraditionTag) -> bool {
        match self {
            TestExpr::Tradition(tag) => *tag == active,
            TestExpr::Not(inner) => !inner.evaluate(active),
            TestExpr::And(lhs, rhs) => lhs.evaluate(active) && rhs.evaluate(active),
            TestExpr::Or(lhs, rhs) => lhs.evaluate(active) || rhs.evaluate(active),
        }
    }
}

impl fmt::Display for TestExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestExpr::Tradition(tag) => write!(f, "{}", tag),
            TestExpr::Not(inner) => write!(f, "!{}", inner),
            TestExpr::And(lhs, rhs) => write!(f, "({} & {})", lhs, rhs),
            TestExpr::Or(lhs, rhs) => write!(f, "({} | {})", lhs, rhs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("bad test condition '{text}': {message}")]
pub struct ConditionError {
    pub text: String,
    pub message: String,
}

/// The full condition grammar, anchored at both ends.
pub fn test_expr() -> impl Parser<char, TestExpr, Error = Simple<char>> + Clone {
    recursive(|expr| {
        let tradition = text::ident().try_map(|name: String, span| {
            name.parse::<TraditionTag>()
                .map(TestExpr::Tradition)
                .map_err(|err| Simple::custom(span, err.to_string()))
        });

        let atom = tradition
            .or(expr.delimited_by(just('('), just(')')))
            .padded();

        let unary = just('!')
            .padded()
            .repeated()
            .then(atom)
            .foldr(|_, inner| TestExpr::Not(Box::new(inner)));

        let conjunction = unary
            .clone()
            .then(just('&').padded().ignore_then(unary).repeated())
            .foldl(|lhs, rhs| TestExpr::And(Box::new(lhs), Box::new(rhs)));

        conjunction
            .clone()
            .then(just('|').padded().ignore_then(conjunction).repeated())
            .foldl(|lhs, rhs| TestExpr::Or(Box::new(lhs), Box::new(rhs)))
    })
    .then_ignore(end())
}

/// Parse a Tests cell. A blank cell means the row always applies.
pub fn parse_test_condition(cell: &str) -> Result<Option<TestExpr>, ConditionError> {
    let text = cell.trim();
    if text.is_empty() {
        return Ok(None);
    }
    test_expr().parse(text).map(Some).map_err(|errors| ConditionError {
        text: text.to_string(),
        message: errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; "),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> TestExpr {
        parse_test_condition(text).unwrap().unwrap()
    }

    #[test]
    fn test_single_tradition() {
        let expr = parse("Hebrew");
        assert_eq!(expr, TestExpr::Tradition(TraditionTag::Hebrew));
        assert!(expr.evaluate(TraditionTag::Hebrew));
        assert!(!expr.evaluate(TraditionTag::English));
    }

    #[test]
    fn test_precedence() {
        // & binds tighter than |
        let expr = parse("Latin | Greek & !Greek");
        assert!(expr.evaluate(TraditionTag::Latin));
        assert!(!expr.evaluate(TraditionTag::Greek));
        assert_eq!(expr.to_string(), "(Latin | (Greek & !Greek))");
    }

    #[test]
    fn test_parentheses_and_negation() {
        let expr = parse("!(Hebrew | Latin)");
        assert!(expr.evaluate(TraditionTag::English));
        assert!(!expr.evaluate(TraditionTag::Latin));
        assert!(parse("!!English").evaluate(TraditionTag::English));
    }

    #[test]
    fn test_blank_cell_is_no_condition() {
        assert_eq!(parse_test_condition("  ").unwrap(), None);
    }

    #[test]
    fn test_errors() {
        assert!(parse_test_condition("Klingon").is_err());
        assert!(parse_test_condition("Hebrew &").is_err());
        assert!(parse_test_condition("(Hebrew").is_err());
        let err = parse_test_condition("Hebrew Greek").unwrap_err();
        assert_eq!(err.text, "Hebrew Greek");
    }
}
