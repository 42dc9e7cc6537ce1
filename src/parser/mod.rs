//! # Pattern parser
//! This module parses pattern text into an [Ast]. Lexing and parsing are
//! separate: [token::Tokenizer] classifies each byte of the pattern into a
//! lazy [token::Token] stream, and a recursive descent parser assembles the
//! stream into a tree according to this grammar:
//!
//! ```text
//! Regex          = Concatenation ( '|' Concatenation )*
//! Concatenation  = Unit+                 (until '|', ')' or end of input)
//! Unit           = Basic Quantifier?
//! Basic          = Literal | Escaped | '.' | '-' | '[' CharRange+ ']' | '(' Regex ')'
//! CharRange      = Char ( '-' Char )?
//! Char           = Literal | Escaped | '.'
//! Quantifier     = '*' | '+' | '?' | '{' … '}'
//! ```
//!
//! Concatenations and alternations are flattened into n-ary nodes, and nodes
//! with a single child collapse to that child, so `a`, `(a)` and `a|a` have
//! the tree shapes `Literal`, `Group(Literal)` and
//! `Alternation([Literal, Literal])` respectively.
//!
//! A bare `-` outside a class is an ordinary literal. Inside a class, a
//! character not followed by `-` denotes the single-byte range `c-c`.
//!
//! The brace quantifier `{…}` splits its content on the first comma: `{n,m}`
//! repeats n to m times, `{n,}` at least n times, `{,m}` at most m times, and
//! an empty field means 0 (missing minimum) or unbounded (missing maximum).
//! A single number `{n}` also means *at least* n times, i.e. `{n}` ≡ `{n,}`.
//! Both bounds are base-10 non-negative integers and the minimum may not
//! exceed the maximum.
//!
//! Parsing recurses on nesting depth, so absurdly deep parenthesization can
//! exhaust the call stack; patterns written by people and machines alike stay
//! far below that bound.

pub mod token;

use crate::ast::{Ast, ByteRange, RangeEnd};
use std::iter::Peekable;
use thiserror::Error;
pub use token::LexError;
use token::{Token, Tokenizer};

/// The reasons a pattern can fail to compile. Lexical failures are carried
/// through from the tokenizer; everything else is raised by the parser.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("unexpected {0}")]
    UnexpectedToken(Token),
    #[error("unexpected end of pattern")]
    UnexpectedEnd,
    #[error("invalid quantifier '{{{0}}}'")]
    InvalidQuantifier(String),
    #[error("quantifier {{{0},{1}}} has minimum greater than maximum")]
    QuantifierOutOfOrder(u32, u32),
}

/// Parses a pattern into an [Ast]. The whole pattern must be consumed,
/// otherwise this function errors.
pub fn pattern(input: &str) -> Result<Ast, ParseError> {
    pattern_bytes(input.as_bytes())
}

/// Parses a pattern given as raw bytes. Multi-byte UTF-8 characters are
/// treated as one literal per byte; the engine is byte-level throughout.
pub fn pattern_bytes(input: &[u8]) -> Result<Ast, ParseError> {
    let mut parser = Parser {
        tokens: Tokenizer::new(input).peekable(),
    };
    let ast = parser.regex()?;
    match parser.next()? {
        None => Ok(ast),
        Some(token) => Err(ParseError::UnexpectedToken(token)),
    }
}

struct Parser<'a> {
    tokens: Peekable<Tokenizer<'a>>,
}

impl Parser<'_> {
    fn peek(&mut self) -> Result<Option<&Token>, ParseError> {
        match self.tokens.peek() {
            None => Ok(None),
            Some(Ok(token)) => Ok(Some(token)),
            Some(Err(error)) => Err(error.clone().into()),
        }
    }

    fn next(&mut self) -> Result<Option<Token>, ParseError> {
        Ok(self.tokens.next().transpose()?)
    }

    fn regex(&mut self) -> Result<Ast, ParseError> {
        let mut branches = vec![self.concatenation()?];
        while matches!(self.peek()?, Some(Token::Or)) {
            self.next()?;
            branches.push(self.concatenation()?);
        }
        Ok(collapse(branches, Ast::Alternation))
    }

    fn concatenation(&mut self) -> Result<Ast, ParseError> {
        let mut units = vec![self.unit()?];
        loop {
            match self.peek()? {
                None | Some(Token::Or) | Some(Token::GroupEnd) => break,
                Some(_) => units.push(self.unit()?),
            }
        }
        Ok(collapse(units, Ast::Concatenation))
    }

    fn unit(&mut self) -> Result<Ast, ParseError> {
        let basic = self.basic()?;
        self.quantifier(basic)
    }

    fn basic(&mut self) -> Result<Ast, ParseError> {
        match self.next()? {
            None => Err(ParseError::UnexpectedEnd),
            Some(Token::Literal(b)) => Ok(Ast::Literal(b)),
            // A '-' where a unit is expected is an ordinary literal
            Some(Token::Range) => Ok(Ast::Literal(b'-')),
            Some(Token::Escaped(b)) => Ok(Ast::Escaped(b)),
            Some(Token::Wildcard) => Ok(Ast::Range(ByteRange::WILDCARD)),
            Some(Token::ClassStart) => Ok(Ast::Class(self.class()?)),
            Some(Token::GroupStart) => {
                let inner = self.regex()?;
                match self.next()? {
                    Some(Token::GroupEnd) => Ok(Ast::Group(Box::new(inner))),
                    Some(token) => Err(ParseError::UnexpectedToken(token)),
                    None => Err(ParseError::UnexpectedEnd),
                }
            }
            Some(token) => Err(ParseError::UnexpectedToken(token)),
        }
    }

    fn quantifier(&mut self, unit: Ast) -> Result<Ast, ParseError> {
        let token = match self.peek()? {
            Some(
                token @ (Token::ZeroInf
                | Token::OneInf
                | Token::ZeroOne
                | Token::SpecificQuantifier(_)),
            ) => token.clone(),
            _ => return Ok(unit),
        };
        self.next()?;
        match token {
            Token::ZeroInf => Ok(Ast::ZeroOrMore(Box::new(unit))),
            Token::OneInf => Ok(Ast::OneOrMore(Box::new(unit))),
            Token::ZeroOne => Ok(Ast::ZeroOrOne(Box::new(unit))),
            Token::SpecificQuantifier(lexeme) => counted(unit, &lexeme),
            _ => unreachable!("peek only admits quantifier tokens"),
        }
    }

    fn class(&mut self) -> Result<Vec<ByteRange>, ParseError> {
        let mut ranges = Vec::new();
        loop {
            if matches!(self.peek()?, Some(Token::ClassEnd)) {
                self.next()?;
                break;
            }
            let start = self.class_char()?;
            let range = if matches!(self.peek()?, Some(Token::Range)) {
                self.next()?;
                ByteRange::new(start, self.class_char()?)
            } else {
                ByteRange::new(start, start)
            };
            ranges.push(range);
        }
        if ranges.is_empty() {
            // A class must contain at least one range
            return Err(ParseError::UnexpectedToken(Token::ClassEnd));
        }
        Ok(ranges)
    }

    fn class_char(&mut self) -> Result<RangeEnd, ParseError> {
        match self.next()? {
            Some(Token::Literal(b)) | Some(Token::Escaped(b)) => Ok(RangeEnd::Byte(b)),
            Some(Token::Wildcard) => Ok(RangeEnd::Wildcard),
            Some(token) => Err(ParseError::UnexpectedToken(token)),
            None => Err(ParseError::UnexpectedEnd),
        }
    }
}

fn collapse(mut nodes: Vec<Ast>, wrap: impl FnOnce(Vec<Ast>) -> Ast) -> Ast {
    if nodes.len() == 1 {
        nodes.remove(0)
    } else {
        wrap(nodes)
    }
}

fn counted(node: Ast, lexeme: &str) -> Result<Ast, ParseError> {
    let (min_field, max_field) = match lexeme.split_once(',') {
        None => (lexeme, None),
        Some((min_field, max_field)) => (min_field, Some(max_field)),
    };
    let parse_field = |field: &str| {
        field
            .parse::<u32>()
            .map_err(|_| ParseError::InvalidQuantifier(lexeme.to_owned()))
    };
    let min = if min_field.is_empty() {
        0
    } else {
        parse_field(min_field)?
    };
    let max = match max_field {
        None | Some("") => None,
        Some(field) => Some(parse_field(field)?),
    };
    if let Some(max) = max {
        if min > max {
            return Err(ParseError::QuantifierOutOfOrder(min, max));
        }
    }
    Ok(Ast::Counted {
        node: Box::new(node),
        min,
        max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Ast::*;

    fn literal(b: u8) -> Ast {
        Literal(b)
    }

    #[test]
    fn grouped_star() {
        let ast = pattern("(ab)*").unwrap();
        assert_eq!(
            ast,
            ZeroOrMore(Box::new(Group(Box::new(Concatenation(vec![
                literal(b'a'),
                literal(b'b'),
            ])))))
        );
    }

    #[test]
    fn class_plus() {
        let ast = pattern("[a-z]+").unwrap();
        assert_eq!(
            ast,
            OneOrMore(Box::new(Class(vec![ByteRange::new(
                RangeEnd::Byte(b'a'),
                RangeEnd::Byte(b'z'),
            )])))
        );
    }

    #[test]
    fn quantifier_chain() {
        let ast = pattern("a?b+c*").unwrap();
        assert_eq!(
            ast,
            Concatenation(vec![
                ZeroOrOne(Box::new(literal(b'a'))),
                OneOrMore(Box::new(literal(b'b'))),
                ZeroOrMore(Box::new(literal(b'c'))),
            ])
        );
    }

    #[test]
    fn alternation_in_group() {
        let ast = pattern("(a|b)c").unwrap();
        assert_eq!(
            ast,
            Concatenation(vec![
                Group(Box::new(Alternation(vec![literal(b'a'), literal(b'b')]))),
                literal(b'c'),
            ])
        );
    }

    #[test]
    fn counted_escape() {
        let ast = pattern(r"\d{2,4}").unwrap();
        assert_eq!(
            ast,
            Counted {
                node: Box::new(Escaped(b'd')),
                min: 2,
                max: Some(4),
            }
        );
    }

    #[test]
    fn counted_field_defaults() {
        assert_eq!(
            pattern("a{3}").unwrap(),
            Counted {
                node: Box::new(literal(b'a')),
                min: 3,
                max: None,
            }
        );
        assert_eq!(
            pattern("a{,5}").unwrap(),
            Counted {
                node: Box::new(literal(b'a')),
                min: 0,
                max: Some(5),
            }
        );
        assert_eq!(
            pattern("a{2,}").unwrap(),
            Counted {
                node: Box::new(literal(b'a')),
                min: 2,
                max: None,
            }
        );
    }

    #[test]
    fn bare_dash_is_a_literal() {
        assert_eq!(
            pattern("a-b").unwrap(),
            Concatenation(vec![literal(b'a'), literal(b'-'), literal(b'b')])
        );
    }

    #[test]
    fn wildcard_is_the_full_range() {
        assert_eq!(pattern(".").unwrap(), Range(ByteRange::WILDCARD));
    }

    #[test]
    fn class_chars_without_dash_are_singleton_ranges() {
        let ast = pattern("[ab-d]").unwrap();
        assert_eq!(
            ast,
            Class(vec![
                ByteRange::new(RangeEnd::Byte(b'a'), RangeEnd::Byte(b'a')),
                ByteRange::new(RangeEnd::Byte(b'b'), RangeEnd::Byte(b'd')),
            ])
        );
    }

    #[test]
    fn escaped_byte_in_class_is_raw() {
        let ast = pattern(r"[\d\]]").unwrap();
        assert_eq!(
            ast,
            Class(vec![
                ByteRange::new(RangeEnd::Byte(b'd'), RangeEnd::Byte(b'd')),
                ByteRange::new(RangeEnd::Byte(b']'), RangeEnd::Byte(b']')),
            ])
        );
    }

    #[test]
    fn byte_patterns_parse_without_utf8() {
        let ast = pattern_bytes(b"\xff*").unwrap();
        assert_eq!(ast, ZeroOrMore(Box::new(literal(0xff))));
    }

    #[test]
    fn quantifier_without_unit_is_rejected() {
        assert_eq!(
            pattern("*a"),
            Err(ParseError::UnexpectedToken(Token::ZeroInf))
        );
    }

    #[test]
    fn stray_group_end_is_rejected() {
        assert_eq!(
            pattern("a)b"),
            Err(ParseError::UnexpectedToken(Token::GroupEnd))
        );
        assert_eq!(pattern(")"), Err(ParseError::UnexpectedToken(Token::GroupEnd)));
    }

    #[test]
    fn unterminated_group_is_rejected() {
        assert_eq!(pattern("(ab"), Err(ParseError::UnexpectedEnd));
    }

    #[test]
    fn unterminated_class_is_rejected() {
        assert_eq!(pattern("[ab"), Err(ParseError::UnexpectedEnd));
    }

    #[test]
    fn empty_pattern_is_rejected() {
        assert_eq!(pattern(""), Err(ParseError::UnexpectedEnd));
        assert_eq!(pattern("a|"), Err(ParseError::UnexpectedEnd));
    }

    #[test]
    fn empty_class_is_rejected() {
        assert_eq!(
            pattern("[]"),
            Err(ParseError::UnexpectedToken(Token::ClassEnd))
        );
    }

    #[test]
    fn quantifier_bound_errors() {
        assert_eq!(
            pattern("a{4,2}"),
            Err(ParseError::QuantifierOutOfOrder(4, 2))
        );
        assert_eq!(
            pattern("a{x}"),
            Err(ParseError::InvalidQuantifier("x".into()))
        );
        assert_eq!(
            pattern("a{1,2,3}"),
            Err(ParseError::InvalidQuantifier("1,2,3".into()))
        );
    }

    #[test]
    fn lex_errors_surface_through_parsing() {
        assert_eq!(
            pattern(r"ab\"),
            Err(ParseError::Lex(LexError::UnfinishedEscape))
        );
        assert_eq!(
            pattern("a{2"),
            Err(ParseError::Lex(LexError::UnclosedQuantifier))
        );
    }
}
