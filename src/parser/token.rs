use nom::branch::alt;
use nom::bytes::complete::{tag, take, take_till};
use nom::combinator::{cut, map, value};
use nom::sequence::{delimited, preceded};
use nom::IResult;
use std::fmt;
use thiserror::Error;

/// One lexical element of a pattern. The tokenizer is context-free: `-` is
/// always [Token::Range] and `]` always [Token::ClassEnd], no matter where
/// they occur; the parser decides what they mean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Any byte without special meaning
    Literal(u8),
    /// `(`
    GroupStart,
    /// `)`
    GroupEnd,
    /// `[`
    ClassStart,
    /// `]`
    ClassEnd,
    /// `|`
    Or,
    /// `.`
    Wildcard,
    /// `*`
    ZeroInf,
    /// `+`
    OneInf,
    /// `?`
    ZeroOne,
    /// `\` followed by the byte it escapes
    Escaped(u8),
    /// `-`
    Range,
    /// `{…}`, carrying the brace content with ASCII spaces and tabs stripped
    SpecificQuantifier(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unfinished escape sequence at end of pattern")]
    UnfinishedEscape,
    #[error("unclosed quantifier: no '}}' before end of pattern")]
    UnclosedQuantifier,
}

fn token(input: &[u8]) -> IResult<&[u8], Token> {
    alt((
        value(Token::GroupStart, tag("(")),
        value(Token::GroupEnd, tag(")")),
        value(Token::ClassStart, tag("[")),
        value(Token::ClassEnd, tag("]")),
        value(Token::Or, tag("|")),
        value(Token::ZeroInf, tag("*")),
        value(Token::OneInf, tag("+")),
        value(Token::ZeroOne, tag("?")),
        value(Token::Wildcard, tag(".")),
        value(Token::Range, tag("-")),
        // cut: a bare trailing '\' or an unclosed '{' must fail the whole
        // token, not fall through to the literal branch below
        map(preceded(tag(r"\"), cut(take(1usize))), |b: &[u8]| {
            Token::Escaped(b[0])
        }),
        map(
            delimited(tag("{"), take_till(|b| b == b'}'), cut(tag("}"))),
            quantifier_token,
        ),
        map(take(1usize), |b: &[u8]| Token::Literal(b[0])),
    ))(input)
}

fn quantifier_token(inner: &[u8]) -> Token {
    let stripped = inner
        .iter()
        .copied()
        .filter(|&b| b != b' ' && b != b'\t')
        .collect::<Vec<u8>>();
    Token::SpecificQuantifier(String::from_utf8_lossy(&stripped).into_owned())
}

/// Lazy token stream over the bytes of a pattern.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    rest: &'a [u8],
}

impl<'a> Tokenizer<'a> {
    pub fn new(pattern: &'a [u8]) -> Self {
        Self { rest: pattern }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        match token(self.rest) {
            Ok((rest, token)) => {
                self.rest = rest;
                Some(Ok(token))
            }
            Err(_) => {
                // Only two shapes can fail: a trailing escape and an
                // unclosed brace quantifier
                let error = match self.rest.first() {
                    Some(b'\\') => LexError::UnfinishedEscape,
                    _ => LexError::UnclosedQuantifier,
                };
                self.rest = &[];
                Some(Err(error))
            }
        }
    }
}

fn write_byte(f: &mut fmt::Formatter<'_>, byte: u8) -> fmt::Result {
    if byte.is_ascii_graphic() || byte == b' ' {
        write!(f, "'{}'", byte as char)
    } else {
        write!(f, "0x{byte:02x}")
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Literal(b) => {
                f.write_str("literal ")?;
                write_byte(f, *b)
            }
            Token::GroupStart => f.write_str("'('"),
            Token::GroupEnd => f.write_str("')'"),
            Token::ClassStart => f.write_str("'['"),
            Token::ClassEnd => f.write_str("']'"),
            Token::Or => f.write_str("'|'"),
            Token::Wildcard => f.write_str("'.'"),
            Token::ZeroInf => f.write_str("'*'"),
            Token::OneInf => f.write_str("'+'"),
            Token::ZeroOne => f.write_str("'?'"),
            Token::Escaped(b) => {
                f.write_str("escape ")?;
                write_byte(f, *b)
            }
            Token::Range => f.write_str("'-'"),
            Token::SpecificQuantifier(inner) => write!(f, "quantifier '{{{inner}}}'"),
        }
    }
}
