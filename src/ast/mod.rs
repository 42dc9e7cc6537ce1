//! # Pattern syntax trees
//! This module contains the syntax tree produced by the [parser](crate::parser)
//! and its translation to a [Nfa] by Thompson construction. The tree is a
//! closed sum over the pattern forms: byte literals, escapes, byte ranges,
//! character classes, the four quantifiers, concatenation, alternation and
//! grouping. Equality is structural, which the parser relies on being able to
//! collapse single-child concatenations and alternations without changing
//! meaning.
//!
//! A tree can be rendered back to pattern text with [Ast::to_pattern], and
//! parsing that rendition yields a structurally equal tree. Patterns are byte
//! oriented throughout: a multi-byte UTF-8 character in a pattern is a
//! concatenation of its bytes, and ranges span byte values `0..=255`.
//!
//! ```
//! use refa::parser;
//!
//! let ast = parser::pattern("(a|b)c{2,3}").unwrap();
//! let nfa = ast.to_nfa();
//! assert!(nfa.accepts("acc"));
//! assert!(!nfa.accepts("ac"));
//! assert_eq!(parser::pattern(&ast.to_pattern()).unwrap(), ast);
//! ```

use crate::nfa::{Nfa, NfaState};
use std::iter;
use std::ops::RangeInclusive;

/// One end of a byte range. The wildcard sentinel extends the range to the
/// corresponding extreme of the byte alphabet, so a range that is wildcard on
/// both ends covers all 256 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeEnd {
    Byte(u8),
    Wildcard,
}

/// An inclusive byte range. `start > end` is allowed and matches no byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: RangeEnd,
    pub end: RangeEnd,
}

impl ByteRange {
    /// The full byte range, produced by a bare `.` in a pattern.
    pub const WILDCARD: ByteRange = ByteRange {
        start: RangeEnd::Wildcard,
        end: RangeEnd::Wildcard,
    };

    pub fn new(start: RangeEnd, end: RangeEnd) -> Self {
        Self { start, end }
    }

    /// The bytes this range covers, in ascending order.
    pub fn bytes(self) -> RangeInclusive<u8> {
        let lo = match self.start {
            RangeEnd::Byte(b) => b,
            RangeEnd::Wildcard => u8::MIN,
        };
        let hi = match self.end {
            RangeEnd::Byte(b) => b,
            RangeEnd::Wildcard => u8::MAX,
        };
        lo..=hi
    }
}

/// A node of the pattern syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ast {
    /// A single byte matching itself
    Literal(u8),
    /// An escaped byte, kept unexpanded until NFA construction: `\d`, `\w`
    /// and `\s` become their ASCII shorthand classes there, any other byte
    /// matches itself
    Escaped(u8),
    /// An inclusive byte range; `.` parses to the all-wildcard range
    Range(ByteRange),
    /// A character class: the union of one or more ranges
    Class(Vec<ByteRange>),
    /// `x*`
    ZeroOrMore(Box<Ast>),
    /// `x+`
    OneOrMore(Box<Ast>),
    /// `x?`
    ZeroOrOne(Box<Ast>),
    /// `x{min,max}`; a missing max means unbounded
    Counted {
        node: Box<Ast>,
        min: u32,
        max: Option<u32>,
    },
    /// Two or more nodes in sequence
    Concatenation(Vec<Ast>),
    /// Two or more alternative branches
    Alternation(Vec<Ast>),
    /// A parenthesized subtree; grouping only, no capture identity
    Group(Box<Ast>),
}

impl Ast {
    /// Renders this tree back to pattern text. The rendition is canonical in
    /// the sense that parsing it again produces a tree equal to this one (for
    /// trees built by the parser). Literal bytes that do not form valid UTF-8
    /// are replaced when rendering to `String`.
    pub fn to_pattern(&self) -> String {
        let mut buf = Vec::new();
        self.write_pattern(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn write_pattern(&self, buf: &mut Vec<u8>) {
        match self {
            Ast::Literal(b) => {
                // A bare '-' outside a class parses back to a literal, so it
                // needs no escape; other metabytes do
                if *b != b'-' && is_special(*b) {
                    buf.push(b'\\');
                }
                buf.push(*b);
            }
            Ast::Escaped(b) => {
                buf.push(b'\\');
                buf.push(*b);
            }
            Ast::Range(range) if *range == ByteRange::WILDCARD => buf.push(b'.'),
            Ast::Range(range) => {
                buf.push(b'[');
                write_range(*range, buf);
                buf.push(b']');
            }
            Ast::Class(ranges) => {
                buf.push(b'[');
                for range in ranges {
                    write_range(*range, buf);
                }
                buf.push(b']');
            }
            Ast::ZeroOrMore(node) => {
                node.write_pattern(buf);
                buf.push(b'*');
            }
            Ast::OneOrMore(node) => {
                node.write_pattern(buf);
                buf.push(b'+');
            }
            Ast::ZeroOrOne(node) => {
                node.write_pattern(buf);
                buf.push(b'?');
            }
            Ast::Counted { node, min, max } => {
                node.write_pattern(buf);
                match max {
                    Some(max) => buf.extend_from_slice(format!("{{{min},{max}}}").as_bytes()),
                    None => buf.extend_from_slice(format!("{{{min},}}").as_bytes()),
                }
            }
            Ast::Concatenation(nodes) => {
                for node in nodes {
                    node.write_pattern(buf);
                }
            }
            Ast::Alternation(nodes) => {
                let mut nodes = nodes.iter();
                if let Some(first) = nodes.next() {
                    first.write_pattern(buf);
                    for node in nodes {
                        buf.push(b'|');
                        node.write_pattern(buf);
                    }
                }
            }
            Ast::Group(node) => {
                buf.push(b'(');
                node.write_pattern(buf);
                buf.push(b')');
            }
        }
    }

    /// Translates this tree to a NFA by Thompson construction. Each node
    /// becomes a fragment with an entry state supplied by its parent and an
    /// exit state of its own; the root fragment's exit becomes the single
    /// accepting state.
    ///
    /// The resulting NFA can be used for matching directly via
    /// [Nfa::accepts], but matching is linear only after converting it to a
    /// DFA with [Nfa::to_dfa].
    pub fn to_nfa(&self) -> Nfa {
        let mut builder = NfaBuilder::default();
        let entry = builder.state();
        let exit = builder.node(self, entry);
        builder.states[exit].accepting = true;
        Nfa {
            states: builder.states,
            initial_state: entry,
        }
    }
}

fn write_range(range: ByteRange, buf: &mut Vec<u8>) {
    match (range.start, range.end) {
        (RangeEnd::Byte(start), RangeEnd::Byte(end)) if start == end => {
            write_class_byte(start, buf)
        }
        (start, end) => {
            write_range_end(start, buf);
            buf.push(b'-');
            write_range_end(end, buf);
        }
    }
}

fn write_range_end(end: RangeEnd, buf: &mut Vec<u8>) {
    match end {
        RangeEnd::Byte(b) => write_class_byte(b, buf),
        RangeEnd::Wildcard => buf.push(b'.'),
    }
}

fn write_class_byte(byte: u8, buf: &mut Vec<u8>) {
    if is_special(byte) {
        buf.push(b'\\');
    }
    buf.push(byte);
}

fn is_special(byte: u8) -> bool {
    matches!(
        byte,
        b'(' | b')' | b'[' | b']' | b'|' | b'*' | b'+' | b'?' | b'.' | b'-' | b'{' | b'\\'
    )
}

/// Arena the Thompson construction allocates into. States are indices, so
/// the loop constructs can form cycles without any ownership cycles.
#[derive(Debug, Default)]
struct NfaBuilder {
    states: Vec<NfaState>,
}

impl NfaBuilder {
    fn state(&mut self) -> usize {
        self.states.push(NfaState::default());
        self.states.len() - 1
    }

    fn byte(&mut self, from: usize, byte: u8, to: usize) {
        self.states[from].transitions.entry(byte).or_default().push(to);
    }

    fn byte_range(&mut self, from: usize, range: ByteRange, to: usize) {
        for byte in range.bytes() {
            self.byte(from, byte, to);
        }
    }

    fn epsilon(&mut self, from: usize, to: usize) {
        self.states[from].epsilon_transitions.push(to);
    }

    /// Builds the fragment for `node` starting at `entry` and returns the
    /// fragment's exit state.
    fn node(&mut self, node: &Ast, entry: usize) -> usize {
        match node {
            Ast::Literal(b) => {
                let exit = self.state();
                self.byte(entry, *b, exit);
                exit
            }
            Ast::Escaped(b) => {
                let exit = self.state();
                for byte in escape_bytes(*b) {
                    self.byte(entry, byte, exit);
                }
                exit
            }
            Ast::Range(range) => {
                let exit = self.state();
                self.byte_range(entry, *range, exit);
                exit
            }
            Ast::Class(ranges) => {
                let exit = self.state();
                for range in ranges {
                    let branch_exit = self.state();
                    self.byte_range(entry, *range, branch_exit);
                    self.epsilon(branch_exit, exit);
                }
                exit
            }
            Ast::Concatenation(nodes) => {
                let mut current = entry;
                for node in nodes {
                    current = self.node(node, current);
                }
                current
            }
            Ast::Alternation(nodes) => {
                // Branches share the entry state directly; their exits are
                // ε-linked to a shared exit
                let exit = self.state();
                for node in nodes {
                    let branch_exit = self.node(node, entry);
                    self.epsilon(branch_exit, exit);
                }
                exit
            }
            Ast::ZeroOrMore(node) => {
                let repeat = self.state();
                let exit = self.state();
                self.epsilon(entry, repeat);
                self.epsilon(repeat, exit);
                let end = self.node(node, repeat);
                self.epsilon(end, repeat);
                exit
            }
            Ast::OneOrMore(node) => {
                let repeat = self.state();
                self.epsilon(entry, repeat);
                let end = self.node(node, repeat);
                self.epsilon(end, repeat);
                let exit = self.state();
                self.epsilon(end, exit);
                exit
            }
            Ast::ZeroOrOne(node) => {
                let exit = self.state();
                self.epsilon(entry, exit);
                let end = self.node(node, entry);
                self.epsilon(end, exit);
                exit
            }
            Ast::Counted { node, min, max } => {
                let mut current = entry;
                for _ in 0..*min {
                    current = self.node(node, current);
                }
                let exit = self.state();
                match max {
                    None => {
                        // min mandatory copies followed by a zero-or-more
                        // loop. The loop state must be fresh: looping back to
                        // `current` would also re-enter sibling alternation
                        // branches sharing it
                        let repeat = self.state();
                        self.epsilon(current, repeat);
                        self.epsilon(repeat, exit);
                        let end = self.node(node, repeat);
                        self.epsilon(end, repeat);
                    }
                    Some(max) => {
                        for _ in *min..*max {
                            self.epsilon(current, exit);
                            current = self.node(node, current);
                        }
                        self.epsilon(current, exit);
                    }
                }
                exit
            }
            Ast::Group(node) => self.node(node, entry),
        }
    }
}

/// The bytes an escaped byte stands for: the ASCII shorthand classes for
/// `\d`, `\w` and `\s`, and the byte itself for everything else.
fn escape_bytes(byte: u8) -> Vec<u8> {
    match byte {
        b'd' => (b'0'..=b'9').collect(),
        b'w' => (b'a'..=b'z')
            .chain(b'A'..=b'Z')
            .chain(b'0'..=b'9')
            .chain(iter::once(b'_'))
            .collect(),
        b's' => vec![b' ', b'\t', b'\n', b'\r', 0x0c, 0x0b],
        other => vec![other],
    }
}
