//!# refa
//!
//! `refa` is a Rust library that compiles regular expressions to deterministic
//! finite automata (DFAs) and matches byte inputs against them with
//! full-match semantics: an input matches if and only if the whole input is
//! described by the pattern.
//!
//! ## Usage
//!
//! ```rust
//! fn main() {
//!     let dfa = refa::compile("a(b|c)*d").unwrap();
//!     assert!(dfa.accepts("ad"));
//!     assert!(dfa.accepts("abccbd"));
//!     assert!(!dfa.accepts("abccb"));
//!
//!     // Compilation errors name the offending token
//!     let err = refa::compile("a{2,1}").unwrap_err();
//!     assert_eq!(
//!         err.to_string(),
//!         "quantifier {2,1} has minimum greater than maximum"
//!     );
//! }
//! ```
//!
//! A compiled [Dfa](dfa::Dfa) is immutable and can be shared between any
//! number of threads; matching performs no writes and no allocation.
//!
//! ## Syntax
//!
//! Patterns are byte-oriented: literals, ranges and the wildcard all work on
//! 8-bit bytes, and a multi-byte UTF-8 character is simply a sequence of
//! byte literals. The supported forms:
//!
//! * `a`: a literal byte; `\(` escapes a metacharacter to its literal byte
//! * `.`: any byte (all 256, including newline)
//! * `[a-z0]`, `[\]-]`: a character class, the union of inclusive byte
//!   ranges and single bytes; an escaped byte in a class is always the raw
//!   byte
//! * `\d`, `\w`, `\s`: the ASCII digit, word and whitespace classes
//! * `xy` for concatenation, `x|y` for alternation, `(x)` for grouping
//! * `x*`, `x+`, `x?`: zero or more, one or more, zero or one
//! * `x{2,4}`, `x{2,}`, `x{,4}`: counted repetition (see
//!   [parser] for the exact field rules)
//!
//! There are no anchors: matching is anchored at both ends by construction.
//! Groups do not capture, and there is no substring search.
//!
//! ## Pipeline
//!
//! Compilation runs every stage of the classical textbook pipeline, each
//! stage consuming the previous stage's output:
//!
//! 1. [Tokenization](parser::token) of the pattern bytes into a lazy token
//!    stream
//! 2. [Parsing](parser::pattern) the tokens into a syntax tree ([ast::Ast])
//! 3. [Thompson construction](ast::Ast::to_nfa) of an ε-NFA ([nfa::Nfa])
//! 4. [Subset construction](nfa::Nfa::to_dfa) of the final [dfa::Dfa]
//!
//! The intermediate stages are public: parse a pattern once and inspect or
//! print the tree, match directly on the NFA, or step an automaton manually
//! through its evaluator ([nfa::NfaEvaluator], [dfa::DfaEvaluator]).

pub mod ast;
pub mod dfa;
pub mod nfa;
pub mod parser;

use dfa::Dfa;
use parser::ParseError;

/// Compiles a pattern down to a [Dfa]. This is shorthand for running the
/// whole pipeline: [parser::pattern], [ast::Ast::to_nfa],
/// [nfa::Nfa::to_dfa].
///
/// All errors are raised here; matching itself cannot fail.
pub fn compile(pattern: &str) -> Result<Dfa, ParseError> {
    Ok(parser::pattern(pattern)?.to_nfa().to_dfa())
}
