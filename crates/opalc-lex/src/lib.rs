//! opalc-lex - Lexical Analyzer
//!
//! This crate turns Opal source text into a stream of tokens. It is built
//! from four cooperating pieces, composed bottom-up:
//!
//! - [`buffer`] - a twin-segment byte buffer over any `Read` stream with a
//!   single forward cursor and one-character retraction across segment
//!   boundaries.
//! - [`keywords`] - an immutable 26-way trie mapping the reserved words to
//!   their token kinds, built once at lexer construction.
//! - [`symtab`] - an append-only interning store; every distinct lexeme
//!   gets exactly one entry, shared by all tokens and parse-tree leaves
//!   that carry it.
//! - [`lexer`] - the hand-written DFA that consumes characters through the
//!   buffer and emits line-tagged tokens, interning lexemes as it goes.
//!
//! Lexical errors (unrecognized patterns, over-long identifiers and
//! function names) are emitted inline as error-kind tokens and reported as
//! diagnostics; the lexer never aborts. The only fatal condition is an I/O
//! failure while refilling the buffer, surfaced as [`LexError`].

pub mod buffer;
pub mod keywords;
pub mod lexer;
pub mod symtab;
pub mod token;

pub use lexer::{LexError, Lexer};
pub use symtab::{NumValue, SymEntry, SymId, SymbolTable};
pub use token::{Token, TokenKind, TokenStream};
