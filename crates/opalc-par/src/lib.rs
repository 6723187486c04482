//! opalc-par - Predictive Parser (Syntactic Analyzer)
//!
//! An LL(1) front half: the grammar is loaded from text at startup, FIRST
//! and FOLLOW sets are computed to fixed point, a non-terminal x terminal
//! parse table is derived from them, and a stack-driven predictive descent
//! consumes the token stream against that table.
//!
//! The pipeline through this crate:
//!
//! ```text
//!   grammar text ──▶ [Grammar]
//!                        │
//!                        ▼
//!                  [FirstFollow]  (fixed-point FIRST/FOLLOW)
//!                        │
//!                        ▼
//!                  [ParseTable]   (one rule per cell, conflicts logged)
//!                        │
//!   token stream ──▶ [Parser] ──▶ ParseTree + error flag
//! ```
//!
//! Error philosophy: the parser never aborts. A mismatched terminal pops
//! the stack without consuming input; a table miss triggers panic-mode
//! recovery synchronized on FOLLOW sets; every problem becomes one
//! diagnostic. The caller always gets a tree (possibly partial) plus a
//! boolean that says whether it is trustworthy.

pub mod grammar;
pub mod parser;
pub mod sets;
pub mod table;
pub mod tree;

pub use grammar::{Grammar, GrammarError, GrammarSymbol, NonTerminal, Rule, RuleId, DEFAULT_GRAMMAR};
pub use parser::{Parser, ParserTables};
pub use sets::FirstFollow;
pub use table::ParseTable;
pub use tree::{NodeId, ParseNode, ParseTree};
