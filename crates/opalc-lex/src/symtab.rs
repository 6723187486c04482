//! Symbol table.
//!
//! An append-only interning store: the first sighting of a lexeme creates
//! an entry, every later sighting of the identical text reuses it. Tokens
//! and parse-tree leaves hold [`SymId`] handles into the table, so repeated
//! lexemes share storage and equality is an index comparison.
//!
//! Entries are immutable after creation. The table never removes anything;
//! it lives for one compilation and is handed to the downstream consumer
//! together with the token stream.

use rustc_hash::FxHashMap;

use opalc_util::{define_idx, IndexVec};

use crate::token::TokenKind;

define_idx! {
    /// Handle to a symbol-table entry.
    pub struct SymId;
}

/// Numeric value attached to literal entries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NumValue {
    /// Value of an integer literal.
    Int(i64),
    /// Value of a real literal.
    Real(f64),
}

/// One interned lexeme with its classification.
#[derive(Clone, Debug)]
pub struct SymEntry {
    /// The exact source text of the lexeme.
    pub lexeme: String,
    /// Token kind assigned at first sighting.
    pub kind: TokenKind,
    /// Parsed value for `TK_NUM` / `TK_RNUM` entries.
    pub value: Option<NumValue>,
}

/// Append-only interning store mapping lexemes to shared entries.
#[derive(Debug, Default)]
pub struct SymbolTable {
    entries: IndexVec<SymId, SymEntry>,
    // Hash index over the entries; replaces the linear scan the
    // append-only layout would otherwise require.
    index: FxHashMap<Box<str>, SymId>,
}

impl SymbolTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry id for `lexeme`, if it has been interned.
    pub fn lookup(&self, lexeme: &str) -> Option<SymId> {
        self.index.get(lexeme).copied()
    }

    /// Intern `lexeme`, reusing any existing entry with identical text
    /// verbatim; otherwise append a fresh entry.
    pub fn intern(&mut self, lexeme: &str, kind: TokenKind, value: Option<NumValue>) -> SymId {
        if let Some(id) = self.lookup(lexeme) {
            return id;
        }
        let id = self.entries.push(SymEntry {
            lexeme: lexeme.to_owned(),
            kind,
            value,
        });
        self.index.insert(lexeme.into(), id);
        id
    }

    /// Entry behind a handle.
    ///
    /// # Panics
    ///
    /// Panics if `id` did not come from this table.
    pub fn entry(&self, id: SymId) -> &SymEntry {
        &self.entries[id]
    }

    /// Lexeme behind a handle.
    pub fn lexeme(&self, id: SymId) -> &str {
        &self.entries[id].lexeme
    }

    /// Number of distinct entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True before the first intern.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (SymId, &SymEntry)> {
        self.entries.iter_enumerated()
    }
}
