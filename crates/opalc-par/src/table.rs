//! Parse-table construction.
//!
//! A dense (non-terminal, terminal) matrix of optional rule handles. For
//! each rule `N -> alpha`: every terminal in FIRST(alpha) gets the rule,
//! and if alpha can vanish, so does every terminal in FOLLOW(N). A cell
//! that is claimed twice is a grammar ambiguity signal; it is logged and
//! the later rule wins, which preserves the observable behavior of the
//! original table builder.

use log::warn;

use opalc_lex::TokenKind;

use crate::grammar::{Grammar, NonTerminal, RuleId};
use crate::sets::FirstFollow;

/// Two-dimensional mapping (non-terminal, token kind) -> rule.
#[derive(Debug)]
pub struct ParseTable {
    cells: Vec<Option<RuleId>>,
    /// Number of cells that were claimed more than once during build.
    conflicts: usize,
}

impl ParseTable {
    /// Derive the table from the grammar and its FIRST/FOLLOW sets.
    pub fn build(grammar: &Grammar, sets: &FirstFollow) -> Self {
        let mut table = Self {
            cells: vec![None; NonTerminal::COUNT * TokenKind::COUNT],
            conflicts: 0,
        };

        for (id, rule) in grammar.iter() {
            let first = sets.first_of_sequence(&rule.rhs);
            for terminal in first.iter().copied().filter(|t| *t != TokenKind::Eps) {
                table.set(grammar, rule.lhs, terminal, id);
            }
            if first.contains(&TokenKind::Eps) {
                for terminal in sets.follow(rule.lhs).iter().copied() {
                    table.set(grammar, rule.lhs, terminal, id);
                }
            }
        }
        table
    }

    /// Rule selected for expanding `nt` on lookahead `terminal`, if any.
    pub fn get(&self, nt: NonTerminal, terminal: TokenKind) -> Option<RuleId> {
        self.cells[Self::cell(nt, terminal)]
    }

    /// Number of conflicting claims observed while building.
    pub fn conflicts(&self) -> usize {
        self.conflicts
    }

    fn set(&mut self, grammar: &Grammar, nt: NonTerminal, terminal: TokenKind, id: RuleId) {
        let cell = Self::cell(nt, terminal);
        if let Some(existing) = self.cells[cell] {
            if existing != id {
                self.conflicts += 1;
                warn!(
                    "parse table conflict at ({}, {}): \"{}\" overwrites \"{}\"",
                    nt,
                    terminal.name(),
                    grammar.rule(id),
                    grammar.rule(existing),
                );
            }
        }
        self.cells[cell] = Some(id);
    }

    fn cell(nt: NonTerminal, terminal: TokenKind) -> usize {
        nt.index() * TokenKind::COUNT + terminal.index()
    }
}
