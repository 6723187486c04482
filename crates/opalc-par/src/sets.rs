//! FIRST and FOLLOW set computation.
//!
//! Both computations iterate to fixed point; termination is guaranteed
//! because the sets only grow inside a finite universe of token kinds.
//! Sets are [`IndexSet`]s: set-valued semantics with insertion order
//! preserved, which keeps downstream output deterministic.
//!
//! FIRST sets may contain the epsilon marker. FOLLOW sets never do, and
//! the start symbol's FOLLOW is seeded with the end-of-input marker.

use indexmap::IndexSet;
use log::debug;

use opalc_lex::TokenKind;

use crate::grammar::{Grammar, GrammarSymbol, NonTerminal};

/// Computed FIRST and FOLLOW sets for one grammar.
#[derive(Debug)]
pub struct FirstFollow {
    first: Vec<IndexSet<TokenKind>>,
    follow: Vec<IndexSet<TokenKind>>,
}

impl FirstFollow {
    /// Compute both set families to fixed point.
    pub fn compute(grammar: &Grammar) -> Self {
        let first = compute_first(grammar);
        let follow = compute_follow(grammar, &first);
        debug!(
            "FIRST/FOLLOW computed for {} non-terminals over {} rules",
            NonTerminal::COUNT,
            grammar.len()
        );
        Self { first, follow }
    }

    /// FIRST set of a non-terminal.
    pub fn first(&self, nt: NonTerminal) -> &IndexSet<TokenKind> {
        &self.first[nt.index()]
    }

    /// FOLLOW set of a non-terminal.
    pub fn follow(&self, nt: NonTerminal) -> &IndexSet<TokenKind> {
        &self.follow[nt.index()]
    }

    /// FIRST of a symbol sequence: the terminals that can begin any string
    /// derived from it, plus epsilon when the whole sequence can vanish.
    /// The empty sequence yields exactly `{epsilon}`.
    pub fn first_of_sequence(&self, symbols: &[GrammarSymbol]) -> IndexSet<TokenKind> {
        let mut out = IndexSet::new();
        for symbol in symbols {
            match symbol {
                GrammarSymbol::Terminal(TokenKind::Eps) => {
                    // The explicit epsilon marker derives the empty string.
                    continue;
                }
                GrammarSymbol::Terminal(t) => {
                    out.insert(*t);
                    return out;
                }
                GrammarSymbol::NonTerminal(nt) => {
                    let first = self.first(*nt);
                    out.extend(first.iter().copied().filter(|t| *t != TokenKind::Eps));
                    if !first.contains(&TokenKind::Eps) {
                        return out;
                    }
                }
            }
        }
        out.insert(TokenKind::Eps);
        out
    }
}

fn compute_first(grammar: &Grammar) -> Vec<IndexSet<TokenKind>> {
    let mut first: Vec<IndexSet<TokenKind>> = vec![IndexSet::new(); NonTerminal::COUNT];

    let mut changed = true;
    while changed {
        changed = false;
        for (_, rule) in grammar.iter() {
            let lhs = rule.lhs.index();
            let mut all_nullable = true;
            for symbol in &rule.rhs {
                match symbol {
                    GrammarSymbol::Terminal(t) => {
                        changed |= first[lhs].insert(*t);
                        all_nullable = false;
                        break;
                    }
                    GrammarSymbol::NonTerminal(nt) => {
                        let (from, nullable) = {
                            let src = &first[nt.index()];
                            (
                                src.iter()
                                    .copied()
                                    .filter(|t| *t != TokenKind::Eps)
                                    .collect::<Vec<_>>(),
                                src.contains(&TokenKind::Eps),
                            )
                        };
                        for t in from {
                            changed |= first[lhs].insert(t);
                        }
                        if !nullable {
                            all_nullable = false;
                            break;
                        }
                    }
                }
            }
            if all_nullable {
                changed |= first[lhs].insert(TokenKind::Eps);
            }
        }
    }
    first
}

fn compute_follow(grammar: &Grammar, first: &[IndexSet<TokenKind>]) -> Vec<IndexSet<TokenKind>> {
    let mut follow: Vec<IndexSet<TokenKind>> = vec![IndexSet::new(); NonTerminal::COUNT];
    follow[grammar.start().index()].insert(TokenKind::Eof);

    // FIRST of a suffix, reusing the already-final FIRST sets.
    let first_of = |suffix: &[GrammarSymbol]| -> (Vec<TokenKind>, bool) {
        let mut out = Vec::new();
        for symbol in suffix {
            match symbol {
                GrammarSymbol::Terminal(TokenKind::Eps) => continue,
                GrammarSymbol::Terminal(t) => {
                    out.push(*t);
                    return (out, false);
                }
                GrammarSymbol::NonTerminal(nt) => {
                    let src = &first[nt.index()];
                    out.extend(src.iter().copied().filter(|t| *t != TokenKind::Eps));
                    if !src.contains(&TokenKind::Eps) {
                        return (out, false);
                    }
                }
            }
        }
        (out, true)
    };

    let mut changed = true;
    while changed {
        changed = false;
        for (_, rule) in grammar.iter() {
            for (i, symbol) in rule.rhs.iter().enumerate() {
                let nt = match symbol {
                    GrammarSymbol::NonTerminal(nt) => *nt,
                    GrammarSymbol::Terminal(_) => continue,
                };
                let (beta_first, beta_nullable) = first_of(&rule.rhs[i + 1..]);
                for t in beta_first {
                    changed |= follow[nt.index()].insert(t);
                }
                if beta_nullable {
                    let from: Vec<_> = follow[rule.lhs.index()].iter().copied().collect();
                    for t in from {
                        changed |= follow[nt.index()].insert(t);
                    }
                }
            }
        }
    }
    follow
}
