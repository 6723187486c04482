//! Predictive parsing and panic-mode error recovery.
//!
//! [`ParserTables`] owns everything derived from the grammar text: the
//! grammar itself, the FIRST/FOLLOW sets and the parse table. Each stage
//! is computed at most once; repeated calls are no-ops, so loading and
//! table construction are idempotent within one set of tables.
//!
//! [`Parser::parse`] drives a stack seeded with the start symbol against
//! the token stream. Comment tokens are invisible to it; lexical-error
//! tokens are skipped but taint the run. Every syntactic problem produces
//! one diagnostic and a local recovery:
//!
//! - terminal on top, wrong lookahead: pop, keep the lookahead;
//! - table miss: pop if the lookahead is in FOLLOW of the non-terminal,
//!   otherwise discard input until a synchronizable token appears.
//!
//! The parse always runs to completion and always returns a tree; the
//! accompanying flag says whether any error was seen.

use log::debug;

use opalc_lex::{SymbolTable, Token, TokenKind, TokenStream};
use opalc_util::Handler;

use crate::grammar::{Grammar, GrammarError, GrammarSymbol};
use crate::sets::FirstFollow;
use crate::table::ParseTable;
use crate::tree::ParseTree;

/// Grammar-derived state, built in stages and cached.
pub struct ParserTables {
    grammar: Grammar,
    sets: Option<FirstFollow>,
    table: Option<ParseTable>,
}

impl ParserTables {
    /// Load the grammar only; sets and table are computed on demand.
    pub fn load(text: &str) -> Result<Self, GrammarError> {
        Ok(Self {
            grammar: Grammar::parse(text)?,
            sets: None,
            table: None,
        })
    }

    /// Load the grammar and run every derivation stage.
    pub fn new(text: &str) -> Result<Self, GrammarError> {
        let mut tables = Self::load(text)?;
        tables.build_table();
        Ok(tables)
    }

    /// The loaded grammar.
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Compute FIRST/FOLLOW; a no-op after the first call.
    pub fn compute_sets(&mut self) -> &FirstFollow {
        let grammar = &self.grammar;
        self.sets
            .get_or_insert_with(|| FirstFollow::compute(grammar))
    }

    /// Build the parse table (computing the sets first if needed); a
    /// no-op after the first call.
    pub fn build_table(&mut self) -> &ParseTable {
        self.compute_sets();
        let grammar = &self.grammar;
        let sets = self.sets.as_ref().expect("sets just computed");
        self.table
            .get_or_insert_with(|| ParseTable::build(grammar, sets))
    }

    /// A parser over these tables, forcing any missing stage first.
    pub fn parser(&mut self) -> Parser<'_> {
        self.build_table();
        Parser {
            grammar: &self.grammar,
            sets: self.sets.as_ref().expect("sets built"),
            table: self.table.as_ref().expect("table built"),
        }
    }
}

/// Table-driven predictive parser.
pub struct Parser<'a> {
    grammar: &'a Grammar,
    sets: &'a FirstFollow,
    table: &'a ParseTable,
}

impl<'a> Parser<'a> {
    /// Parse `stream` into a tree, reporting syntax errors to `handler`.
    ///
    /// Returns the (possibly partial) parse tree and true when any
    /// lexical or syntactic error tainted the run. The symbol table is
    /// needed mutably for the synthetic `EPSILON` entry that epsilon
    /// leaves bind.
    pub fn parse(
        &self,
        stream: &TokenStream,
        symbols: &mut SymbolTable,
        handler: &Handler,
    ) -> (ParseTree, bool) {
        let start = self.grammar.start();
        let mut tree = ParseTree::new(GrammarSymbol::NonTerminal(start));
        let mut had_error = false;
        if stream.is_empty() {
            return (tree, had_error);
        }

        let tokens = stream.tokens();
        let mut pos = 0usize;
        let mut stack = vec![tree.root()];

        while let Some(&top) = stack.last() {
            pos = skip_ignored(tokens, pos, &mut had_error);
            let token = tokens[pos];

            match tree.node(top).symbol {
                GrammarSymbol::Terminal(TokenKind::Eps) => {
                    let entry = symbols.intern("EPSILON", TokenKind::Eps, None);
                    let node = tree.node_mut(top);
                    node.entry = Some(entry);
                    node.line = token.line;
                    stack.pop();
                }
                GrammarSymbol::Terminal(expected) if expected == token.kind => {
                    let node = tree.node_mut(top);
                    node.entry = Some(token.sym);
                    node.line = token.line;
                    stack.pop();
                    pos += 1;
                }
                GrammarSymbol::Terminal(expected) => {
                    had_error = true;
                    handler.error(
                        token.line,
                        format!(
                            "Expected {} but found {} \"{}\"",
                            expected.name(),
                            token.kind.name(),
                            symbols.lexeme(token.sym)
                        ),
                    );
                    // Keep the lookahead; it may match further down.
                    stack.pop();
                }
                GrammarSymbol::NonTerminal(nt) => match self.table.get(nt, token.kind) {
                    Some(rule_id) => {
                        stack.pop();
                        tree.node_mut(top).line = token.line;
                        let rule = self.grammar.rule(rule_id);
                        let children: Vec<_> = rule
                            .rhs
                            .iter()
                            .map(|&symbol| tree.add_child(top, symbol, token.line))
                            .collect();
                        stack.extend(children.into_iter().rev());
                    }
                    None => {
                        had_error = true;
                        if token.kind == TokenKind::Eof {
                            handler.error(
                                token.line,
                                format!("Unexpected end of input while expanding {}", nt),
                            );
                        } else {
                            handler.error(
                                token.line,
                                format!(
                                    "Unexpected token {} \"{}\" for non-terminal {}",
                                    token.kind.name(),
                                    symbols.lexeme(token.sym),
                                    nt
                                ),
                            );
                        }
                        if token.kind == TokenKind::Eof
                            || self.sets.follow(nt).contains(&token.kind)
                        {
                            // The production is missing; give up on it.
                            stack.pop();
                        } else {
                            // Discard input until this non-terminal can
                            // make progress again.
                            pos += 1;
                            loop {
                                pos = skip_ignored(tokens, pos, &mut had_error);
                                let t = tokens[pos];
                                if t.kind == TokenKind::Eof
                                    || self.table.get(nt, t.kind).is_some()
                                    || self.sets.follow(nt).contains(&t.kind)
                                {
                                    break;
                                }
                                pos += 1;
                            }
                        }
                    }
                },
            }
        }

        // The stack is drained; whatever input remains is also an error.
        loop {
            pos = skip_ignored(tokens, pos, &mut had_error);
            let token = tokens[pos];
            if token.kind == TokenKind::Eof {
                break;
            }
            had_error = true;
            handler.error(
                token.line,
                format!(
                    "Unexpected token {} \"{}\" after the end of the program",
                    token.kind.name(),
                    symbols.lexeme(token.sym)
                ),
            );
            pos += 1;
        }

        debug!(
            "parse finished: {} nodes, errors: {}",
            tree.len(),
            had_error
        );
        (tree, had_error)
    }
}

/// Advance over tokens the parser never sees: comments silently, lexical
/// error tokens while tainting the run. Never moves past the end-of-input
/// token.
fn skip_ignored(tokens: &[Token], mut pos: usize, had_error: &mut bool) -> usize {
    while let Some(token) = tokens.get(pos) {
        match token.kind {
            TokenKind::Comment => pos += 1,
            kind if kind.is_error() => {
                *had_error = true;
                pos += 1;
            }
            _ => break,
        }
    }
    pos.min(tokens.len() - 1)
}
