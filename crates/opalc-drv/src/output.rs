//! Output writers: comment removal, token listing, parse-tree rows.

use std::io::{self, Write};

use opalc_lex::{NumValue, SymbolTable, TokenKind, TokenStream};
use opalc_par::{GrammarSymbol, ParseNode, ParseTree};

/// Placeholder printed in columns that do not apply to a row.
const BLANK: &str = "-----";

/// Echo `source` with every `%` comment removed, newlines preserved.
pub fn write_commentless<W: Write>(out: &mut W, source: &str) -> io::Result<()> {
    for line in source.lines() {
        let kept = match line.find('%') {
            Some(at) => &line[..at],
            None => line,
        };
        writeln!(out, "{}", kept)?;
    }
    Ok(())
}

/// Three-column token listing: line, lexeme, human-readable token name.
/// Error tokens render their category name.
pub fn write_token_listing<W: Write>(
    out: &mut W,
    stream: &TokenStream,
    symbols: &SymbolTable,
) -> io::Result<()> {
    for token in stream.iter() {
        if token.kind == TokenKind::Eof {
            break;
        }
        writeln!(
            out,
            "{:<8} {:<28} {}",
            token.line,
            symbols.lexeme(token.sym),
            token.kind
        )?;
    }
    Ok(())
}

/// One row per node in left-root-rest order.
///
/// Columns: lexeme (or `-----` for non-terminals), line, token name (or
/// `-----`), numeric value for integer/real leaves, parent non-terminal
/// (or `ROOT`), `YES`/`NO` leaf flag, node symbol.
pub fn write_parse_tree<W: Write>(
    out: &mut W,
    tree: &ParseTree,
    symbols: &SymbolTable,
) -> io::Result<()> {
    let mut result = Ok(());
    tree.visit_left_root_rest(&mut |node, parent| {
        if result.is_err() {
            return;
        }
        result = write_node_row(out, node, parent, symbols);
    });
    result
}

fn write_node_row<W: Write>(
    out: &mut W,
    node: &ParseNode,
    parent: Option<&ParseNode>,
    symbols: &SymbolTable,
) -> io::Result<()> {
    let (lexeme, token_name) = match node.symbol {
        GrammarSymbol::Terminal(kind) => {
            let lexeme = node
                .entry
                .map(|sym| symbols.lexeme(sym).to_owned())
                .unwrap_or_else(|| BLANK.to_owned());
            (lexeme, kind.name().to_owned())
        }
        GrammarSymbol::NonTerminal(_) => (BLANK.to_owned(), BLANK.to_owned()),
    };

    let value = match node_value(node, symbols) {
        Some(NumValue::Int(v)) => format!("{}", v),
        Some(NumValue::Real(v)) => format!("{:.2}", v),
        None => BLANK.to_owned(),
    };

    let parent_name = match parent {
        Some(parent) => format!("{}", parent.symbol),
        None => "ROOT".to_owned(),
    };

    let leaf = if node.is_leaf() { "YES" } else { "NO" };

    writeln!(
        out,
        "{:<28} {:<6} {:<16} {:<20} {:<28} {:<4} {}",
        lexeme, node.line, token_name, value, parent_name, leaf, node.symbol
    )
}

/// Numeric value for integer and real literal leaves only.
fn node_value(node: &ParseNode, symbols: &SymbolTable) -> Option<NumValue> {
    let entry = node.entry?;
    match node.symbol {
        GrammarSymbol::Terminal(TokenKind::Num) | GrammarSymbol::Terminal(TokenKind::Rnum) => {
            symbols.entry(entry).value
        }
        _ => None,
    }
}
