//! opalc-drv - Compiler Driver
//!
//! The driver is the entry point and orchestrator of the front end. It
//! parses the command line, verifies the input file opens, loads the
//! grammar (bundled or overridden), and then serves an interactive menu:
//!
//! ```text
//!   0 : exit
//!   1 : remove comments and echo the source
//!   2 : lex and print the token stream
//!   3 : lex + parse, write the parse tree to the output file
//!   4 : time a full lex + parse run
//! ```
//!
//! Diagnostics collected by the phases are rendered to stderr as
//! `Line <n> Error: ...` lines. Fatal conditions (unopenable files, a
//! malformed grammar) abort with a nonzero exit code; everything else is
//! recovered and reported.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser as ClapParser;
use log::{debug, info};

use opalc_lex::{Lexer, SymbolTable, TokenStream};
use opalc_par::{ParseTree, ParserTables, DEFAULT_GRAMMAR};
use opalc_util::Handler;

pub mod output;

/// Command-line configuration.
#[derive(ClapParser, Debug)]
#[command(name = "opalc", version, about = "Opal compiler front end")]
pub struct Config {
    /// Source file to analyze.
    pub input: PathBuf,

    /// File the parse tree is written to (menu option 3).
    pub output: PathBuf,

    /// Grammar file overriding the bundled grammar.
    #[arg(long)]
    pub grammar: Option<PathBuf>,

    /// Verbose logging.
    #[arg(short, long)]
    pub verbose: bool,
}

/// One driver invocation: configuration plus the grammar-derived tables.
pub struct Session {
    config: Config,
    tables: Option<ParserTables>,
}

impl Session {
    /// Create a session; nothing is loaded until [`Session::run`].
    pub fn new(config: Config) -> Self {
        Self {
            config,
            tables: None,
        }
    }

    /// Serve the interactive menu until exit or end of stdin.
    pub fn run(&mut self) -> anyhow::Result<()> {
        // Fail fast on an unopenable input instead of inside a menu item.
        File::open(&self.config.input).with_context(|| {
            format!("cannot open input file {}", self.config.input.display())
        })?;

        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        loop {
            print_menu();
            let line = match lines.next() {
                Some(line) => line.context("cannot read menu choice")?,
                None => break,
            };
            match line.trim() {
                "" => continue,
                "0" => break,
                "1" => self.remove_comments()?,
                "2" => self.print_token_stream()?,
                "3" => self.parse_and_emit_tree()?,
                "4" => self.time_full_run()?,
                other => println!("Unknown option \"{}\"", other),
            }
        }
        Ok(())
    }

    /// Menu 1: echo the source with `%` comments stripped.
    fn remove_comments(&self) -> anyhow::Result<()> {
        let source = std::fs::read_to_string(&self.config.input).with_context(|| {
            format!("cannot read input file {}", self.config.input.display())
        })?;
        let mut stdout = io::stdout().lock();
        output::write_commentless(&mut stdout, &source)?;
        Ok(())
    }

    /// Menu 2: lex the source and print the three-column token listing.
    fn print_token_stream(&self) -> anyhow::Result<()> {
        let handler = Handler::new();
        let (stream, symbols) = self.lex(&handler)?;
        let mut stdout = io::stdout().lock();
        output::write_token_listing(&mut stdout, &stream, &symbols)?;
        drop(stdout);
        report_diagnostics(&handler);
        Ok(())
    }

    /// Menu 3: parse and write the tree to the output file.
    fn parse_and_emit_tree(&mut self) -> anyhow::Result<()> {
        let handler = Handler::new();
        let (tree, had_error, symbols) = self.compile(&handler)?;

        let mut file = File::create(&self.config.output).with_context(|| {
            format!("cannot create output file {}", self.config.output.display())
        })?;
        output::write_parse_tree(&mut file, &tree, &symbols)?;
        info!("parse tree written to {}", self.config.output.display());

        report_diagnostics(&handler);
        if had_error {
            println!("Errors were found; the parse tree is partial.");
        } else {
            println!("Input source code is syntactically correct.");
        }
        Ok(())
    }

    /// Menu 4: time one full lex + parse run.
    fn time_full_run(&mut self) -> anyhow::Result<()> {
        let handler = Handler::new();
        let started = Instant::now();
        let (tree, _, _) = self.compile(&handler)?;
        let elapsed = started.elapsed();
        println!(
            "Lexing and parsing took {:.6} seconds ({} tree nodes)",
            elapsed.as_secs_f64(),
            tree.len()
        );
        Ok(())
    }

    /// Lex the configured input from scratch.
    fn lex(&self, handler: &Handler) -> anyhow::Result<(TokenStream, SymbolTable)> {
        let file = File::open(&self.config.input).with_context(|| {
            format!("cannot open input file {}", self.config.input.display())
        })?;
        let lexer = Lexer::new(BufReader::new(file), handler)?;
        Ok(lexer.tokenize()?)
    }

    /// Lex and parse the configured input.
    fn compile(&mut self, handler: &Handler) -> anyhow::Result<(ParseTree, bool, SymbolTable)> {
        let (stream, mut symbols) = self.lex(handler)?;
        let tables = self.tables()?;
        let (tree, had_error) = tables.parser().parse(&stream, &mut symbols, handler);
        Ok((tree, had_error, symbols))
    }

    /// Grammar tables, loaded once per session.
    fn tables(&mut self) -> anyhow::Result<&mut ParserTables> {
        if self.tables.is_none() {
            let text = match &self.config.grammar {
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("cannot open grammar file {}", path.display()))?,
                None => DEFAULT_GRAMMAR.to_owned(),
            };
            debug!("loading grammar ({} bytes)", text.len());
            self.tables = Some(ParserTables::new(&text)?);
        }
        Ok(self.tables.as_mut().expect("tables just loaded"))
    }
}

fn print_menu() {
    println!();
    println!("0 : exit");
    println!("1 : remove comments and echo");
    println!("2 : lex and print the token stream");
    println!("3 : parse and write the parse tree");
    println!("4 : time a full run");
    print!("> ");
    let _ = io::stdout().flush();
}

fn report_diagnostics(handler: &Handler) {
    for diagnostic in handler.diagnostics() {
        eprintln!("{}", diagnostic);
    }
}
