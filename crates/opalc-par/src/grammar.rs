//! Grammar model and loader.
//!
//! A grammar is a flat list of rules, one per line of the grammar file.
//! The first whitespace-separated field of a line is the left-hand
//! non-terminal in angle brackets; every following field is either another
//! angle-bracketed non-terminal or a bare terminal name spelled without its
//! `TK_` prefix. The empty production is written as a right-hand side of
//! exactly `EPS`.
//!
//! Every referenced name must resolve against the closed [`NonTerminal`]
//! and token-kind enumerations; anything else is a [`GrammarError`], which
//! is fatal (unlike lexical and syntactic errors, a broken grammar leaves
//! nothing to recover into).

use thiserror::Error;

use opalc_lex::TokenKind;
use opalc_util::{define_idx, IndexVec};

/// The bundled Opal grammar.
pub const DEFAULT_GRAMMAR: &str = include_str!("../grammar.txt");

/// Closed enumeration of the grammatical categories of the language.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NonTerminal {
    Program,
    MainFunction,
    OtherFunctions,
    Function,
    InputPar,
    OutputPar,
    ParameterList,
    DataType,
    PrimitiveDatatype,
    ConstructedDatatype,
    RemainingList,
    Stmts,
    TypeDefinitions,
    ActualOrRedefined,
    TypeDefinition,
    FieldDefinitions,
    FieldDefinition,
    FieldType,
    MoreFields,
    Declarations,
    Declaration,
    GlobalOrNot,
    OtherStmts,
    Stmt,
    AssignmentStmt,
    SingleOrRecId,
    OptionSingleConstructed,
    OneExpansion,
    MoreExpansions,
    FunCallStmt,
    OutputParameters,
    InputParameters,
    IterativeStmt,
    ConditionalStmt,
    ElsePart,
    IoStmt,
    ArithmeticExpression,
    ExpPrime,
    Term,
    TermPrime,
    Factor,
    HighPrecedenceOperators,
    LowPrecedenceOperators,
    BooleanExpression,
    Var,
    LogicalOp,
    RelationalOp,
    ReturnStmt,
    OptionalReturn,
    IdList,
    MoreIds,
    DefinetypeStmt,
    NewTypeClass,
}

impl NonTerminal {
    /// All non-terminals, in declaration order.
    pub const ALL: [NonTerminal; 53] = [
        NonTerminal::Program,
        NonTerminal::MainFunction,
        NonTerminal::OtherFunctions,
        NonTerminal::Function,
        NonTerminal::InputPar,
        NonTerminal::OutputPar,
        NonTerminal::ParameterList,
        NonTerminal::DataType,
        NonTerminal::PrimitiveDatatype,
        NonTerminal::ConstructedDatatype,
        NonTerminal::RemainingList,
        NonTerminal::Stmts,
        NonTerminal::TypeDefinitions,
        NonTerminal::ActualOrRedefined,
        NonTerminal::TypeDefinition,
        NonTerminal::FieldDefinitions,
        NonTerminal::FieldDefinition,
        NonTerminal::FieldType,
        NonTerminal::MoreFields,
        NonTerminal::Declarations,
        NonTerminal::Declaration,
        NonTerminal::GlobalOrNot,
        NonTerminal::OtherStmts,
        NonTerminal::Stmt,
        NonTerminal::AssignmentStmt,
        NonTerminal::SingleOrRecId,
        NonTerminal::OptionSingleConstructed,
        NonTerminal::OneExpansion,
        NonTerminal::MoreExpansions,
        NonTerminal::FunCallStmt,
        NonTerminal::OutputParameters,
        NonTerminal::InputParameters,
        NonTerminal::IterativeStmt,
        NonTerminal::ConditionalStmt,
        NonTerminal::ElsePart,
        NonTerminal::IoStmt,
        NonTerminal::ArithmeticExpression,
        NonTerminal::ExpPrime,
        NonTerminal::Term,
        NonTerminal::TermPrime,
        NonTerminal::Factor,
        NonTerminal::HighPrecedenceOperators,
        NonTerminal::LowPrecedenceOperators,
        NonTerminal::BooleanExpression,
        NonTerminal::Var,
        NonTerminal::LogicalOp,
        NonTerminal::RelationalOp,
        NonTerminal::ReturnStmt,
        NonTerminal::OptionalReturn,
        NonTerminal::IdList,
        NonTerminal::MoreIds,
        NonTerminal::DefinetypeStmt,
        NonTerminal::NewTypeClass,
    ];

    /// Number of non-terminals. Parse-table rows are indexed by this.
    pub const COUNT: usize = Self::ALL.len();

    /// Row index for parse-table storage.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The spelling used between angle brackets in grammar files.
    pub fn name(self) -> &'static str {
        match self {
            NonTerminal::Program => "program",
            NonTerminal::MainFunction => "mainFunction",
            NonTerminal::OtherFunctions => "otherFunctions",
            NonTerminal::Function => "function",
            NonTerminal::InputPar => "input_par",
            NonTerminal::OutputPar => "output_par",
            NonTerminal::ParameterList => "parameter_list",
            NonTerminal::DataType => "dataType",
            NonTerminal::PrimitiveDatatype => "primitiveDatatype",
            NonTerminal::ConstructedDatatype => "constructedDatatype",
            NonTerminal::RemainingList => "remaining_list",
            NonTerminal::Stmts => "stmts",
            NonTerminal::TypeDefinitions => "typeDefinitions",
            NonTerminal::ActualOrRedefined => "actualOrRedefined",
            NonTerminal::TypeDefinition => "typeDefinition",
            NonTerminal::FieldDefinitions => "fieldDefinitions",
            NonTerminal::FieldDefinition => "fieldDefinition",
            NonTerminal::FieldType => "fieldType",
            NonTerminal::MoreFields => "moreFields",
            NonTerminal::Declarations => "declarations",
            NonTerminal::Declaration => "declaration",
            NonTerminal::GlobalOrNot => "global_or_not",
            NonTerminal::OtherStmts => "otherStmts",
            NonTerminal::Stmt => "stmt",
            NonTerminal::AssignmentStmt => "assignmentStmt",
            NonTerminal::SingleOrRecId => "singleOrRecId",
            NonTerminal::OptionSingleConstructed => "option_single_constructed",
            NonTerminal::OneExpansion => "oneExpansion",
            NonTerminal::MoreExpansions => "moreExpansions",
            NonTerminal::FunCallStmt => "funCallStmt",
            NonTerminal::OutputParameters => "outputParameters",
            NonTerminal::InputParameters => "inputParameters",
            NonTerminal::IterativeStmt => "iterativeStmt",
            NonTerminal::ConditionalStmt => "conditionalStmt",
            NonTerminal::ElsePart => "elsePart",
            NonTerminal::IoStmt => "ioStmt",
            NonTerminal::ArithmeticExpression => "arithmeticExpression",
            NonTerminal::ExpPrime => "expPrime",
            NonTerminal::Term => "term",
            NonTerminal::TermPrime => "termPrime",
            NonTerminal::Factor => "factor",
            NonTerminal::HighPrecedenceOperators => "highPrecedenceOperators",
            NonTerminal::LowPrecedenceOperators => "lowPrecedenceOperators",
            NonTerminal::BooleanExpression => "booleanExpression",
            NonTerminal::Var => "var",
            NonTerminal::LogicalOp => "logicalOp",
            NonTerminal::RelationalOp => "relationalOp",
            NonTerminal::ReturnStmt => "returnStmt",
            NonTerminal::OptionalReturn => "optionalReturn",
            NonTerminal::IdList => "idList",
            NonTerminal::MoreIds => "more_ids",
            NonTerminal::DefinetypeStmt => "definetypestmt",
            NonTerminal::NewTypeClass => "newTypeClass",
        }
    }

    /// Resolve a grammar-file spelling; `None` is the not-found sentinel.
    pub fn from_name(name: &str) -> Option<NonTerminal> {
        Self::ALL.iter().copied().find(|nt| nt.name() == name)
    }
}

impl std::fmt::Display for NonTerminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}>", self.name())
    }
}

/// Either side of the terminal/non-terminal divide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrammarSymbol {
    NonTerminal(NonTerminal),
    Terminal(TokenKind),
}

impl std::fmt::Display for GrammarSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrammarSymbol::NonTerminal(nt) => write!(f, "{}", nt),
            GrammarSymbol::Terminal(t) => write!(f, "{}", t.name()),
        }
    }
}

define_idx! {
    /// Handle to a grammar rule.
    pub struct RuleId;
}

/// One production: a non-terminal and the ordered symbols it expands to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule {
    pub lhs: NonTerminal,
    pub rhs: Vec<GrammarSymbol>,
}

impl Rule {
    /// True for the empty production, whose right-hand side is exactly the
    /// epsilon marker.
    pub fn is_epsilon(&self) -> bool {
        self.rhs == [GrammarSymbol::Terminal(TokenKind::Eps)]
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ->", self.lhs)?;
        for sym in &self.rhs {
            write!(f, " {}", sym)?;
        }
        Ok(())
    }
}

/// Failure to resolve the grammar text. Fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GrammarError {
    /// A rule head or right-hand symbol names no known non-terminal.
    #[error("grammar line {line}: unknown non-terminal <{name}>")]
    UnknownNonTerminal { line: usize, name: String },

    /// A bare right-hand name resolves to no token kind.
    #[error("grammar line {line}: unknown terminal {name}")]
    UnknownTerminal { line: usize, name: String },

    /// A rule head is not written in angle brackets.
    #[error("grammar line {line}: left-hand side {name} is not of the form <name>")]
    MalformedHead { line: usize, name: String },

    /// A rule has a head but nothing after it.
    #[error("grammar line {line}: rule for <{lhs}> has an empty right-hand side")]
    EmptyRule { line: usize, lhs: String },
}

/// The loaded grammar: rules in file order.
#[derive(Debug)]
pub struct Grammar {
    rules: IndexVec<RuleId, Rule>,
    start: NonTerminal,
}

impl Grammar {
    /// Parse grammar text, validating that every referenced name resolves.
    ///
    /// The start symbol is the left-hand side of the first rule.
    pub fn parse(text: &str) -> Result<Self, GrammarError> {
        let mut rules: IndexVec<RuleId, Rule> = IndexVec::new();
        for (i, raw_line) in text.lines().enumerate() {
            let line = i + 1;
            let mut fields = raw_line.split_whitespace();
            let head = match fields.next() {
                Some(head) => head,
                None => continue,
            };
            let lhs = parse_non_terminal(head, line)?;

            let mut rhs = Vec::new();
            for field in fields {
                rhs.push(parse_symbol(field, line)?);
            }
            if rhs.is_empty() {
                return Err(GrammarError::EmptyRule {
                    line,
                    lhs: lhs.name().to_owned(),
                });
            }
            rules.push(Rule { lhs, rhs });
        }

        let start = match rules.get(RuleId(0)) {
            Some(rule) => rule.lhs,
            None => NonTerminal::Program,
        };
        Ok(Self { rules, start })
    }

    /// Build a grammar directly from rules; used by tests that exercise
    /// set computation on small hand-made grammars.
    pub fn from_rules(rules: Vec<Rule>) -> Self {
        let start = rules.first().map(|r| r.lhs).unwrap_or(NonTerminal::Program);
        let mut store = IndexVec::new();
        for rule in rules {
            store.push(rule);
        }
        Self {
            rules: store,
            start,
        }
    }

    /// The start symbol (head of the first rule).
    pub fn start(&self) -> NonTerminal {
        self.start
    }

    /// Rule behind a handle.
    pub fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id]
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True for a grammar with no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate `(id, rule)` pairs in file order.
    pub fn iter(&self) -> impl Iterator<Item = (RuleId, &Rule)> {
        self.rules.iter_enumerated()
    }
}

fn parse_non_terminal(field: &str, line: usize) -> Result<NonTerminal, GrammarError> {
    let name = field
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
        .ok_or_else(|| GrammarError::MalformedHead {
            line,
            name: field.to_owned(),
        })?;
    NonTerminal::from_name(name).ok_or_else(|| GrammarError::UnknownNonTerminal {
        line,
        name: name.to_owned(),
    })
}

fn parse_symbol(field: &str, line: usize) -> Result<GrammarSymbol, GrammarError> {
    if field.starts_with('<') {
        return Ok(GrammarSymbol::NonTerminal(parse_non_terminal(field, line)?));
    }
    TokenKind::from_grammar_name(field)
        .map(GrammarSymbol::Terminal)
        .ok_or_else(|| GrammarError::UnknownTerminal {
            line,
            name: field.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_terminal_names_round_trip() {
        for nt in NonTerminal::ALL {
            assert_eq!(NonTerminal::from_name(nt.name()), Some(nt));
        }
        assert_eq!(NonTerminal::from_name("nope"), None);
    }

    #[test]
    fn test_parse_single_rule() {
        let grammar = Grammar::parse("<mainFunction> MAIN <stmts> END").unwrap();
        assert_eq!(grammar.len(), 1);
        assert_eq!(grammar.start(), NonTerminal::MainFunction);
        let rule = grammar.rule(RuleId(0));
        assert_eq!(rule.lhs, NonTerminal::MainFunction);
        assert_eq!(
            rule.rhs,
            vec![
                GrammarSymbol::Terminal(TokenKind::Main),
                GrammarSymbol::NonTerminal(NonTerminal::Stmts),
                GrammarSymbol::Terminal(TokenKind::End),
            ]
        );
    }

    #[test]
    fn test_epsilon_rule() {
        let grammar = Grammar::parse("<otherFunctions> EPS").unwrap();
        assert!(grammar.rule(RuleId(0)).is_epsilon());
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let grammar = Grammar::parse("<otherFunctions> EPS\n\n<optionalReturn> EPS\n").unwrap();
        assert_eq!(grammar.len(), 2);
    }

    #[test]
    fn test_unknown_non_terminal_is_rejected() {
        let err = Grammar::parse("<bogus> MAIN").unwrap_err();
        assert_eq!(
            err,
            GrammarError::UnknownNonTerminal {
                line: 1,
                name: "bogus".to_owned()
            }
        );
    }

    #[test]
    fn test_unknown_terminal_is_rejected() {
        let err = Grammar::parse("<stmts> NOSUCH").unwrap_err();
        assert_eq!(
            err,
            GrammarError::UnknownTerminal {
                line: 1,
                name: "NOSUCH".to_owned()
            }
        );
    }

    #[test]
    fn test_malformed_head_is_rejected() {
        let err = Grammar::parse("stmts MAIN").unwrap_err();
        assert!(matches!(err, GrammarError::MalformedHead { line: 1, .. }));
    }

    #[test]
    fn test_empty_rhs_is_rejected() {
        let err = Grammar::parse("<stmts>").unwrap_err();
        assert!(matches!(err, GrammarError::EmptyRule { line: 1, .. }));
    }

    #[test]
    fn test_default_grammar_loads() {
        let grammar = Grammar::parse(DEFAULT_GRAMMAR).unwrap();
        assert_eq!(grammar.start(), NonTerminal::Program);
        // Every non-terminal referenced by the bundled grammar has at
        // least one rule of its own.
        for (_, rule) in grammar.iter() {
            for sym in &rule.rhs {
                if let GrammarSymbol::NonTerminal(nt) = sym {
                    assert!(
                        grammar.iter().any(|(_, r)| r.lhs == *nt),
                        "no rule for {}",
                        nt
                    );
                }
            }
        }
    }

    #[test]
    fn test_rule_display() {
        let grammar = Grammar::parse("<ioStmt> READ OP <var> CL SEM").unwrap();
        assert_eq!(
            grammar.rule(RuleId(0)).to_string(),
            "<ioStmt> -> TK_READ TK_OP <var> TK_CL TK_SEM"
        );
    }
}
