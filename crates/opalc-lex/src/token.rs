//! Token kinds and the token stream.
//!
//! [`TokenKind`] is a closed enumeration of everything the DFA can emit.
//! Declaration order is meaningful: the derived `Ord` places the three
//! lexical-error kinds after every valid kind, so "is this an error token"
//! is a single comparison ([`TokenKind::is_error`]).

use crate::symtab::SymId;

/// Every kind of token the lexer can produce.
///
/// The `TK_*` spelling used by grammar files and listings is available via
/// [`TokenKind::name`]; [`TokenKind::from_grammar_name`] resolves a bare
/// grammar-file terminal (the name without its `TK_` prefix).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenKind {
    /// `<---`
    Assignop,
    /// `%` to end of line.
    Comment,
    /// Lowercase word that is not a reserved keyword.
    FieldId,
    /// Variable identifier: `[b-d][2-7]+` or `[b-d][a-z]+[2-7]+`.
    Id,
    /// Integer literal.
    Num,
    /// Real literal with exactly two fractional digits.
    Rnum,
    /// `_`-prefixed function identifier.
    FunId,
    /// `#`-prefixed record/union identifier.
    Ruid,
    /// The distinguished `_main` function identifier.
    Main,

    // Reserved keywords.
    With,
    Parameters,
    End,
    While,
    Union,
    EndUnion,
    DefineType,
    As,
    Type,
    Global,
    Parameter,
    List,
    Input,
    Output,
    Int,
    Real,
    EndWhile,
    If,
    Then,
    EndIf,
    Read,
    Write,
    Return,
    Call,
    Record,
    EndRecord,
    Else,

    // Structural punctuation.
    Sql,
    Sqr,
    Comma,
    Sem,
    Colon,
    Dot,
    Op,
    Cl,

    // Relational operators.
    Lt,
    Le,
    Eq,
    Gt,
    Ge,
    Ne,

    // Arithmetic operators.
    Plus,
    Minus,
    Mul,
    Div,

    // Logical operators.
    And,
    Or,
    Not,

    /// The epsilon marker used by empty productions.
    Eps,
    /// End-of-input marker.
    Eof,

    // Lexical errors. Keep these last: `is_error` relies on the ordering.
    /// No pattern matched the consumed characters.
    ErrPattern,
    /// Variable identifier longer than 20 characters.
    ErrIdLen,
    /// Function identifier longer than 30 characters.
    ErrFunLen,
}

impl TokenKind {
    /// All kinds, in declaration order.
    pub const ALL: [TokenKind; 62] = [
        TokenKind::Assignop,
        TokenKind::Comment,
        TokenKind::FieldId,
        TokenKind::Id,
        TokenKind::Num,
        TokenKind::Rnum,
        TokenKind::FunId,
        TokenKind::Ruid,
        TokenKind::Main,
        TokenKind::With,
        TokenKind::Parameters,
        TokenKind::End,
        TokenKind::While,
        TokenKind::Union,
        TokenKind::EndUnion,
        TokenKind::DefineType,
        TokenKind::As,
        TokenKind::Type,
        TokenKind::Global,
        TokenKind::Parameter,
        TokenKind::List,
        TokenKind::Input,
        TokenKind::Output,
        TokenKind::Int,
        TokenKind::Real,
        TokenKind::EndWhile,
        TokenKind::If,
        TokenKind::Then,
        TokenKind::EndIf,
        TokenKind::Read,
        TokenKind::Write,
        TokenKind::Return,
        TokenKind::Call,
        TokenKind::Record,
        TokenKind::EndRecord,
        TokenKind::Else,
        TokenKind::Sql,
        TokenKind::Sqr,
        TokenKind::Comma,
        TokenKind::Sem,
        TokenKind::Colon,
        TokenKind::Dot,
        TokenKind::Op,
        TokenKind::Cl,
        TokenKind::Lt,
        TokenKind::Le,
        TokenKind::Eq,
        TokenKind::Gt,
        TokenKind::Ge,
        TokenKind::Ne,
        TokenKind::Plus,
        TokenKind::Minus,
        TokenKind::Mul,
        TokenKind::Div,
        TokenKind::And,
        TokenKind::Or,
        TokenKind::Not,
        TokenKind::Eps,
        TokenKind::Eof,
        TokenKind::ErrPattern,
        TokenKind::ErrIdLen,
        TokenKind::ErrFunLen,
    ];

    /// Number of kinds. Parse-table columns are indexed by kind.
    pub const COUNT: usize = Self::ALL.len();

    /// The canonical `TK_*` name.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Assignop => "TK_ASSIGNOP",
            TokenKind::Comment => "TK_COMMENT",
            TokenKind::FieldId => "TK_FIELDID",
            TokenKind::Id => "TK_ID",
            TokenKind::Num => "TK_NUM",
            TokenKind::Rnum => "TK_RNUM",
            TokenKind::FunId => "TK_FUNID",
            TokenKind::Ruid => "TK_RUID",
            TokenKind::Main => "TK_MAIN",
            TokenKind::With => "TK_WITH",
            TokenKind::Parameters => "TK_PARAMETERS",
            TokenKind::End => "TK_END",
            TokenKind::While => "TK_WHILE",
            TokenKind::Union => "TK_UNION",
            TokenKind::EndUnion => "TK_ENDUNION",
            TokenKind::DefineType => "TK_DEFINETYPE",
            TokenKind::As => "TK_AS",
            TokenKind::Type => "TK_TYPE",
            TokenKind::Global => "TK_GLOBAL",
            TokenKind::Parameter => "TK_PARAMETER",
            TokenKind::List => "TK_LIST",
            TokenKind::Input => "TK_INPUT",
            TokenKind::Output => "TK_OUTPUT",
            TokenKind::Int => "TK_INT",
            TokenKind::Real => "TK_REAL",
            TokenKind::EndWhile => "TK_ENDWHILE",
            TokenKind::If => "TK_IF",
            TokenKind::Then => "TK_THEN",
            TokenKind::EndIf => "TK_ENDIF",
            TokenKind::Read => "TK_READ",
            TokenKind::Write => "TK_WRITE",
            TokenKind::Return => "TK_RETURN",
            TokenKind::Call => "TK_CALL",
            TokenKind::Record => "TK_RECORD",
            TokenKind::EndRecord => "TK_ENDRECORD",
            TokenKind::Else => "TK_ELSE",
            TokenKind::Sql => "TK_SQL",
            TokenKind::Sqr => "TK_SQR",
            TokenKind::Comma => "TK_COMMA",
            TokenKind::Sem => "TK_SEM",
            TokenKind::Colon => "TK_COLON",
            TokenKind::Dot => "TK_DOT",
            TokenKind::Op => "TK_OP",
            TokenKind::Cl => "TK_CL",
            TokenKind::Lt => "TK_LT",
            TokenKind::Le => "TK_LE",
            TokenKind::Eq => "TK_EQ",
            TokenKind::Gt => "TK_GT",
            TokenKind::Ge => "TK_GE",
            TokenKind::Ne => "TK_NE",
            TokenKind::Plus => "TK_PLUS",
            TokenKind::Minus => "TK_MINUS",
            TokenKind::Mul => "TK_MUL",
            TokenKind::Div => "TK_DIV",
            TokenKind::And => "TK_AND",
            TokenKind::Or => "TK_OR",
            TokenKind::Not => "TK_NOT",
            TokenKind::Eps => "TK_EPS",
            TokenKind::Eof => "TK_EOF",
            TokenKind::ErrPattern => "TK_ERR_PATTERN",
            TokenKind::ErrIdLen => "TK_ERR_IDLEN",
            TokenKind::ErrFunLen => "TK_ERR_FUNLEN",
        }
    }

    /// Resolve a grammar-file terminal name (spelled without the `TK_`
    /// prefix) to its kind.
    pub fn from_grammar_name(bare: &str) -> Option<TokenKind> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name()[3..] == *bare)
    }

    /// Column index for parse-table storage.
    pub fn index(self) -> usize {
        self as usize
    }

    /// True for the three lexical-error kinds.
    pub fn is_error(self) -> bool {
        self >= TokenKind::ErrPattern
    }
}

impl std::fmt::Display for TokenKind {
    /// Human-readable name used by token listings. Error kinds render as
    /// their category phrase; everything else as its `TK_*` name.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::ErrPattern => write!(f, "Unrecognized pattern"),
            TokenKind::ErrIdLen => write!(f, "Identifier length exceeded 20"),
            TokenKind::ErrFunLen => write!(f, "Function name length exceeded 30"),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// One token: a reference into the symbol table plus the source line the
/// token started on. The kind is cached from the entry so the parser can
/// dispatch without touching the table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Token {
    /// Symbol-table entry carrying the lexeme (and numeric value).
    pub sym: SymId,
    /// Token kind, equal to the entry's kind.
    pub kind: TokenKind,
    /// Source line (1-based).
    pub line: u32,
}

/// The materialized output of one lexer run, terminated by a `TK_EOF`
/// token.
#[derive(Clone, Debug, Default)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub(crate) fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    /// All tokens in source order, end-of-input token included.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Token at position `i`.
    pub fn get(&self, i: usize) -> Option<&Token> {
        self.tokens.get(i)
    }

    /// Number of tokens including the terminator.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True only for a stream that was never produced by the lexer: a real
    /// stream always carries at least the end-of-input token.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Iterate over tokens in source order.
    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }
}
