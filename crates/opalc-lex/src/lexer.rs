//! The lexer DFA.
//!
//! One token per call to [`Lexer::next_token`]. The automaton reads bytes
//! through the twin buffer, enforcing maximal munch by retracting whenever
//! it has read one (or two) characters past the end of a lexeme. Every
//! emitted token holds a symbol-table handle and the line it started on.
//!
//! Lexical errors never abort the run: each one produces a diagnostic plus
//! an inline error-kind token, and the automaton resumes at the next clean
//! character. The only fatal condition is an I/O failure from the buffer.

use std::io::{self, Read};

use log::debug;
use thiserror::Error;

use opalc_util::Handler;

use crate::buffer::TwinBuffer;
use crate::keywords::KeywordTrie;
use crate::symtab::{NumValue, SymbolTable};
use crate::token::{Token, TokenKind, TokenStream};

/// Length cap for variable identifiers.
pub const MAX_ID_LEN: usize = 20;

/// Length cap for function identifiers.
pub const MAX_FUNID_LEN: usize = 30;

/// Fatal lexer failure.
///
/// Lexical problems in the source are diagnostics, not errors; this type
/// only surfaces conditions that make continuing impossible.
#[derive(Debug, Error)]
pub enum LexError {
    /// The underlying stream failed while refilling the buffer.
    #[error("I/O error while reading source: {0}")]
    Io(#[from] io::Error),
}

/// Hand-written DFA lexer over a twin-buffered byte stream.
pub struct Lexer<'h, R> {
    buffer: TwinBuffer<R>,
    symbols: SymbolTable,
    keywords: KeywordTrie,
    handler: &'h Handler,
    line: u32,
}

impl<'h, R: Read> Lexer<'h, R> {
    /// Create a lexer over `source`, reporting lexical errors to `handler`.
    pub fn new(source: R, handler: &'h Handler) -> Result<Self, LexError> {
        Ok(Self {
            buffer: TwinBuffer::new(source)?,
            symbols: SymbolTable::new(),
            keywords: KeywordTrie::with_reserved_words(),
            handler,
            line: 1,
        })
    }

    /// Current source line (1-based).
    pub fn line(&self) -> u32 {
        self.line
    }

    /// The symbol table accumulated so far.
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Lex the whole input, returning the materialized token stream
    /// (terminated by the end-of-input token) and the symbol table.
    pub fn tokenize(mut self) -> Result<(TokenStream, SymbolTable), LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        debug!(
            "lexing done: {} tokens, {} distinct lexemes",
            tokens.len(),
            self.symbols.len()
        );
        Ok((TokenStream::new(tokens), self.symbols))
    }

    /// Emit the next token.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        loop {
            let begin = self.buffer.pos();
            let c = self.buffer.advance()?;
            return match c {
                b' ' | b'\t' | b'\r' => continue,
                b'\n' => {
                    self.line += 1;
                    continue;
                }
                // The NUL sentinel; its entry has the one lexeme no source
                // token can carry.
                0 => Ok(self.emit(TokenKind::Eof, "", None, self.line)),
                b'%' => self.lex_comment(),
                b'0'..=b'9' => self.lex_number(begin),
                b'b'..=b'd' => self.lex_var_or_word(begin),
                b'a' | b'e'..=b'z' => self.lex_word(begin),
                b'_' => self.lex_function_id(begin),
                b'#' => self.lex_record_id(begin),
                b'<' => self.lex_less(begin),
                b'>' => self.two_char_or(b'=', TokenKind::Ge, ">=", TokenKind::Gt, ">"),
                b'=' => self.lex_exact(begin, b'=', TokenKind::Eq, "=="),
                b'!' => self.lex_exact(begin, b'=', TokenKind::Ne, "!="),
                b'&' => self.lex_triple(begin, b'&', TokenKind::And, "&&&"),
                b'@' => self.lex_triple(begin, b'@', TokenKind::Or, "@@@"),
                b'~' => Ok(self.emit(TokenKind::Not, "~", None, self.line)),
                b'+' => Ok(self.emit(TokenKind::Plus, "+", None, self.line)),
                b'-' => Ok(self.emit(TokenKind::Minus, "-", None, self.line)),
                b'*' => Ok(self.emit(TokenKind::Mul, "*", None, self.line)),
                b'/' => Ok(self.emit(TokenKind::Div, "/", None, self.line)),
                b'[' => Ok(self.emit(TokenKind::Sql, "[", None, self.line)),
                b']' => Ok(self.emit(TokenKind::Sqr, "]", None, self.line)),
                b',' => Ok(self.emit(TokenKind::Comma, ",", None, self.line)),
                b';' => Ok(self.emit(TokenKind::Sem, ";", None, self.line)),
                b':' => Ok(self.emit(TokenKind::Colon, ":", None, self.line)),
                b'.' => Ok(self.emit(TokenKind::Dot, ".", None, self.line)),
                b'(' => Ok(self.emit(TokenKind::Op, "(", None, self.line)),
                b')' => Ok(self.emit(TokenKind::Cl, ")", None, self.line)),
                _ => Ok(self.pattern_error(begin, self.line)),
            };
        }
    }

    /// `%` comment: one comment token, then everything through the newline
    /// is discarded.
    fn lex_comment(&mut self) -> Result<Token, LexError> {
        let line = self.line;
        loop {
            match self.buffer.advance()? {
                b'\n' => {
                    self.line += 1;
                    break;
                }
                0 => {
                    self.buffer.retract();
                    break;
                }
                _ => {}
            }
        }
        Ok(self.emit(TokenKind::Comment, "%", None, line))
    }

    /// Integer and real literals. The first digit is already consumed.
    fn lex_number(&mut self, begin: usize) -> Result<Token, LexError> {
        let line = self.line;
        let mut c = self.buffer.advance()?;
        while c.is_ascii_digit() {
            c = self.buffer.advance()?;
        }
        if c != b'.' {
            self.buffer.retract();
            return Ok(self.integer_token(begin, line));
        }

        // Past the dot the automaton is two characters deep before it can
        // decide, hence the two-slot retraction on the way out.
        let d1 = self.buffer.advance()?;
        if !d1.is_ascii_digit() {
            self.buffer.retract_two();
            return Ok(self.integer_token(begin, line));
        }
        let d2 = self.buffer.advance()?;
        if !d2.is_ascii_digit() {
            self.buffer.retract();
            return Ok(self.pattern_error(begin, line));
        }

        let e = self.buffer.advance()?;
        if e != b'E' && e != b'e' {
            self.buffer.retract();
            return Ok(self.real_token(begin, line));
        }
        let mut x = self.buffer.advance()?;
        if x == b'+' || x == b'-' {
            x = self.buffer.advance()?;
        }
        if !x.is_ascii_digit() {
            self.buffer.retract();
            return Ok(self.pattern_error(begin, line));
        }
        let x2 = self.buffer.advance()?;
        if !x2.is_ascii_digit() {
            self.buffer.retract();
            return Ok(self.pattern_error(begin, line));
        }
        Ok(self.real_token(begin, line))
    }

    /// A lexeme starting in `[b-d]`: variable identifier if digits from
    /// `[2-7]` terminate it, otherwise an ordinary lowercase word. The
    /// 20-character cap applies to this whole track.
    fn lex_var_or_word(&mut self, begin: usize) -> Result<Token, LexError> {
        let line = self.line;
        let mut c = self.buffer.advance()?;
        if c.is_ascii_lowercase() {
            while c.is_ascii_lowercase() {
                c = self.buffer.advance()?;
            }
            if (b'2'..=b'7').contains(&c) {
                while (b'2'..=b'7').contains(&c) {
                    c = self.buffer.advance()?;
                }
                self.buffer.retract();
                return Ok(self.variable_token(begin, line));
            }
            self.buffer.retract();
            return Ok(self.word_token(begin, line, true));
        }
        if (b'2'..=b'7').contains(&c) {
            while (b'2'..=b'7').contains(&c) {
                c = self.buffer.advance()?;
            }
            self.buffer.retract();
            return Ok(self.variable_token(begin, line));
        }
        // Lone [b-d] letter.
        self.buffer.retract();
        Ok(self.word_token(begin, line, true))
    }

    /// A lowercase word that cannot be a variable identifier.
    fn lex_word(&mut self, begin: usize) -> Result<Token, LexError> {
        let line = self.line;
        let mut c = self.buffer.advance()?;
        while c.is_ascii_lowercase() {
            c = self.buffer.advance()?;
        }
        self.buffer.retract();
        Ok(self.word_token(begin, line, false))
    }

    /// `_` function identifier: underscore, letters, optional trailing
    /// digits. `_main` is the distinguished main-function token.
    fn lex_function_id(&mut self, begin: usize) -> Result<Token, LexError> {
        let line = self.line;
        let mut c = self.buffer.advance()?;
        if !c.is_ascii_alphabetic() {
            self.buffer.retract();
            return Ok(self.pattern_error(begin, line));
        }
        while c.is_ascii_alphabetic() {
            c = self.buffer.advance()?;
        }
        while c.is_ascii_digit() {
            c = self.buffer.advance()?;
        }
        self.buffer.retract();

        let lexeme = self.take_lexeme(begin);
        if lexeme.len() > MAX_FUNID_LEN {
            return Ok(self.length_error(
                &lexeme,
                MAX_FUNID_LEN,
                TokenKind::ErrFunLen,
                "Function name",
                line,
            ));
        }
        let kind = if lexeme == "_main" {
            TokenKind::Main
        } else {
            TokenKind::FunId
        };
        Ok(self.emit(kind, &lexeme, None, line))
    }

    /// `#` record/union identifier.
    fn lex_record_id(&mut self, begin: usize) -> Result<Token, LexError> {
        let line = self.line;
        let mut c = self.buffer.advance()?;
        if !c.is_ascii_lowercase() {
            self.buffer.retract();
            return Ok(self.pattern_error(begin, line));
        }
        while c.is_ascii_lowercase() {
            c = self.buffer.advance()?;
        }
        self.buffer.retract();
        let lexeme = self.take_lexeme(begin);
        Ok(self.emit(TokenKind::Ruid, &lexeme, None, line))
    }

    /// `<`, `<=`, `<---`, and the `<-` lookahead that retracts two.
    fn lex_less(&mut self, begin: usize) -> Result<Token, LexError> {
        let line = self.line;
        let c = self.buffer.advance()?;
        match c {
            b'=' => Ok(self.emit(TokenKind::Le, "<=", None, line)),
            b'-' => {
                let c2 = self.buffer.advance()?;
                if c2 != b'-' {
                    self.buffer.retract_two();
                    return Ok(self.emit(TokenKind::Lt, "<", None, line));
                }
                let c3 = self.buffer.advance()?;
                if c3 == b'-' {
                    Ok(self.emit(TokenKind::Assignop, "<---", None, line))
                } else {
                    self.buffer.retract();
                    Ok(self.pattern_error(begin, line))
                }
            }
            _ => {
                self.buffer.retract();
                Ok(self.emit(TokenKind::Lt, "<", None, line))
            }
        }
    }

    /// Two-character operator whose first character is also a token.
    fn two_char_or(
        &mut self,
        second: u8,
        hit: TokenKind,
        hit_lexeme: &str,
        miss: TokenKind,
        miss_lexeme: &str,
    ) -> Result<Token, LexError> {
        let line = self.line;
        if self.buffer.advance()? == second {
            Ok(self.emit(hit, hit_lexeme, None, line))
        } else {
            self.buffer.retract();
            Ok(self.emit(miss, miss_lexeme, None, line))
        }
    }

    /// Two-character operator whose lone first character is an error.
    fn lex_exact(
        &mut self,
        begin: usize,
        second: u8,
        hit: TokenKind,
        hit_lexeme: &str,
    ) -> Result<Token, LexError> {
        let line = self.line;
        if self.buffer.advance()? == second {
            Ok(self.emit(hit, hit_lexeme, None, line))
        } else {
            self.buffer.retract();
            Ok(self.pattern_error(begin, line))
        }
    }

    /// Three-of-the-same operator (`&&&`, `@@@`); shorter runs are errors.
    fn lex_triple(
        &mut self,
        begin: usize,
        which: u8,
        hit: TokenKind,
        hit_lexeme: &str,
    ) -> Result<Token, LexError> {
        let line = self.line;
        let c2 = self.buffer.advance()?;
        if c2 != which {
            self.buffer.retract();
            return Ok(self.pattern_error(begin, line));
        }
        let c3 = self.buffer.advance()?;
        if c3 != which {
            self.buffer.retract();
            return Ok(self.pattern_error(begin, line));
        }
        Ok(self.emit(hit, hit_lexeme, None, line))
    }

    /// Classify a finished lowercase word: reserved keyword or field
    /// identifier. `capped` marks the `[b-d]` track, which carries the
    /// variable-identifier length limit.
    fn word_token(&mut self, begin: usize, line: u32, capped: bool) -> Token {
        let lexeme = self.take_lexeme(begin);
        if capped && lexeme.len() > MAX_ID_LEN {
            return self.length_error(&lexeme, MAX_ID_LEN, TokenKind::ErrIdLen, "Identifier", line);
        }
        match self.keywords.lookup(&lexeme) {
            Some(kind) => self.emit(kind, &lexeme, None, line),
            None => self.emit(TokenKind::FieldId, &lexeme, None, line),
        }
    }

    /// Finished variable identifier, length cap applied.
    fn variable_token(&mut self, begin: usize, line: u32) -> Token {
        let lexeme = self.take_lexeme(begin);
        if lexeme.len() > MAX_ID_LEN {
            return self.length_error(&lexeme, MAX_ID_LEN, TokenKind::ErrIdLen, "Identifier", line);
        }
        self.emit(TokenKind::Id, &lexeme, None, line)
    }

    /// Finished integer literal with its decimal value.
    fn integer_token(&mut self, begin: usize, line: u32) -> Token {
        let lexeme = self.take_lexeme(begin);
        let value = lexeme.parse::<i64>().unwrap_or(i64::MAX);
        self.emit(TokenKind::Num, &lexeme, Some(NumValue::Int(value)), line)
    }

    /// Finished real literal; value per the two-fraction-digit form.
    fn real_token(&mut self, begin: usize, line: u32) -> Token {
        let lexeme = self.take_lexeme(begin);
        let value = parse_real(&lexeme);
        self.emit(TokenKind::Rnum, &lexeme, Some(NumValue::Real(value)), line)
    }

    /// Unrecognized pattern: diagnostic plus inline error token covering
    /// the consumed characters.
    fn pattern_error(&mut self, begin: usize, line: u32) -> Token {
        let lexeme = self.take_lexeme(begin);
        self.handler
            .error(line, format!("Unrecognized pattern \"{}\"", lexeme));
        self.emit(TokenKind::ErrPattern, &lexeme, None, line)
    }

    /// Over-long identifier or function name: the token keeps the first
    /// `cap` characters followed by an ellipsis.
    fn length_error(
        &mut self,
        lexeme: &str,
        cap: usize,
        kind: TokenKind,
        what: &str,
        line: u32,
    ) -> Token {
        let truncated = format!("{}...", &lexeme[..cap]);
        self.handler.error(
            line,
            format!(
                "{} \"{}\" exceeds the maximum length of {}",
                what, truncated, cap
            ),
        );
        self.emit(kind, &truncated, None, line)
    }

    /// Intern the lexeme and build the token node.
    fn emit(&mut self, kind: TokenKind, lexeme: &str, value: Option<NumValue>, line: u32) -> Token {
        let sym = self.symbols.intern(lexeme, kind, value);
        Token { sym, kind, line }
    }

    /// Copy the source bytes between the saved begin cursor and the
    /// current forward cursor.
    fn take_lexeme(&self, begin: usize) -> String {
        String::from_utf8_lossy(&self.buffer.lexeme(begin, self.buffer.pos())).into_owned()
    }
}

impl<'h, R: Read> Iterator for Lexer<'h, R> {
    type Item = Result<Token, LexError>;

    /// Yields tokens up to and including the end-of-input token.
    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Ok(token) if token.kind == TokenKind::Eof => None,
            other => Some(other),
        }
    }
}

/// Value of a real literal: integer part plus the two fractional digits,
/// scaled by the optional signed two-digit exponent.
fn parse_real(lexeme: &str) -> f64 {
    let (mantissa, exponent) = match lexeme.find(['E', 'e']) {
        Some(at) => (&lexeme[..at], &lexeme[at + 1..]),
        None => (lexeme, ""),
    };
    let dot = mantissa.find('.').expect("real literal has a dot");
    let int_part: f64 = mantissa[..dot].parse().unwrap_or(0.0);
    let frac = mantissa[dot + 1..].as_bytes();
    let d1 = (frac[0] - b'0') as f64;
    let d2 = (frac[1] - b'0') as f64;
    let mut value = int_part + d1 / 10.0 + d2 / 100.0;
    if !exponent.is_empty() {
        let exp: i32 = exponent.parse().unwrap_or(0);
        value *= 10f64.powi(exp);
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn lex_all(source: &str) -> (Vec<Token>, SymbolTable, Handler) {
        let handler = Handler::new();
        let lexer = Lexer::new(source.as_bytes(), &handler).unwrap();
        let (stream, symbols) = lexer.tokenize().unwrap();
        (stream.tokens().to_vec(), symbols, handler)
    }

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    fn lexemes<'a>(tokens: &[Token], symbols: &'a SymbolTable) -> Vec<String> {
        tokens
            .iter()
            .map(|t| symbols.lexeme(t.sym).to_owned())
            .collect()
    }

    #[test]
    fn test_empty_input_is_just_eof() {
        let (tokens, _, handler) = lex_all("");
        assert_eq!(kinds(&tokens), vec![TokenKind::Eof]);
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_arithmetic_scenario() {
        let (tokens, symbols, _) = lex_all("123 + 4.56");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Num,
                TokenKind::Plus,
                TokenKind::Rnum,
                TokenKind::Eof
            ]
        );
        assert_eq!(
            symbols.entry(tokens[0].sym).value,
            Some(NumValue::Int(123))
        );
        match symbols.entry(tokens[2].sym).value {
            Some(NumValue::Real(v)) => assert!((v - 4.56).abs() < 1e-9),
            other => panic!("expected real value, got {:?}", other),
        }
    }

    #[test]
    fn test_main_and_end_lines() {
        let (tokens, symbols, _) = lex_all("_main\nend\n");
        assert_eq!(
            kinds(&tokens),
            vec![TokenKind::Main, TokenKind::End, TokenKind::Eof]
        );
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].line, 2);
        assert_eq!(symbols.lexeme(tokens[0].sym), "_main");
    }

    #[test]
    fn test_assignment_scenario() {
        let (tokens, symbols, _) = lex_all("abc <--- 5 ;");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::FieldId,
                TokenKind::Assignop,
                TokenKind::Num,
                TokenKind::Sem,
                TokenKind::Eof
            ]
        );
        assert_eq!(
            lexemes(&tokens[..4], &symbols),
            vec!["abc", "<---", "5", ";"]
        );
    }

    #[test]
    fn test_unrecognized_at_sign() {
        let (tokens, symbols, handler) = lex_all("@ abc");
        assert_eq!(tokens[0].kind, TokenKind::ErrPattern);
        assert_eq!(symbols.lexeme(tokens[0].sym), "@");
        // Lexing continued past the error.
        assert_eq!(tokens[1].kind, TokenKind::FieldId);
        assert_eq!(handler.error_count(), 1);
        assert!(handler.diagnostics()[0]
            .to_string()
            .contains("Unrecognized pattern \"@\""));
    }

    #[test]
    fn test_identifier_length_exceeded() {
        let source = "bcbcbcbcbcbcbcbcbcbcbcbcb ;";
        let (tokens, symbols, handler) = lex_all(source);
        assert_eq!(tokens[0].kind, TokenKind::ErrIdLen);
        assert_eq!(symbols.lexeme(tokens[0].sym), "bcbcbcbcbcbcbcbcbcbc...");
        assert_eq!(tokens[1].kind, TokenKind::Sem);
        assert_eq!(handler.error_count(), 1);
    }

    #[test]
    fn test_identifier_length_boundary() {
        // Exactly 20 characters: accepted.
        let ok = format!("b{}27", "cdbcdbcdbcdbcdbcd"); // 1 + 17 + 2
        assert_eq!(ok.len(), 20);
        let (tokens, _, handler) = lex_all(&ok);
        assert_eq!(tokens[0].kind, TokenKind::Id);
        assert!(!handler.has_errors());

        // Twenty-one characters: rejected.
        let long = format!("b{}27", "cdbcdbcdbcdbcdbcdb"); // 1 + 18 + 2
        assert_eq!(long.len(), 21);
        let (tokens, _, handler) = lex_all(&long);
        assert_eq!(tokens[0].kind, TokenKind::ErrIdLen);
        assert!(handler.has_errors());
    }

    #[test]
    fn test_function_name_length_boundary() {
        let ok = format!("_{}", "abcdefghijklmnopqrstuvwxyzabc"); // 30
        assert_eq!(ok.len(), 30);
        let (tokens, _, handler) = lex_all(&ok);
        assert_eq!(tokens[0].kind, TokenKind::FunId);
        assert!(!handler.has_errors());

        let long = format!("_{}", "abcdefghijklmnopqrstuvwxyzabcd"); // 31
        assert_eq!(long.len(), 31);
        let (tokens, symbols, handler) = lex_all(&long);
        assert_eq!(tokens[0].kind, TokenKind::ErrFunLen);
        assert_eq!(symbols.lexeme(tokens[0].sym).len(), 30 + 3);
        assert!(handler.has_errors());
    }

    #[test]
    fn test_variable_identifier_shapes() {
        let (tokens, _, _) = lex_all("b2 d234 c77 bxy2 dabc567");
        assert_eq!(
            kinds(&tokens[..5]),
            vec![TokenKind::Id; 5],
        );
    }

    #[test]
    fn test_bd_words_without_digits_are_words() {
        // [b-d]-started words with no [2-7] tail fall back to keyword or
        // field identifier.
        let (tokens, _, _) = lex_all("call definetype cat dog");
        assert_eq!(
            kinds(&tokens[..4]),
            vec![
                TokenKind::Call,
                TokenKind::DefineType,
                TokenKind::FieldId,
                TokenKind::FieldId
            ]
        );
    }

    #[test]
    fn test_all_keywords() {
        let source = "with parameters end while union endunion definetype as type \
                      global parameter list input output int real endwhile if then \
                      endif read write return call record endrecord else";
        let (tokens, _, handler) = lex_all(source);
        assert!(!handler.has_errors());
        let expected = vec![
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
            TokenKind::Eof,
        ];
        assert_eq!(kinds(&tokens), expected);
    }

    #[test]
    fn test_record_identifier() {
        let (tokens, symbols, _) = lex_all("#point #abc");
        assert_eq!(tokens[0].kind, TokenKind::Ruid);
        assert_eq!(symbols.lexeme(tokens[0].sym), "#point");
        assert_eq!(tokens[1].kind, TokenKind::Ruid);
    }

    #[test]
    fn test_hash_without_word_is_error() {
        let (tokens, symbols, handler) = lex_all("# abc");
        assert_eq!(tokens[0].kind, TokenKind::ErrPattern);
        assert_eq!(symbols.lexeme(tokens[0].sym), "#");
        assert_eq!(tokens[1].kind, TokenKind::FieldId);
        assert!(handler.has_errors());
    }

    #[test]
    fn test_relational_operators() {
        let (tokens, _, _) = lex_all("< <= == > >= !=");
        assert_eq!(
            kinds(&tokens[..6]),
            vec![
                TokenKind::Lt,
                TokenKind::Le,
                TokenKind::Eq,
                TokenKind::Gt,
                TokenKind::Ge,
                TokenKind::Ne
            ]
        );
    }

    #[test]
    fn test_less_minus_retracts_two() {
        // `<-` is less-than followed by minus, which takes a two-slot
        // retraction to see.
        let (tokens, _, handler) = lex_all("a <- b2");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::FieldId,
                TokenKind::Lt,
                TokenKind::Minus,
                TokenKind::Id,
                TokenKind::Eof
            ]
        );
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_incomplete_assignop_is_error() {
        let (tokens, symbols, handler) = lex_all("a <-- b2");
        assert_eq!(tokens[1].kind, TokenKind::ErrPattern);
        assert_eq!(symbols.lexeme(tokens[1].sym), "<--");
        assert_eq!(tokens[2].kind, TokenKind::Id);
        assert!(handler.has_errors());
    }

    #[test]
    fn test_logical_operators() {
        let (tokens, _, _) = lex_all("&&& @@@ ~");
        assert_eq!(
            kinds(&tokens[..3]),
            vec![TokenKind::And, TokenKind::Or, TokenKind::Not]
        );
    }

    #[test]
    fn test_short_logical_runs_are_errors() {
        let (tokens, symbols, handler) = lex_all("&& @");
        assert_eq!(tokens[0].kind, TokenKind::ErrPattern);
        assert_eq!(symbols.lexeme(tokens[0].sym), "&&");
        assert_eq!(tokens[1].kind, TokenKind::ErrPattern);
        assert_eq!(symbols.lexeme(tokens[1].sym), "@");
        assert_eq!(handler.error_count(), 2);
    }

    #[test]
    fn test_single_equals_is_error() {
        let (tokens, symbols, handler) = lex_all("a = b2");
        assert_eq!(tokens[1].kind, TokenKind::ErrPattern);
        assert_eq!(symbols.lexeme(tokens[1].sym), "=");
        assert!(handler.has_errors());
    }

    #[test]
    fn test_real_with_exponent() {
        let (tokens, symbols, _) = lex_all("2.34E-05 1.50E22 3.14e02");
        for token in &tokens[..3] {
            assert_eq!(token.kind, TokenKind::Rnum);
        }
        let value = |i: usize| match symbols.entry(tokens[i].sym).value {
            Some(NumValue::Real(v)) => v,
            other => panic!("expected real, got {:?}", other),
        };
        assert!((value(0) - 2.34e-5).abs() < 1e-12);
        assert!((value(1) - 1.5e22).abs() < 1e10);
        assert!((value(2) - 314.0).abs() < 1e-9);
    }

    #[test]
    fn test_number_dot_without_fraction_retracts_to_integer() {
        let (tokens, symbols, handler) = lex_all("12.x");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Num,
                TokenKind::Dot,
                TokenKind::FieldId,
                TokenKind::Eof
            ]
        );
        assert_eq!(symbols.lexeme(tokens[0].sym), "12");
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_real_missing_second_fraction_digit_is_error() {
        let (tokens, symbols, handler) = lex_all("4.5");
        assert_eq!(tokens[0].kind, TokenKind::ErrPattern);
        assert_eq!(symbols.lexeme(tokens[0].sym), "4.5");
        assert!(handler.has_errors());
    }

    #[test]
    fn test_broken_exponent_is_error() {
        let (tokens, symbols, handler) = lex_all("2.50E+x");
        assert_eq!(tokens[0].kind, TokenKind::ErrPattern);
        assert_eq!(symbols.lexeme(tokens[0].sym), "2.50E+");
        assert_eq!(tokens[1].kind, TokenKind::FieldId);
        assert!(handler.has_errors());
    }

    #[test]
    fn test_comment_token_and_discard() {
        let (tokens, symbols, _) = lex_all("abc % ignored ; junk\ndef");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::FieldId,
                TokenKind::Comment,
                TokenKind::FieldId,
                TokenKind::Eof
            ]
        );
        assert_eq!(symbols.lexeme(tokens[1].sym), "%");
        assert_eq!(tokens[1].line, 1);
        assert_eq!(tokens[2].line, 2);
    }

    #[test]
    fn test_comment_at_eof_without_newline() {
        let (tokens, _, _) = lex_all("abc % trailing");
        assert_eq!(
            kinds(&tokens),
            vec![TokenKind::FieldId, TokenKind::Comment, TokenKind::Eof]
        );
    }

    #[test]
    fn test_interning_shares_entries() {
        let (tokens, _, _) = lex_all("abc abc abc");
        assert_eq!(tokens[0].sym, tokens[1].sym);
        assert_eq!(tokens[1].sym, tokens[2].sym);
    }

    #[test]
    fn test_lexeme_fidelity_round_trip() {
        // The concatenated lexemes of the emitted tokens are exactly the
        // non-comment, non-whitespace input.
        let source = "type int : b2 ; b2 <--- 35 ; while ( b2 <= 100 )";
        let (tokens, symbols, _) = lex_all(source);
        let rebuilt: String = tokens
            .iter()
            .filter(|t| t.kind != TokenKind::Eof && t.kind != TokenKind::Comment)
            .map(|t| symbols.lexeme(t.sym))
            .collect();
        let squeezed: String = source.split_whitespace().collect();
        assert_eq!(rebuilt, squeezed);
    }

    #[test]
    fn test_line_numbers_across_blank_lines() {
        let (tokens, _, _) = lex_all("a\n\n\nb2\n");
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].line, 4);
    }

    #[test]
    fn test_token_spanning_segment_boundary() {
        // Pad with spaces so an identifier straddles the first segment
        // boundary, forcing a mid-lexeme refill.
        let pad = " ".repeat(crate::buffer::SEGMENT - 5);
        let source = format!("{}endrecord b2", pad);
        let (tokens, _, handler) = lex_all(&source);
        assert_eq!(
            kinds(&tokens),
            vec![TokenKind::EndRecord, TokenKind::Id, TokenKind::Eof]
        );
        assert!(!handler.has_errors());
    }

    proptest! {
        #[test]
        fn prop_digit_strings_lex_to_num(value in 0i64..1_000_000_000) {
            let source = value.to_string();
            let (tokens, symbols, handler) = lex_all(&source);
            prop_assert_eq!(tokens[0].kind, TokenKind::Num);
            prop_assert_eq!(
                symbols.entry(tokens[0].sym).value,
                Some(NumValue::Int(value))
            );
            prop_assert!(!handler.has_errors());
        }

        #[test]
        fn prop_interning_is_injective(words in proptest::collection::vec("[a-z]{1,8}", 1..20)) {
            let source = words.join(" ");
            let (tokens, symbols, _) = lex_all(&source);
            for (i, a) in words.iter().enumerate() {
                for (j, b) in words.iter().enumerate() {
                    let same_text = a == b;
                    let same_sym = tokens[i].sym == tokens[j].sym;
                    prop_assert_eq!(same_text, same_sym);
                }
            }
            // No two entries share a lexeme.
            let mut seen = std::collections::HashSet::new();
            for (_, entry) in symbols.iter() {
                prop_assert!(seen.insert(entry.lexeme.clone()));
            }
        }
    }
}
