//! Lexical analysis (spec §4.1).
//!
//! Turns source text into a flat stream of [`Token`]s. Whitespace within a
//! line and `#`-comments are skipped by the `logos` lexer; newlines are kept
//! as explicit tokens since they terminate items in the grammar.

use logos::Logos;

use crate::error::EngineError;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r]+")]
#[logos(skip r"#[^\n]*")]
pub enum TokenKind {
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("!")]
    Bang,
    #[token("+")]
    Plus,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("<=>")]
    Iff,
    #[token("=>")]
    Implies,
    #[token("=")]
    Equals,
    #[token("?")]
    Question,
    #[token("\n")]
    Newline,
    #[regex("[A-Z]", |lex| lex.slice().chars().next().unwrap())]
    Symbol(char),
}

/// A classified token together with its source position, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'s> {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
    pub lexeme: &'s str,
}

/// Precomputes the byte offset each line starts at, for O(log n) line/column
/// lookup while reporting syntax errors.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                starts.push(i + 1);
            }
        }
        Self { starts }
    }

    /// Returns 1-based (line, column) for a byte offset.
    fn locate(&self, offset: usize) -> (usize, usize) {
        let line = match self.starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let col = offset - self.starts[line] + 1;
        (line + 1, col)
    }

    fn snippet(&self, source: &str, line: usize) -> String {
        let start = self.starts.get(line - 1).copied().unwrap_or(source.len());
        let end = self.starts.get(line).map(|e| e - 1).unwrap_or(source.len());
        source[start..end.max(start)].to_string()
    }
}

/// Tokenizes `source`, returning a flat list of tokens or a [`EngineError::Syntax`]
/// describing the first unrecognized character.
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>, EngineError> {
    let index = LineIndex::new(source);
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let (line, column) = index.locate(span.start);
        match result {
            Ok(kind) => tokens.push(Token {
                kind,
                line,
                column,
                lexeme: &source[span.clone()],
            }),
            Err(()) => {
                return Err(EngineError::Syntax {
                    line,
                    column,
                    message: format!("unexpected character {:?}", &source[span.clone()]),
                    snippet: index.snippet(source, line),
                });
            }
        }
    }

    Ok(tokens)
}
