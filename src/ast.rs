//! Expression tree and recursive-descent parser (spec §3, §4.1, §4.2).
//!
//! The grammar, precedence high to low, is `!`, `+`, `^`, `|`:
//!
//! ```text
//! item       := rule | fact | query
//! rule       := expr ('=>' | '<=>') expr
//! fact       := '='  SYMBOL*
//! query      := '?'  SYMBOL+
//! expr       := or_expr
//! or_expr    := xor_expr  ('|' xor_expr)*
//! xor_expr   := and_expr  ('^' and_expr)*
//! and_expr   := unary     ('+' unary)*
//! unary      := '!' unary | atom
//! atom       := SYMBOL | '(' expr ')'
//! ```

use std::collections::BTreeSet;

use bumpalo::Bump;

use crate::error::EngineError;
use crate::lexer::{Token, TokenKind};

/// A single uppercase-letter propositional symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(pub char);

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An expression tree node, allocated out of the session's arena so that
/// rule-graph entries can share subtrees by reference instead of cloning.
#[derive(Debug, PartialEq, Eq)]
pub enum Expression<'a> {
    Sym(Symbol),
    Not(&'a Expression<'a>),
    And(&'a Expression<'a>, &'a Expression<'a>),
    Or(&'a Expression<'a>, &'a Expression<'a>),
    Xor(&'a Expression<'a>, &'a Expression<'a>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Implies,
    Iff,
}

#[derive(Debug)]
pub struct Rule<'a> {
    pub premise: &'a Expression<'a>,
    pub conclusion: &'a Expression<'a>,
    pub kind: RuleKind,
}

#[derive(Debug)]
pub enum Item<'a> {
    Rule(Rule<'a>),
    Fact(Vec<Symbol>),
    Query(Vec<Symbol>),
}

/// Collects every symbol referenced anywhere in `expr`, descending through
/// `Not`/`And`/`Or`/`Xor` subtrees. Shared by the resolver (to record which
/// symbols fed a successful derivation) and the graph export collaborator.
pub(crate) fn collect_symbols(expr: &Expression<'_>, into: &mut BTreeSet<Symbol>) {
    match expr {
        Expression::Sym(s) => {
            into.insert(*s);
        }
        Expression::Not(inner) => collect_symbols(inner, into),
        Expression::And(l, r) | Expression::Or(l, r) | Expression::Xor(l, r) => {
            collect_symbols(l, into);
            collect_symbols(r, into);
        }
    }
}

/// Walks a slice of tokens one at a time, mirroring the teacher's
/// `TokenCursor` peek/next helper.
struct TokenCursor<'t, 's> {
    tokens: &'t [Token<'s>],
    pos: usize,
}

impl<'t, 's> TokenCursor<'t, 's> {
    fn peek(&self) -> Option<&'t Token<'s>> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'t Token<'s>> {
        let t = self.tokens.get(self.pos);
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn syntax_error(&self, message: impl Into<String>) -> EngineError {
        let (line, column) = match self.peek().or_else(|| self.tokens.last()) {
            Some(t) => (t.line, t.column),
            None => (0, 0),
        };
        EngineError::Syntax {
            line,
            column,
            message: message.into(),
            snippet: self
                .peek()
                .map(|t| t.lexeme.to_string())
                .unwrap_or_default(),
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<&'t Token<'s>, EngineError> {
        match self.peek() {
            Some(t) if t.kind == kind => Ok(self.next().unwrap()),
            _ => Err(self.syntax_error(format!("expected {what}"))),
        }
    }

    fn skip_newlines(&mut self) {
        while matches!(self.peek(), Some(t) if t.kind == TokenKind::Newline) {
            self.next();
        }
    }
}

/// Parses a full token stream into a list of top-level items.
///
/// Fails with a [`EngineError::Syntax`] on the first malformed item; no
/// partial AST is returned on failure.
pub fn parse<'a, 's>(
    tokens: &[Token<'s>],
    arena: &'a Bump,
) -> Result<Vec<Item<'a>>, EngineError> {
    let mut cursor = TokenCursor { tokens, pos: 0 };
    let mut items = Vec::new();

    cursor.skip_newlines();
    while !cursor.at_eof() {
        items.push(parse_item(&mut cursor, arena)?);
        cursor.skip_newlines();
    }
    Ok(items)
}

fn parse_item<'a, 's>(
    cursor: &mut TokenCursor<'_, 's>,
    arena: &'a Bump,
) -> Result<Item<'a>, EngineError> {
    match cursor.peek().map(|t| t.kind) {
        Some(TokenKind::Equals) => {
            cursor.next();
            Ok(Item::Fact(parse_symbol_star(cursor)))
        }
        Some(TokenKind::Question) => {
            cursor.next();
            let symbols = parse_symbol_star(cursor);
            if symbols.is_empty() {
                return Err(cursor.syntax_error("query requires at least one symbol"));
            }
            Ok(Item::Query(symbols))
        }
        Some(_) => {
            let premise = parse_expr(cursor, arena)?;
            let kind = match cursor.peek().map(|t| t.kind) {
                Some(TokenKind::Implies) => {
                    cursor.next();
                    RuleKind::Implies
                }
                Some(TokenKind::Iff) => {
                    cursor.next();
                    RuleKind::Iff
                }
                _ => return Err(cursor.syntax_error("expected '=>' or '<=>'")),
            };
            let conclusion = parse_expr(cursor, arena)?;
            Ok(Item::Rule(Rule {
                premise,
                conclusion,
                kind,
            }))
        }
        None => Err(cursor.syntax_error("expected an item")),
    }
}

fn parse_symbol_star(cursor: &mut TokenCursor<'_, '_>) -> Vec<Symbol> {
    let mut symbols = Vec::new();
    while let Some(t) = cursor.peek() {
        match t.kind {
            TokenKind::Symbol(c) => {
                symbols.push(Symbol(c));
                cursor.next();
            }
            _ => break,
        }
    }
    symbols
}

fn parse_expr<'a, 's>(
    cursor: &mut TokenCursor<'_, 's>,
    arena: &'a Bump,
) -> Result<&'a Expression<'a>, EngineError> {
    parse_or(cursor, arena)
}

fn parse_or<'a, 's>(
    cursor: &mut TokenCursor<'_, 's>,
    arena: &'a Bump,
) -> Result<&'a Expression<'a>, EngineError> {
    let mut left = parse_xor(cursor, arena)?;
    while matches!(cursor.peek(), Some(t) if t.kind == TokenKind::Pipe) {
        cursor.next();
        let right = parse_xor(cursor, arena)?;
        left = arena.alloc(Expression::Or(left, right));
    }
    Ok(left)
}

fn parse_xor<'a, 's>(
    cursor: &mut TokenCursor<'_, 's>,
    arena: &'a Bump,
) -> Result<&'a Expression<'a>, EngineError> {
    let mut left = parse_and(cursor, arena)?;
    while matches!(cursor.peek(), Some(t) if t.kind == TokenKind::Caret) {
        cursor.next();
        let right = parse_and(cursor, arena)?;
        left = arena.alloc(Expression::Xor(left, right));
    }
    Ok(left)
}

fn parse_and<'a, 's>(
    cursor: &mut TokenCursor<'_, 's>,
    arena: &'a Bump,
) -> Result<&'a Expression<'a>, EngineError> {
    let mut left = parse_unary(cursor, arena)?;
    while matches!(cursor.peek(), Some(t) if t.kind == TokenKind::Plus) {
        cursor.next();
        let right = parse_unary(cursor, arena)?;
        left = arena.alloc(Expression::And(left, right));
    }
    Ok(left)
}

fn parse_unary<'a, 's>(
    cursor: &mut TokenCursor<'_, 's>,
    arena: &'a Bump,
) -> Result<&'a Expression<'a>, EngineError> {
    if matches!(cursor.peek(), Some(t) if t.kind == TokenKind::Bang) {
        cursor.next();
        let inner = parse_unary(cursor, arena)?;
        return Ok(arena.alloc(Expression::Not(inner)));
    }
    parse_atom(cursor, arena)
}

fn parse_atom<'a, 's>(
    cursor: &mut TokenCursor<'_, 's>,
    arena: &'a Bump,
) -> Result<&'a Expression<'a>, EngineError> {
    match cursor.peek().map(|t| t.kind) {
        Some(TokenKind::Symbol(c)) => {
            cursor.next();
            Ok(arena.alloc(Expression::Sym(Symbol(c))))
        }
        Some(TokenKind::LParen) => {
            cursor.next();
            let inner = parse_expr(cursor, arena)?;
            cursor.expect(TokenKind::RParen, "')'")?;
            Ok(inner)
        }
        _ => Err(cursor.syntax_error("expected a symbol or '('")),
    }
}
