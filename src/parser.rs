//! Recursive-descent parser for guard expressions.
//!
//! The parser works over an explicit token-index cursor: every parsing
//! function receives the index to start at and returns the parsed node
//! together with the index just past it. The two mutually recursive entry
//! points are [`Parser::parse_group`] (a connective chain, i.e. the body of a
//! parenthesized group) and [`Parser::parse_term`] (negation, comparison,
//! bare literal or variable, or a parenthesized group).
//!
//! Precedence, from tightest to loosest:
//!
//! ```text
//! ( ... )  >  !  >  == != > < >= <=  >  &&  >  ||  >  ->
//! ```
//!
//! `&&` and `||` associate to the left, `->` to the right.
//!
//! Both the nesting of the parser's own recursion and the height of the
//! produced tree are bounded by a maximum depth (see
//! [`Parser::with_max_depth`]), so every later tree walk stays within it.

use log::debug;

use crate::ast::{Arith, Expr};
use crate::config::DEFAULT_MAX_DEPTH;
use crate::error::{Expected, VerifyError};
use crate::factory::VarTable;
use crate::lexer::{normalize, tokenize, Operand, Token};
use crate::types::VarType;

type ParseResult<T> = Result<(T, usize), VerifyError>;

pub struct Parser<'t, 'v> {
    tokens: &'t [Token],
    table: &'v mut VarTable,
    max_depth: usize,
    /// Current recursion nesting.
    nesting: usize,
    /// Height of the tree returned by the last parsing function.
    height: usize,
}

impl<'t, 'v> Parser<'t, 'v> {
    pub fn new(tokens: &'t [Token], table: &'v mut VarTable) -> Self {
        Self {
            tokens,
            table,
            max_depth: DEFAULT_MAX_DEPTH,
            nesting: 0,
            height: 0,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn token(&self, at: usize) -> Option<&'t Token> {
        self.tokens.get(at)
    }

    fn error(&self, at: usize, expected: Expected) -> VerifyError {
        VerifyError::Parse {
            index: at,
            expected,
            found: self.token(at).map(|t| t.to_string()),
        }
    }

    fn is_comparison(&self, at: usize) -> bool {
        matches!(self.token(at), Some(Token::Cmp(_)))
    }

    fn too_deep(&self, at: usize) -> VerifyError {
        self.error(at, Expected::MaxDepth(self.max_depth))
    }

    /// Run `parse` one recursion level deeper.
    fn nested<T>(&mut self, at: usize, parse: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.nesting >= self.max_depth {
            return Err(self.too_deep(at));
        }
        self.nesting += 1;
        let res = parse(self);
        self.nesting -= 1;
        res
    }

    /// Record `height` as the height of the tree just built.
    fn set_height(&mut self, height: usize, at: usize) -> Result<(), VerifyError> {
        if height > self.max_depth {
            return Err(self.too_deep(at));
        }
        self.height = height;
        Ok(())
    }

    /// Parse the whole token sequence; trailing tokens are an error.
    pub fn parse(&mut self) -> Result<Expr, VerifyError> {
        let (expr, end) = self.parse_group(0)?;
        if end != self.tokens.len() {
            return Err(self.error(end, Expected::End));
        }
        Ok(expr)
    }

    /// Parse a connective chain starting at `at`.
    ///
    /// Stops before the first token that cannot continue the chain (a closing
    /// parenthesis, the end of input, or anything unexpected), leaving it to
    /// the caller to decide whether that token is acceptable.
    pub fn parse_group(&mut self, at: usize) -> ParseResult<Expr> {
        self.parse_implies(at)
    }

    fn parse_implies(&mut self, at: usize) -> ParseResult<Expr> {
        let (lhs, pos) = self.parse_or(at)?;
        if self.token(pos) == Some(&Token::Implies) {
            let lhs_height = self.height;
            let (rhs, end) = self.nested(pos + 1, |p| p.parse_implies(pos + 1))?;
            self.set_height(lhs_height.max(self.height) + 1, pos)?;
            return Ok((Expr::implies(lhs, rhs), end));
        }
        Ok((lhs, pos))
    }

    fn parse_or(&mut self, at: usize) -> ParseResult<Expr> {
        let (mut lhs, mut pos) = self.parse_and(at)?;
        while self.token(pos) == Some(&Token::Or) {
            let lhs_height = self.height;
            let (rhs, end) = self.parse_and(pos + 1)?;
            self.set_height(lhs_height.max(self.height) + 1, pos)?;
            lhs = Expr::or(lhs, rhs);
            pos = end;
        }
        Ok((lhs, pos))
    }

    fn parse_and(&mut self, at: usize) -> ParseResult<Expr> {
        let (mut lhs, mut pos) = self.parse_term(at)?;
        while self.token(pos) == Some(&Token::And) {
            let lhs_height = self.height;
            let (rhs, end) = self.parse_term(pos + 1)?;
            self.set_height(lhs_height.max(self.height) + 1, pos)?;
            lhs = Expr::and(lhs, rhs);
            pos = end;
        }
        Ok((lhs, pos))
    }

    /// Parse a single term starting at `at`.
    pub fn parse_term(&mut self, at: usize) -> ParseResult<Expr> {
        self.nested(at, |p| p.parse_term_inner(at))
    }

    fn parse_term_inner(&mut self, at: usize) -> ParseResult<Expr> {
        let Some(token) = self.token(at) else {
            return Err(self.error(at, Expected::Term));
        };
        match token {
            Token::Not => {
                let (inner, end) = self.parse_term(at + 1)?;
                self.set_height(self.height + 1, at)?;
                Ok((Expr::not(inner), end))
            }
            Token::LParen => {
                if let Some(end) = self.arith_group_end(at) {
                    if self.is_comparison(end) {
                        return self.parse_comparison(at);
                    }
                }
                let (inner, end) = self.parse_group(at + 1)?;
                if self.token(end) != Some(&Token::RParen) {
                    return Err(self.error(end, Expected::CloseParen));
                }
                if self.is_comparison(end + 1) {
                    // A group holding a connective cannot be compared.
                    return Err(self.error(end + 1, Expected::Connective));
                }
                Ok((inner, end + 1))
            }
            Token::Bool(b) => {
                if self.is_comparison(at + 1) {
                    return Err(self.error(at, Expected::Operand));
                }
                self.set_height(1, at)?;
                Ok((Expr::Lit(*b), at + 1))
            }
            Token::Ident(name) => {
                if self.is_comparison(at + 1) {
                    return self.parse_comparison(at);
                }
                let var = self.table.get_or_create(name, VarType::Boolean)?;
                self.set_height(1, at)?;
                Ok((Expr::Var(var), at + 1))
            }
            Token::Int(_) | Token::Arith(..) => {
                if self.is_comparison(at + 1) {
                    return self.parse_comparison(at);
                }
                Err(self.error(at + 1, Expected::Comparison))
            }
            _ => Err(self.error(at, Expected::Term)),
        }
    }

    /// Parse `operand cmp operand`.
    fn parse_comparison(&mut self, at: usize) -> ParseResult<Expr> {
        let (lhs, pos) = self.parse_operand(at)?;
        let Some(Token::Cmp(op)) = self.token(pos) else {
            return Err(self.error(pos, Expected::Comparison));
        };
        let (rhs, end) = self.parse_operand(pos + 1)?;
        if self.is_comparison(end) {
            return Err(self.error(end, Expected::Connective));
        }
        // Comparison, then at most one arithmetic combination, then leaves.
        self.set_height(3, at)?;
        Ok((Expr::compare(*op, lhs, rhs), end))
    }

    /// Parse an arithmetic operand, possibly wrapped in parentheses.
    pub fn parse_operand(&mut self, at: usize) -> ParseResult<Arith> {
        match self.token(at) {
            Some(Token::Int(n)) => Ok((Arith::Lit(*n), at + 1)),
            Some(Token::Ident(name)) => {
                let var = self.table.get_or_create(name, VarType::Integer)?;
                Ok((Arith::Var(var), at + 1))
            }
            Some(Token::Arith(a, op, b)) => {
                let lhs = self.resolve_operand(a)?;
                let rhs = self.resolve_operand(b)?;
                Ok((Arith::combine(*op, lhs, rhs), at + 1))
            }
            Some(Token::LParen) => {
                let (inner, end) = self.nested(at, |p| p.parse_operand(at + 1))?;
                if self.token(end) != Some(&Token::RParen) {
                    return Err(self.error(end, Expected::CloseParen));
                }
                Ok((inner, end + 1))
            }
            _ => Err(self.error(at, Expected::Operand)),
        }
    }

    fn resolve_operand(&mut self, operand: &Operand) -> Result<Arith, VerifyError> {
        match operand {
            Operand::Int(n) => Ok(Arith::Lit(*n)),
            Operand::Ident(name) => Ok(Arith::Var(self.table.get_or_create(name, VarType::Integer)?)),
        }
    }

    /// If the tokens at `at` form a parenthesized single operand such as
    /// `(x + 2)` or `((y))`, return the index just past the closing parenthesis.
    fn arith_group_end(&self, at: usize) -> Option<usize> {
        let mut depth = 0;
        let mut pos = at;
        while self.token(pos) == Some(&Token::LParen) {
            depth += 1;
            pos += 1;
        }
        if !self.token(pos)?.is_operand() {
            return None;
        }
        pos += 1;
        for _ in 0..depth {
            if self.token(pos) != Some(&Token::RParen) {
                return None;
            }
            pos += 1;
        }
        Some(pos)
    }
}

/// Normalize, tokenize and parse `text` against `table`.
pub fn parse_expr(text: &str, table: &mut VarTable) -> Result<Expr, VerifyError> {
    parse_expr_bounded(text, table, DEFAULT_MAX_DEPTH)
}

/// Like [`parse_expr`], with trees nested at most `max_depth` levels.
pub fn parse_expr_bounded(text: &str, table: &mut VarTable, max_depth: usize) -> Result<Expr, VerifyError> {
    let text = normalize(text);
    let tokens = tokenize(&text)?;
    let expr = Parser::new(&tokens, table).with_max_depth(max_depth).parse()?;
    debug!("parse({:?}) -> {}", text, expr.display(table));
    Ok(expr)
}
