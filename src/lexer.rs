//! Tokenizer for guard expressions.
//!
//! Two-character operators win over their one-character prefixes, and a
//! fragment `operand (+|-) operand` is kept as a single [`Token::Arith`], so
//! `x-1` is a subtraction while in `x < -1` the minus binds to the literal.

use std::fmt;

use log::debug;

use crate::ast::{ArithOp, CmpOp};
use crate::error::VerifyError;
use crate::infer::is_bool_literal;

/// An atomic operand inside an arithmetic fragment.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Operand {
    Ident(String),
    Int(i64),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Ident(name) => write!(f, "{}", name),
            Operand::Int(n) => write!(f, "{}", n),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Token {
    LParen,
    RParen,
    And,
    Or,
    Implies,
    Not,
    Cmp(CmpOp),
    /// A `+` outside of an arithmetic fragment.
    Plus,
    /// A `-` that is neither a subtraction in a fragment nor a literal sign.
    Minus,
    Bool(bool),
    Int(i64),
    Ident(String),
    Arith(Operand, ArithOp, Operand),
}

impl Token {
    /// Whether the token can serve as an arithmetic operand on its own.
    pub fn is_operand(&self) -> bool {
        matches!(self, Token::Int(_) | Token::Ident(_) | Token::Arith(..))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::And => write!(f, "&&"),
            Token::Or => write!(f, "||"),
            Token::Implies => write!(f, "->"),
            Token::Not => write!(f, "!"),
            Token::Cmp(op) => write!(f, "{}", op.symbol()),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Bool(b) => write!(f, "{}", b),
            Token::Int(n) => write!(f, "{}", n),
            Token::Ident(name) => write!(f, "{}", name),
            Token::Arith(a, op, b) => write!(f, "{}{}{}", a, op.symbol(), b),
        }
    }
}

/// Collapse runs of whitespace (including newlines) into single spaces.
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Turn an expression into a token sequence.
pub fn tokenize(input: &str) -> Result<Vec<Token>, VerifyError> {
    let tokens = Lexer::new(input).run()?;
    debug!("tokenize({:?}) -> {:?}", input, tokens);
    Ok(tokens)
}

struct Lexer<'a> {
    input: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().collect(),
            pos: 0,
            tokens: Vec::new(),
        }
    }

    fn peek_at(&self, pos: usize) -> Option<char> {
        self.chars.get(pos).map(|&(_, c)| c)
    }

    fn offset(&self, pos: usize) -> usize {
        self.chars.get(pos).map_or(self.input.len(), |&(i, _)| i)
    }

    fn skip_ws_from(&self, mut pos: usize) -> usize {
        while self.peek_at(pos).is_some_and(|c| c.is_whitespace()) {
            pos += 1;
        }
        pos
    }

    fn prev_is_operand(&self) -> bool {
        matches!(
            self.tokens.last(),
            Some(Token::Int(_) | Token::Ident(_) | Token::Bool(_) | Token::Arith(..) | Token::RParen)
        )
    }

    fn run(mut self) -> Result<Vec<Token>, VerifyError> {
        loop {
            self.pos = self.skip_ws_from(self.pos);
            let Some(c) = self.peek_at(self.pos) else {
                break;
            };
            let next = self.peek_at(self.pos + 1);

            let two = match (c, next) {
                ('&', Some('&')) => Some(Token::And),
                ('|', Some('|')) => Some(Token::Or),
                ('-', Some('>')) => Some(Token::Implies),
                ('=', Some('=')) => Some(Token::Cmp(CmpOp::Eq)),
                ('!', Some('=')) => Some(Token::Cmp(CmpOp::Neq)),
                ('>', Some('=')) => Some(Token::Cmp(CmpOp::Geq)),
                ('<', Some('=')) => Some(Token::Cmp(CmpOp::Leq)),
                _ => None,
            };
            if let Some(token) = two {
                self.tokens.push(token);
                self.pos += 2;
                continue;
            }

            match c {
                '(' => self.single(Token::LParen),
                ')' => self.single(Token::RParen),
                '&' => self.single(Token::And),
                '|' => self.single(Token::Or),
                '!' => self.single(Token::Not),
                '>' => self.single(Token::Cmp(CmpOp::Gt)),
                '<' => self.single(Token::Cmp(CmpOp::Lt)),
                '=' => self.single(Token::Cmp(CmpOp::Eq)),
                '+' => self.single(Token::Plus),
                '-' => {
                    let after = self.skip_ws_from(self.pos + 1);
                    let signed_literal = !self.prev_is_operand() && self.peek_at(after).is_some_and(|c| c.is_ascii_digit());
                    if signed_literal {
                        let (value, end) = self.lex_int(self.pos)?;
                        self.pos = end;
                        self.push_operand(Operand::Int(value))?;
                    } else {
                        self.single(Token::Minus);
                    }
                }
                c if c.is_ascii_digit() => {
                    let (value, end) = self.lex_int(self.pos)?;
                    self.pos = end;
                    self.push_operand(Operand::Int(value))?;
                }
                c if c.is_ascii_alphabetic() || c == '_' => {
                    let (word, end) = self.lex_word(self.pos);
                    self.pos = end;
                    if is_bool_literal(&word) {
                        self.tokens.push(Token::Bool(word.eq_ignore_ascii_case("true")));
                    } else {
                        self.push_operand(Operand::Ident(word))?;
                    }
                }
                _ => {
                    return Err(VerifyError::Tokenize {
                        ch: c,
                        pos: self.offset(self.pos),
                    });
                }
            }
        }
        Ok(self.tokens)
    }

    fn single(&mut self, token: Token) {
        self.tokens.push(token);
        self.pos += 1;
    }

    fn lex_word(&self, start: usize) -> (String, usize) {
        let mut end = start;
        while self.peek_at(end).is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.') {
            end += 1;
        }
        let word = self.chars[start..end].iter().map(|&(_, c)| c).collect();
        (word, end)
    }

    /// Lex an integer literal with an optional leading `-` (whitespace allowed after the sign).
    fn lex_int(&self, start: usize) -> Result<(i64, usize), VerifyError> {
        let mut pos = start;
        let negative = self.peek_at(pos) == Some('-');
        if negative {
            pos = self.skip_ws_from(pos + 1);
        }
        let digits_start = pos;
        while self.peek_at(pos).is_some_and(|c| c.is_ascii_digit()) {
            pos += 1;
        }
        let digits: String = self.chars[digits_start..pos].iter().map(|&(_, c)| c).collect();
        let text = if negative { format!("-{}", digits) } else { digits };
        let value = text.parse::<i64>().map_err(|_| VerifyError::Tokenize {
            ch: self.peek_at(digits_start).unwrap_or('-'),
            pos: self.offset(digits_start),
        })?;
        Ok((value, pos))
    }

    /// Try to lex `(+|-) operand` right after an operand.
    fn lex_fragment_tail(&self, start: usize) -> Result<Option<(ArithOp, Operand, usize)>, VerifyError> {
        let pos = self.skip_ws_from(start);
        let op = match (self.peek_at(pos), self.peek_at(pos + 1)) {
            (Some('+'), _) => ArithOp::Add,
            (Some('-'), Some('>')) => return Ok(None),
            (Some('-'), _) => ArithOp::Sub,
            _ => return Ok(None),
        };
        let pos = self.skip_ws_from(pos + 1);
        match self.peek_at(pos) {
            Some(c) if c.is_ascii_digit() => {
                let (value, end) = self.lex_int(pos)?;
                Ok(Some((op, Operand::Int(value), end)))
            }
            Some('-') if self.peek_at(self.skip_ws_from(pos + 1)).is_some_and(|c| c.is_ascii_digit()) => {
                let (value, end) = self.lex_int(pos)?;
                Ok(Some((op, Operand::Int(value), end)))
            }
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                let (word, end) = self.lex_word(pos);
                if is_bool_literal(&word) {
                    return Ok(None);
                }
                Ok(Some((op, Operand::Ident(word), end)))
            }
            _ => Ok(None),
        }
    }

    fn push_operand(&mut self, lhs: Operand) -> Result<(), VerifyError> {
        match self.lex_fragment_tail(self.pos)? {
            Some((op, rhs, end)) => {
                self.pos = end;
                self.tokens.push(Token::Arith(lhs, op, rhs));
            }
            None => self.tokens.push(match lhs {
                Operand::Ident(name) => Token::Ident(name),
                Operand::Int(n) => Token::Int(n),
            }),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn ident(name: &str) -> Token {
        Token::Ident(name.to_string())
    }

    fn arith(a: Operand, op: ArithOp, b: Operand) -> Token {
        Token::Arith(a, op, b)
    }

    fn var(name: &str) -> Operand {
        Operand::Ident(name.to_string())
    }

    #[test]
    fn test_connectives() {
        let tokens = tokenize("a && b || !c -> d").unwrap();
        assert_eq!(
            tokens,
            vec![
                ident("a"),
                Token::And,
                ident("b"),
                Token::Or,
                Token::Not,
                ident("c"),
                Token::Implies,
                ident("d"),
            ]
        );
    }

    #[test]
    fn test_two_char_before_one_char() {
        let tokens = tokenize("a>=1&b<=2|c!=3").unwrap();
        assert_eq!(
            tokens,
            vec![
                ident("a"),
                Token::Cmp(CmpOp::Geq),
                Token::Int(1),
                Token::And,
                ident("b"),
                Token::Cmp(CmpOp::Leq),
                Token::Int(2),
                Token::Or,
                ident("c"),
                Token::Cmp(CmpOp::Neq),
                Token::Int(3),
            ]
        );
        assert_eq!(tokenize("x = 1").unwrap()[1], Token::Cmp(CmpOp::Eq));
    }

    #[test]
    fn test_subtraction_vs_negative_literal() {
        assert_eq!(tokenize("x-1").unwrap(), vec![arith(var("x"), ArithOp::Sub, Operand::Int(1))]);
        assert_eq!(
            tokenize("x < -1").unwrap(),
            vec![ident("x"), Token::Cmp(CmpOp::Lt), Token::Int(-1)]
        );
        assert_eq!(
            tokenize("x < - 1").unwrap(),
            vec![ident("x"), Token::Cmp(CmpOp::Lt), Token::Int(-1)]
        );
        assert_eq!(
            tokenize("-5 == y").unwrap(),
            vec![Token::Int(-5), Token::Cmp(CmpOp::Eq), ident("y")]
        );
    }

    #[test]
    fn test_arith_fragments() {
        let tokens = tokenize("(dw.t + 2) == y - z").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::LParen,
                arith(var("dw.t"), ArithOp::Add, Operand::Int(2)),
                Token::RParen,
                Token::Cmp(CmpOp::Eq),
                arith(var("y"), ArithOp::Sub, var("z")),
            ]
        );
        assert_eq!(
            tokenize("x - -3").unwrap(),
            vec![arith(var("x"), ArithOp::Sub, Operand::Int(-3))]
        );
    }

    #[test]
    fn test_implication_after_operand() {
        let tokens = tokenize("a->b").unwrap();
        assert_eq!(tokens, vec![ident("a"), Token::Implies, ident("b")]);
    }

    #[test]
    fn test_stray_plus_and_minus() {
        let tokens = tokenize("x + y + z").unwrap();
        assert_eq!(
            tokens,
            vec![arith(var("x"), ArithOp::Add, var("y")), Token::Plus, ident("z")]
        );
        assert_eq!(tokenize("- a").unwrap(), vec![Token::Minus, ident("a")]);
    }

    #[test]
    fn test_bool_literals() {
        assert_eq!(
            tokenize("True || false").unwrap(),
            vec![Token::Bool(true), Token::Or, Token::Bool(false)]
        );
    }

    #[test]
    fn test_unrecognized_character() {
        let err = tokenize("a && b # c").unwrap_err();
        assert_eq!(err, VerifyError::Tokenize { ch: '#', pos: 7 });
    }

    #[test]
    fn test_literal_overflow() {
        let err = tokenize("x == 99999999999999999999").unwrap_err();
        assert!(matches!(err, VerifyError::Tokenize { ch: '9', pos: 5 }));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  a &&\n   b\t|| c  "), "a && b || c");
    }
}
