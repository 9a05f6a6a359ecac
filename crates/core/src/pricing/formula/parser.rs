//! Recursive-descent parser producing the formula syntax tree.
//!
//! Precedence, lowest first: ternary, `||`, `&&`, equality, comparison,
//! additive, multiplicative, unary.

use rust_decimal::Decimal;

use super::lexer::{Spanned, Token};
use super::FormulaError;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(Decimal),
    Text(String),
    Bool(bool),
    Var(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Conditional {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

pub fn parse(tokens: &[Spanned], source_len: usize) -> Result<Expr, FormulaError> {
    let mut parser = Parser {
        tokens,
        cursor: 0,
        source_len,
    };
    if tokens.is_empty() {
        return Err(FormulaError::Syntax {
            pos: 0,
            message: "empty formula".to_string(),
        });
    }
    let expr = parser.conditional()?;
    if let Some(extra) = parser.peek_spanned() {
        return Err(FormulaError::Syntax {
            pos: extra.pos,
            message: format!("unexpected token {:?}", extra.token),
        });
    }
    Ok(expr)
}

struct Parser<'a> {
    tokens: &'a [Spanned],
    cursor: usize,
    source_len: usize,
}

impl<'a> Parser<'a> {
    fn peek_spanned(&self) -> Option<&'a Spanned> {
        self.tokens.get(self.cursor)
    }

    fn peek(&self) -> Option<&'a Token> {
        self.peek_spanned().map(|s| &s.token)
    }

    fn position(&self) -> usize {
        self.peek_spanned()
            .map(|s| s.pos)
            .unwrap_or(self.source_len)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.peek();
        if token.is_some() {
            self.cursor += 1;
        }
        token
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<(), FormulaError> {
        if self.peek() == Some(&expected) {
            self.cursor += 1;
            Ok(())
        } else {
            Err(FormulaError::Syntax {
                pos: self.position(),
                message: format!("expected {}", what),
            })
        }
    }

    fn conditional(&mut self) -> Result<Expr, FormulaError> {
        let condition = self.or()?;
        if self.peek() != Some(&Token::Question) {
            return Ok(condition);
        }
        self.cursor += 1;
        let then = self.conditional()?;
        self.expect(Token::Colon, "':' in conditional expression")?;
        let otherwise = self.conditional()?;
        Ok(Expr::Conditional {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    fn or(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.and()?;
        while self.peek() == Some(&Token::OrOr) {
            self.cursor += 1;
            let right = self.and()?;
            left = Expr::Binary(BinaryOp::Or, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.equality()?;
        while self.peek() == Some(&Token::AndAnd) {
            self.cursor += 1;
            let right = self.equality()?;
            left = Expr::Binary(BinaryOp::And, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn equality(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.comparison()?;
        loop {
            let op = match self.peek() {
                Some(Token::EqEq) => BinaryOp::Eq,
                Some(Token::NotEq) => BinaryOp::NotEq,
                _ => return Ok(left),
            };
            self.cursor += 1;
            let right = self.comparison()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn comparison(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::Lt) => BinaryOp::Lt,
                Some(Token::Le) => BinaryOp::Le,
                Some(Token::Gt) => BinaryOp::Gt,
                Some(Token::Ge) => BinaryOp::Ge,
                _ => return Ok(left),
            };
            self.cursor += 1;
            let right = self.additive()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn additive(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.cursor += 1;
            let right = self.multiplicative()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn multiplicative(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => return Ok(left),
            };
            self.cursor += 1;
            let right = self.unary()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn unary(&mut self) -> Result<Expr, FormulaError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.cursor += 1;
                Ok(Expr::Unary(UnaryOp::Neg, Box::new(self.unary()?)))
            }
            Some(Token::Bang) => {
                self.cursor += 1;
                Ok(Expr::Unary(UnaryOp::Not, Box::new(self.unary()?)))
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Expr, FormulaError> {
        let pos = self.position();
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Number(*n)),
            Some(Token::Text(s)) => Ok(Expr::Text(s.clone())),
            Some(Token::True) => Ok(Expr::Bool(true)),
            Some(Token::False) => Ok(Expr::Bool(false)),
            Some(Token::Ident(name)) => Ok(Expr::Var(name.clone())),
            Some(Token::LParen) => {
                let inner = self.conditional()?;
                self.expect(Token::RParen, "')'")?;
                Ok(inner)
            }
            Some(other) => Err(FormulaError::Syntax {
                pos,
                message: format!("unexpected token {:?}", other),
            }),
            None => Err(FormulaError::Syntax {
                pos,
                message: "unexpected end of formula".to_string(),
            }),
        }
    }
}
