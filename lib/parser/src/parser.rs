mod expr;
mod printer;

use std::fmt::Display;

use errors::{Location, LoxError};
use log::{debug, trace};
use scanner::{ScanMode, Scanner, Token, TokenType, Tokens};

pub use expr::{Expr, LiteralValue, Visitor};
pub use printer::{AstPrinter, SourcePrinter};

use TokenType::*;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SyntaxErrorType {
    #[error("Expect expression.")]
    ExpectedExpression,
    #[error("Expect ')' after expression.")]
    ExpectedRightParen,
    #[error("Expect end of expression.")]
    ExpectedEnd,
    #[error("Expression nests too deeply.")]
    TooDeeplyNested,
}

/// How many unary operators and groupings may enclose each other.
pub const MAX_NESTING: usize = 100;

/// The first point at which the tokens stopped matching the grammar.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub struct SyntaxError<'a> {
    pub error: SyntaxErrorType,
    pub token: Token<'a>,
}

impl<'a> From<SyntaxError<'a>> for LoxError {
    fn from(e: SyntaxError<'a>) -> Self {
        let location =
            if e.token.is_eof() { Location::End } else { Location::At(e.token.lexeme().to_string()) };
        LoxError::new(e.token.line(), location, e.error)
    }
}

impl Display for SyntaxError<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", LoxError::from(self.clone()))
    }
}

pub type Result<'a, T> = std::result::Result<T, SyntaxError<'a>>;

/// Recursive descent parser for a single expression.
///
/// Never moves past the trailing Eof token, so `peek` always has a token to return.
#[derive(Debug)]
pub struct Parser<'t, 'a> {
    tokens: &'t [Token<'a>],
    current: usize,
    depth: usize,
}

impl<'t, 'a> Parser<'t, 'a> {
    pub fn new(tokens: &'t Tokens<'a>) -> Self {
        Self { tokens, current: 0, depth: 0 }
    }

    /// Parses the whole token sequence as one expression.
    pub fn parse(mut self) -> Result<'a, Expr<'a>> {
        let expr = self.expression()?;
        if !self.is_at_end() {
            return Err(self.error(SyntaxErrorType::ExpectedEnd));
        }

        debug!("Parsed {}", expr);
        Ok(expr)
    }

    fn expression(&mut self) -> Result<'a, Expr<'a>> {
        self.equality()
    }

    fn equality(&mut self) -> Result<'a, Expr<'a>> {
        let mut expr = self.comparison()?;

        while let Some(operator) = self.match_any(&[BangEqual, EqualEqual]) {
            let right = Box::new(self.comparison()?);
            expr = Expr::Binary { left: Box::new(expr), operator, right }
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<'a, Expr<'a>> {
        let mut expr = self.additive()?;

        while let Some(operator) = self.match_any(&[Greater, GreaterEqual, Less, LessEqual]) {
            let right = Box::new(self.additive()?);
            expr = Expr::Binary { left: Box::new(expr), operator, right }
        }
        Ok(expr)
    }

    fn additive(&mut self) -> Result<'a, Expr<'a>> {
        let mut expr = self.multiplicative()?;

        while let Some(operator) = self.match_any(&[Plus, Minus]) {
            let right = Box::new(self.multiplicative()?);
            expr = Expr::Binary { left: Box::new(expr), operator, right }
        }
        Ok(expr)
    }

    fn multiplicative(&mut self) -> Result<'a, Expr<'a>> {
        let mut expr = self.unary()?;

        while let Some(operator) = self.match_any(&[Star, Slash]) {
            let right = Box::new(self.unary()?);
            expr = Expr::Binary { left: Box::new(expr), operator, right }
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<'a, Expr<'a>> {
        if let Some(operator) = self.match_any(&[Bang, Minus]) {
            let right = Box::new(self.nested(Self::unary)?);
            return Ok(Expr::Unary { operator, right });
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<'a, Expr<'a>> {
        if let Some(value) = self.match_any(&[False, True, Nil, Number, Str]) {
            return Ok(Expr::Literal(value));
        }

        if self.match_any(&[LeftParen]).is_some() {
            let expr = self.nested(Self::expression)?;
            self.consume(RightParen, SyntaxErrorType::ExpectedRightParen)?;
            return Ok(Expr::Grouping(Box::new(expr)));
        }

        Err(self.error(SyntaxErrorType::ExpectedExpression))
    }
}

// Helpers
impl<'t, 'a> Parser<'t, 'a> {
    /// Runs `rule` one nesting level deeper, so deep input fails with an error
    /// instead of overflowing the stack.
    fn nested(&mut self, rule: fn(&mut Self) -> Result<'a, Expr<'a>>) -> Result<'a, Expr<'a>> {
        if self.depth >= MAX_NESTING {
            return Err(self.error(SyntaxErrorType::TooDeeplyNested));
        }
        self.depth += 1;
        let expr = rule(self);
        self.depth -= 1;
        expr
    }

    fn peek(&self) -> &Token<'a> {
        &self.tokens[self.current]
    }

    fn is_at_end(&self) -> bool {
        self.peek().is_eof()
    }

    fn check(&self, kind: TokenType) -> bool {
        !self.is_at_end() && self.peek().kind() == kind
    }

    fn advance(&mut self) -> Token<'a> {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        trace!("Consumed {:?} on line {}", token.kind(), token.line());
        token
    }

    fn match_any(&mut self, kinds: &[TokenType]) -> Option<Token<'a>> {
        kinds.iter().any(|kind| self.check(*kind)).then(|| self.advance())
    }

    fn consume(&mut self, kind: TokenType, error: SyntaxErrorType) -> Result<'a, Token<'a>> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(error))
        }
    }

    fn error(&self, error: SyntaxErrorType) -> SyntaxError<'a> {
        SyntaxError { error, token: self.peek().clone() }
    }
}

pub fn parse<'a>(tokens: &Tokens<'a>) -> Result<'a, Expr<'a>> {
    Parser::new(tokens).parse()
}

/// Scans and parses `source`. Parsing is skipped if scanning reported any error.
pub fn parse_source(source: &str, mode: ScanMode) -> errors::Result<Expr<'_>> {
    let tokens = Scanner::new(source).with_mode(mode).scan_tokens()?;
    Ok(parse(&tokens).map_err(LoxError::from)?)
}
