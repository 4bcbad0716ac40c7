use std::fmt::{self, Display, Formatter};

use scanner::{Token, TokenData};

use crate::printer::AstPrinter;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'a> {
    Binary { left: Box<Expr<'a>>, operator: Token<'a>, right: Box<Expr<'a>> },
    Grouping(Box<Expr<'a>>),
    Unary { operator: Token<'a>, right: Box<Expr<'a>> },
    Literal(Token<'a>),
}

/// A traversal over an [`Expr`] tree, one handler per node variant.
///
/// Visitors decide themselves whether and in which order to descend into
/// children, by calling [`Expr::accept`] on them.
pub trait Visitor<'a> {
    type Output;

    fn visit_binary(&mut self, left: &Expr<'a>, operator: &Token<'a>, right: &Expr<'a>)
        -> Self::Output;
    fn visit_grouping(&mut self, expression: &Expr<'a>) -> Self::Output;
    fn visit_unary(&mut self, operator: &Token<'a>, right: &Expr<'a>) -> Self::Output;
    fn visit_literal(&mut self, value: &Token<'a>) -> Self::Output;
}

impl<'a> Expr<'a> {
    pub fn accept<V: Visitor<'a>>(&self, visitor: &mut V) -> V::Output {
        match self {
            Expr::Binary { left, operator, right } => visitor.visit_binary(left, operator, right),
            Expr::Grouping(expression) => visitor.visit_grouping(expression),
            Expr::Unary { operator, right } => visitor.visit_unary(operator, right),
            Expr::Literal(value) => visitor.visit_literal(value),
        }
    }
}

impl Display for Expr<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.accept(&mut AstPrinter))
    }
}

/// The runtime value a literal token denotes.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue<'a> {
    Number(f64),
    Str(&'a str),
    Boolean(bool),
    Nil,
}

impl<'a> LiteralValue<'a> {
    /// `None` if the token isn't a literal.
    pub fn from_token(token: &Token<'a>) -> Option<Self> {
        Some(match token.data {
            TokenData::Number(n) => LiteralValue::Number(n),
            TokenData::Str(s) => LiteralValue::Str(s),
            TokenData::True => LiteralValue::Boolean(true),
            TokenData::False => LiteralValue::Boolean(false),
            TokenData::Nil => LiteralValue::Nil,
            _ => return None,
        })
    }
}

impl<'a> Display for LiteralValue<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Number(n) => write!(f, "{n}"),
            LiteralValue::Str(s) => write!(f, "{s}"),
            LiteralValue::Boolean(b) => write!(f, "{b}"),
            LiteralValue::Nil => write!(f, "nil"),
        }
    }
}
