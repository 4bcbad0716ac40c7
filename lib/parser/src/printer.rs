use scanner::Token;

use crate::{Expr, Visitor};

/// Renders a tree as fully parenthesized prefix notation, e.g. `(+ 1 (group (- 2)))`.
///
/// Every node shows up in the output, so two trees print the same exactly when
/// they have the same shape and lexemes.
#[derive(Debug, Default, Clone, Copy)]
pub struct AstPrinter;

impl<'a> Visitor<'a> for AstPrinter {
    type Output = String;

    fn visit_binary(&mut self, left: &Expr<'a>, operator: &Token<'a>, right: &Expr<'a>) -> String {
        format!("({} {} {})", operator, left.accept(self), right.accept(self))
    }

    fn visit_grouping(&mut self, expression: &Expr<'a>) -> String {
        format!("(group {})", expression.accept(self))
    }

    fn visit_unary(&mut self, operator: &Token<'a>, right: &Expr<'a>) -> String {
        format!("({} {})", operator, right.accept(self))
    }

    fn visit_literal(&mut self, value: &Token<'a>) -> String {
        value.lexeme().to_string()
    }
}

/// Renders a tree back into infix source that parses to the same tree.
///
/// Only groupings get parentheses, so `((1 - 2) - 3)` prints unchanged while the
/// tree of `1 - 2 - 3` prints as `1 - 2 - 3`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SourcePrinter;

impl<'a> Visitor<'a> for SourcePrinter {
    type Output = String;

    fn visit_binary(&mut self, left: &Expr<'a>, operator: &Token<'a>, right: &Expr<'a>) -> String {
        format!("{} {} {}", left.accept(self), operator, right.accept(self))
    }

    fn visit_grouping(&mut self, expression: &Expr<'a>) -> String {
        format!("({})", expression.accept(self))
    }

    fn visit_unary(&mut self, operator: &Token<'a>, right: &Expr<'a>) -> String {
        format!("{}{}", operator, right.accept(self))
    }

    fn visit_literal(&mut self, value: &Token<'a>) -> String {
        value.lexeme().to_string()
    }
}

impl Expr<'_> {
    pub fn to_source(&self) -> String {
        self.accept(&mut SourcePrinter)
    }
}
