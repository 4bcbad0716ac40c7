use std::fmt::Display;

use cursor::{Col, Line};
use strum_macros::EnumDiscriminants;

#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub data: TokenData<'a>,
    pub lexeme: &'a str,
    pub line: Line,
    pub col: Col,
}

impl<'a> Token<'a> {
    pub fn new(data: TokenData<'a>, lexeme: &'a str, line: Line, col: Col) -> Token<'a> {
        Self { data, lexeme, line, col }
    }

    pub fn kind(&self) -> TokenType {
        TokenType::from(&self.data)
    }

    pub fn lexeme(&self) -> &'a str {
        self.lexeme
    }

    pub fn line(&self) -> Line {
        self.line
    }

    pub fn col(&self) -> Col {
        self.col
    }

    pub fn is_eof(&self) -> bool {
        self.data == TokenData::Eof
    }
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.lexeme)
    }
}

/// Token payload. [`TokenType`] is the same set of kinds without the payload.
#[derive(Debug, Clone, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(TokenType), derive(strum_macros::Display, strum_macros::EnumIter, Hash))]
pub enum TokenData<'a> {
    // Single-character tokens.
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,

    // One or two character tokens.
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals.
    Identifier,
    /// String contents, without the surrounding quotes.
    Str(&'a str),
    Number(f64),

    // Keywords.
    And,
    Class,
    Else,
    False,
    Fun,
    For,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,
    Eof,
}

impl TokenData<'_> {
    pub fn keyword(lexeme: &str) -> Option<Self> {
        use TokenData::*;
        Some(match lexeme {
            "and" => And,
            "class" => Class,
            "else" => Else,
            "false" => False,
            "for" => For,
            "fun" => Fun,
            "if" => If,
            "nil" => Nil,
            "or" => Or,
            "print" => Print,
            "return" => Return,
            "super" => Super,
            "this" => This,
            "true" => True,
            "var" => Var,
            "while" => While,
            _ => return None,
        })
    }
}
