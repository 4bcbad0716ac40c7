use std::fmt::Display;

use cursor::{Col, Cursor, Line};
use errors::{Location, LoxError, LoxErrors};
use itertools::Itertools;
use log::{trace, warn};

pub mod token;
pub use token::{Token, TokenData, TokenType};
use TokenData::*;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ScanErrorType {
    #[error("Unexpected character '{0}'.")]
    UnexpectedCharacter(char),
    #[error("Unterminated string.")]
    UnterminatedString,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("[line {line}] Error: {error}")]
pub struct ScanError {
    pub error: ScanErrorType,
    pub line: Line,
    pub col: Col,
}

impl From<ScanError> for LoxError {
    fn from(e: ScanError) -> Self {
        LoxError::new(e.line, Location::Line, e.error)
    }
}

#[derive(thiserror::Error, Debug, PartialEq, derive_more::Deref)]
pub struct ScanErrors(pub Vec<ScanError>);

impl Display for ScanErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().join("\n"))
    }
}

impl From<ScanErrors> for LoxErrors {
    fn from(errors: ScanErrors) -> Self {
        errors.0.into_iter().map(LoxError::from).collect()
    }
}

/// What to do with characters that can't start any token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanMode {
    /// Report them as [`ScanErrorType::UnexpectedCharacter`].
    #[default]
    Strict,
    /// Skip them.
    Lenient,
}

/// The scanned token sequence. Always ends with exactly one [`TokenType::Eof`] token.
#[derive(Debug, Clone, PartialEq, derive_more::Deref)]
pub struct Tokens<'a>(Vec<Token<'a>>);

pub struct Scanner<'a> {
    start: Cursor<'a>,
    current: Cursor<'a>,
    mode: ScanMode,
    tokens: Vec<Token<'a>>,
    errors: Vec<ScanError>,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            start: Cursor::new(source),
            current: Cursor::new(source),
            mode: ScanMode::default(),
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn with_mode(mut self, mode: ScanMode) -> Self {
        self.mode = mode;
        self
    }

    fn lexeme(&self) -> &'a str {
        self.start.slice_until(&self.current)
    }

    fn add_token(&mut self, data: TokenData<'a>) {
        let token = Token::new(data, self.lexeme(), self.start.line(), self.start.col());
        trace!("{:?}", token);
        self.tokens.push(token);
    }

    fn error(&mut self, error: ScanErrorType) {
        self.errors.push(ScanError { error, line: self.start.line(), col: self.start.col() });
    }

    fn add_token_if_followed_by_equal(&mut self, with_equal: TokenData<'a>, without: TokenData<'a>) {
        if self.current.next_if_eq('=') {
            self.add_token(with_equal)
        } else {
            self.add_token(without)
        }
    }

    pub fn scan_tokens(mut self) -> Result<Tokens<'a>, ScanErrors> {
        loop {
            self.start = self.current.clone();
            let Some(c) = self.current.next() else { break };
            match c {
                '(' => self.add_token(LeftParen),
                ')' => self.add_token(RightParen),
                '{' => self.add_token(LeftBrace),
                '}' => self.add_token(RightBrace),
                ',' => self.add_token(Comma),
                '.' => self.add_token(Dot),
                '-' => self.add_token(Minus),
                '+' => self.add_token(Plus),
                ';' => self.add_token(Semicolon),
                '*' => self.add_token(Star),

                '!' => self.add_token_if_followed_by_equal(BangEqual, Bang),
                '=' => self.add_token_if_followed_by_equal(EqualEqual, Equal),
                '<' => self.add_token_if_followed_by_equal(LessEqual, Less),
                '>' => self.add_token_if_followed_by_equal(GreaterEqual, Greater),

                '/' => {
                    if self.current.next_if_eq('/') {
                        // Comment, the newline is left for the next iteration
                        self.current.eat_while(|c| c != '\n');
                    } else {
                        self.add_token(Slash)
                    }
                }

                '"' => self.string(),

                d if d.is_ascii_digit() => self.number(),

                c if is_identifier_start(c) => self.identifier(),

                ' ' | '\r' | '\t' | '\n' => (),

                c => match self.mode {
                    ScanMode::Strict => self.error(ScanErrorType::UnexpectedCharacter(c)),
                    ScanMode::Lenient => {
                        warn!("Skipping unexpected character {c:?} on line {}", self.start.line())
                    }
                },
            }
        }

        self.tokens.push(Token::new(Eof, "", self.current.line(), self.current.col()));

        if self.errors.is_empty() {
            Ok(Tokens(self.tokens))
        } else {
            Err(ScanErrors(self.errors))
        }
    }

    fn string(&mut self) {
        self.current.eat_while(|c| c != '"');
        if !self.current.next_if_eq('"') {
            self.error(ScanErrorType::UnterminatedString);
            return;
        }

        let lexeme = self.lexeme();
        self.add_token(Str(&lexeme[1..lexeme.len() - 1]));
    }

    fn number(&mut self) {
        self.current.eat_while(|c| c.is_ascii_digit());

        // A trailing '.' without digits is not part of the number
        if self.current.peek() == Some('.')
            && self.current.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            self.current.next();
            self.current.eat_while(|c| c.is_ascii_digit());
        }

        let value = self
            .lexeme()
            .parse()
            .unwrap_or_else(|_| unreachable!("digits with an optional fraction are a valid f64"));
        self.add_token(Number(value))
    }

    fn identifier(&mut self) {
        self.current.eat_while(is_identifier_char);
        self.add_token(TokenData::keyword(self.lexeme()).unwrap_or(Identifier));
    }
}

fn is_identifier_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn is_identifier_char(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

pub fn scan(source: &str) -> Result<Tokens<'_>, ScanErrors> {
    Scanner::new(source).scan_tokens()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    use super::*;

    #[ctor::ctor]
    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn scanned(source: &str) -> Vec<(TokenType, &str, usize)> {
        scan(source).unwrap().iter().map(|t| (t.kind(), t.lexeme(), t.line().0)).collect()
    }

    #[test]
    fn single_char_tokens() {
        let source = "(){},.-+;*";
        let tokens = scan(source).unwrap();

        assert_eq!(tokens.len(), source.len() + 1);
        for (token, c) in tokens.iter().zip(source.chars()) {
            assert_eq!(token.lexeme(), c.to_string());
            assert_eq!(token.line(), Line(1));
        }
        assert_eq!(
            tokens.iter().map(Token::kind).collect::<Vec<_>>(),
            vec![
                TokenType::LeftParen,
                TokenType::RightParen,
                TokenType::LeftBrace,
                TokenType::RightBrace,
                TokenType::Comma,
                TokenType::Dot,
                TokenType::Minus,
                TokenType::Plus,
                TokenType::Semicolon,
                TokenType::Star,
                TokenType::Eof,
            ]
        );
        assert_eq!(tokens.last(), Some(&Token::new(Eof, "", Line(1), Col(11))));
    }

    #[test]
    fn two_char_tokens() {
        assert_eq!(
            scanned("! != = == < <= > >="),
            vec![
                (TokenType::Bang, "!", 1),
                (TokenType::BangEqual, "!=", 1),
                (TokenType::Equal, "=", 1),
                (TokenType::EqualEqual, "==", 1),
                (TokenType::Less, "<", 1),
                (TokenType::LessEqual, "<=", 1),
                (TokenType::Greater, ">", 1),
                (TokenType::GreaterEqual, ">=", 1),
                (TokenType::Eof, "", 1),
            ]
        );
        assert_eq!(
            scanned("!==>=="),
            vec![
                (TokenType::BangEqual, "!=", 1),
                (TokenType::Equal, "=", 1),
                (TokenType::GreaterEqual, ">=", 1),
                (TokenType::Equal, "=", 1),
                (TokenType::Eof, "", 1),
            ]
        );
    }

    #[test]
    fn numbers() {
        let tokens = scan("123 45.67").unwrap();
        assert_eq!(
            tokens.iter().map(|t| t.data.clone()).collect::<Vec<_>>(),
            vec![Number(123.0), Number(45.67), Eof]
        );
        assert_eq!(tokens[1].lexeme(), "45.67");
        assert_eq!(tokens[1].col(), Col(5));
    }

    #[test]
    fn long_numbers() {
        let digits = "9".repeat(400);
        let source = format!("{digits}.{digits}");
        let tokens = scan(&source).unwrap();
        assert_eq!(tokens[0].lexeme(), source);
        assert_eq!(tokens[0].data, Number(f64::INFINITY));

        let source = format!("0.{}1", "0".repeat(400));
        assert_eq!(scan(&source).unwrap()[0].data, Number(0.0));
    }

    #[test]
    fn trailing_dot_is_not_part_of_number() {
        assert_eq!(
            scanned("1. .5"),
            vec![
                (TokenType::Number, "1", 1),
                (TokenType::Dot, ".", 1),
                (TokenType::Dot, ".", 1),
                (TokenType::Number, "5", 1),
                (TokenType::Eof, "", 1),
            ]
        );
        assert_eq!(
            scanned("1.2.3"),
            vec![
                (TokenType::Number, "1.2", 1),
                (TokenType::Dot, ".", 1),
                (TokenType::Number, "3", 1),
                (TokenType::Eof, "", 1),
            ]
        );
    }

    #[test]
    fn string_literals() {
        let tokens = scan("\"hello\"").unwrap();
        assert_eq!(
            tokens.iter().cloned().collect::<Vec<_>>(),
            vec![
                Token::new(Str("hello"), "\"hello\"", Line(1), Col(1)),
                Token::new(Eof, "", Line(1), Col(8)),
            ]
        );

        let tokens = scan("\"\"").unwrap();
        assert_eq!(tokens[0].data, Str(""));
    }

    #[test]
    fn multiline_string_advances_line() {
        assert_eq!(
            scanned("\"one\ntwo\" +"),
            vec![
                (TokenType::Str, "\"one\ntwo\"", 1),
                (TokenType::Plus, "+", 2),
                (TokenType::Eof, "", 2),
            ]
        );
    }

    #[test]
    fn unterminated_string() {
        assert_eq!(
            scan("1 +\n\"hello world").unwrap_err(),
            ScanErrors(vec![ScanError {
                error: ScanErrorType::UnterminatedString,
                line: Line(2),
                col: Col(1),
            }])
        );
        assert_eq!(
            scan("\"hello\nworld\n").unwrap_err().to_string(),
            "[line 1] Error: Unterminated string."
        );
    }

    #[test]
    fn identifiers_and_keywords() {
        assert_eq!(
            scanned("var foo print"),
            vec![
                (TokenType::Var, "var", 1),
                (TokenType::Identifier, "foo", 1),
                (TokenType::Print, "print", 1),
                (TokenType::Eof, "", 1),
            ]
        );
        assert_eq!(
            scanned("_a1 orchid nil2 or"),
            vec![
                (TokenType::Identifier, "_a1", 1),
                (TokenType::Identifier, "orchid", 1),
                (TokenType::Identifier, "nil2", 1),
                (TokenType::Or, "or", 1),
                (TokenType::Eof, "", 1),
            ]
        );
    }

    #[test]
    fn every_keyword_is_recognized() {
        let keywords = TokenType::iter()
            .filter(|kind| {
                let lexeme = kind.to_string().to_lowercase();
                TokenData::keyword(&lexeme).map(|data| TokenType::from(&data)) == Some(*kind)
            })
            .collect::<Vec<_>>();
        assert_eq!(keywords.len(), 16);

        for kind in keywords {
            let source = kind.to_string().to_lowercase();
            assert_eq!(scanned(&source)[0], (kind, source.as_str(), 1));
        }
    }

    #[test]
    fn comments() {
        assert_eq!(
            scanned("a // comment\nb"),
            vec![
                (TokenType::Identifier, "a", 1),
                (TokenType::Identifier, "b", 2),
                (TokenType::Eof, "", 2),
            ]
        );
        assert_eq!(scanned("// only a comment"), vec![(TokenType::Eof, "", 1)]);
        assert_eq!(
            scanned("1 / 2 // 3 / 4\n\n5"),
            vec![
                (TokenType::Number, "1", 1),
                (TokenType::Slash, "/", 1),
                (TokenType::Number, "2", 1),
                (TokenType::Number, "5", 3),
                (TokenType::Eof, "", 3),
            ]
        );
    }

    #[test]
    fn comments_between_statements() {
        let kinds = scan("var a = 1; // this is a comment\nprint a;")
            .unwrap()
            .iter()
            .map(Token::kind)
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                TokenType::Var,
                TokenType::Identifier,
                TokenType::Equal,
                TokenType::Number,
                TokenType::Semicolon,
                TokenType::Print,
                TokenType::Identifier,
                TokenType::Semicolon,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn whitespace_and_lines() {
        assert_eq!(
            scanned(" \t\r\n\n  1\n"),
            vec![(TokenType::Number, "1", 3), (TokenType::Eof, "", 4)]
        );
        assert_eq!(scanned(""), vec![(TokenType::Eof, "", 1)]);
    }

    #[test]
    fn unexpected_characters() {
        let errors = scan("1 @ 2\n#").unwrap_err();
        assert_eq!(
            errors,
            ScanErrors(vec![
                ScanError {
                    error: ScanErrorType::UnexpectedCharacter('@'),
                    line: Line(1),
                    col: Col(3),
                },
                ScanError {
                    error: ScanErrorType::UnexpectedCharacter('#'),
                    line: Line(2),
                    col: Col(1),
                },
            ])
        );
        assert_eq!(
            LoxErrors::from(errors).to_string(),
            "[line 1] Error: Unexpected character '@'.\n[line 2] Error: Unexpected character '#'."
        );
    }

    #[test]
    fn lenient_mode_skips_unexpected_characters() {
        let tokens = Scanner::new("1 @ 2").with_mode(ScanMode::Lenient).scan_tokens().unwrap();
        assert_eq!(
            tokens.iter().map(|t| (t.kind(), t.lexeme())).collect::<Vec<_>>(),
            vec![(TokenType::Number, "1"), (TokenType::Number, "2"), (TokenType::Eof, "")]
        );

        // Only unexpected characters are forgiven
        assert!(Scanner::new("\"abc").with_mode(ScanMode::Lenient).scan_tokens().is_err());
    }
}
