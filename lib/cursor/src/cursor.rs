use std::{fmt::Formatter, str::Chars};

use derive_more::Display;

/// A position in a source string that tracks the line and column of the next
/// character it will yield.
#[derive(Clone)]
pub struct Cursor<'a> {
    source: &'a str,
    chars: Chars<'a>,
    line: Line,
    col: Col,
}

impl<'a> std::fmt::Debug for Cursor<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // Printing source and chars is usually to verbose, so by default
        // we only print line/col
        if f.alternate() {
            f.debug_struct("Cursor")
                .field("line", &self.line)
                .field("col", &self.col)
                .field("rest", &self.chars.as_str())
                .finish()
        } else {
            f.debug_struct("Cursor").field("line", &self.line).field("col", &self.col).finish()
        }
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Line(pub usize);

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Col(pub usize);

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, chars: source.chars(), line: Line(1), col: Col(1) }
    }

    pub fn line(&self) -> Line {
        self.line
    }

    pub fn col(&self) -> Col {
        self.col
    }

    pub fn is_at_end(&self) -> bool {
        self.chars.as_str().is_empty()
    }
}

impl<'a> From<&'a str> for Cursor<'a> {
    fn from(source: &'a str) -> Self {
        Self::new(source)
    }
}

impl<'a> Iterator for Cursor<'a> {
    type Item = char;

    fn next(&mut self) -> Option<Self::Item> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line.0 += 1;
            self.col = Col(1);
        } else {
            self.col.0 += 1;
        }
        Some(c)
    }
}

impl<'a> Cursor<'a> {
    /// The source text between `self` and a cursor that was advanced from it.
    pub fn slice_until<'c>(&self, end: &'c Cursor<'a>) -> &'a str {
        debug_assert!(self.source == end.source);
        let start = self.source.len() - self.chars.as_str().len();
        let end = self.source.len() - end.chars.as_str().len();
        &self.source[start..end]
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    pub fn peek_next(&self) -> Option<char> {
        self.chars.clone().nth(1)
    }

    /// Consumes the next character only if it equals `expected`.
    pub fn next_if_eq(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.next();
            true
        } else {
            false
        }
    }

    /// Consumes characters while `predicate` holds, stopping in front of the
    /// first one that doesn't (or at the end of the source).
    pub fn eat_while(&mut self, predicate: impl Fn(char) -> bool) {
        while matches!(self.peek(), Some(c) if predicate(c)) {
            self.next();
        }
    }
}
