use std::fmt::{self, Display, Formatter};

use cursor::Line;
use itertools::Itertools;

/// Where on its line an error was detected.
#[derive(Clone, Debug, PartialEq)]
pub enum Location {
    /// Only the line is known, e.g. for scan errors.
    Line,
    /// At a specific lexeme.
    At(String),
    /// At the end of the input.
    End,
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Location::Line => Ok(()),
            Location::At(lexeme) => write!(f, " at '{lexeme}'"),
            Location::End => write!(f, " at end"),
        }
    }
}

/// A diagnostic as it is presented to the user of the front end.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
#[error("[line {line}] Error{location}: {message}")]
pub struct LoxError {
    pub line: Line,
    pub location: Location,
    pub message: String,
}

impl LoxError {
    pub fn new(line: Line, location: Location, message: impl ToString) -> Self {
        Self { line, location, message: message.to_string() }
    }
}

#[derive(thiserror::Error, Debug, Default, PartialEq, derive_more::Deref)]
pub struct LoxErrors(pub Vec<LoxError>);

impl From<LoxError> for LoxErrors {
    fn from(e: LoxError) -> Self {
        Self(vec![e])
    }
}

impl FromIterator<LoxError> for LoxErrors {
    fn from_iter<I: IntoIterator<Item = LoxError>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Display for LoxErrors {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.0.iter().join("\n"))
    }
}

pub type Result<T> = std::result::Result<T, LoxErrors>;

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            LoxError::new(Line(3), Location::At("*".to_string()), "Expect expression.")
                .to_string(),
            "[line 3] Error at '*': Expect expression."
        );
        assert_eq!(
            LoxError::new(Line(1), Location::End, "Expect ')' after expression.").to_string(),
            "[line 1] Error at end: Expect ')' after expression."
        );
        assert_eq!(
            LoxError::new(Line(2), Location::Line, "Unexpected character '@'.").to_string(),
            "[line 2] Error: Unexpected character '@'."
        );
    }

    #[test]
    fn multiple_errors_are_joined_by_lines() {
        let errors: LoxErrors = [
            LoxError::new(Line(1), Location::Line, "Unexpected character '@'."),
            LoxError::new(Line(2), Location::Line, "Unterminated string."),
        ]
        .into_iter()
        .collect();

        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.to_string(),
            "[line 1] Error: Unexpected character '@'.\n[line 2] Error: Unterminated string."
        );
    }
}
