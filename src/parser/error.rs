use std::fmt;

use nom::error::{VerboseError, VerboseErrorKind};
use thiserror::Error;

/// 1-based position inside the template source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("{message} at {span} (found {found:?})")]
    Syntax {
        message: String,
        found: String,
        span: Span,
    },
    #[error("unexpected end of template: {message}")]
    UnexpectedEof { message: String },
}

impl ParseError {
    /// Builds an error located at `location`, a suffix or sub-slice of `source`.
    pub fn at(source: &str, location: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        if location.is_empty() {
            return ParseError::UnexpectedEof { message };
        }

        let offset = offset_in(source, location);
        let consumed = &source[..offset];
        let line = consumed.matches('\n').count() + 1;
        let column = consumed.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
        let found = location
            .chars()
            .take_while(|c| *c != '\n' && *c != '\r')
            .take(16)
            .collect();

        ParseError::Syntax {
            message,
            found,
            span: Span { line, column },
        }
    }

    /// Converts a nom error chain. The innermost context label becomes the message.
    pub fn from_verbose(source: &str, error: VerboseError<&str>) -> Self {
        let location = error.errors.first().map(|(input, _)| *input).unwrap_or("");
        let message = error
            .errors
            .iter()
            .find_map(|(_, kind)| match kind {
                VerboseErrorKind::Context(label) => Some(label.to_string()),
                _ => None,
            })
            .or_else(|| error.errors.first().map(|(_, kind)| describe(kind)))
            .unwrap_or_else(|| "invalid syntax".to_string());
        Self::at(source, location, message)
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::Syntax { span, .. } => Some(*span),
            ParseError::UnexpectedEof { .. } => None,
        }
    }
}

fn describe(kind: &VerboseErrorKind) -> String {
    match kind {
        VerboseErrorKind::Char(c) => format!("expected '{c}'"),
        VerboseErrorKind::Context(label) => label.to_string(),
        VerboseErrorKind::Nom(kind) => format!("invalid syntax ({})", kind.description()),
    }
}

fn offset_in(source: &str, location: &str) -> usize {
    let start = source.as_ptr() as usize;
    let at = location.as_ptr() as usize;
    let offset = if at >= start && at <= start + source.len() {
        at - start
    } else {
        source.len()
    };
    if source.is_char_boundary(offset) {
        offset
    } else {
        source.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_is_line_and_column() {
        let source = "line one\nline #two";
        let err = ParseError::at(source, &source[14..], "bad directive");
        assert_eq!(err.span(), Some(Span { line: 2, column: 6 }));
        assert_eq!(
            err.to_string(),
            "bad directive at line 2, column 6 (found \"#two\")"
        );
    }

    #[test]
    fn test_empty_location_is_eof() {
        let source = "#if(true)";
        let err = ParseError::at(source, &source[source.len()..], "expected #end");
        assert_eq!(
            err,
            ParseError::UnexpectedEof {
                message: "expected #end".to_string()
            }
        );
    }
}
