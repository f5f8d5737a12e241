//! nom parsers turning template source into an [`ast::Template`](crate::ast::Template).

mod common;
mod error;
mod expression;
mod map_literal;
mod reference;
mod template;

use nom::{combinator::all_consuming, error::VerboseError, IResult};
use tracing::{debug, instrument};

use crate::ast::{Expression, Template};

pub use error::{ParseError, Span};
pub use map_literal::parse_map_literal;
pub use reference::parse_reference;
pub use template::parse_nodes;

pub type ParserResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

#[instrument(level = "debug", skip(source))]
pub fn parse_template(label: &str, source: &str) -> Result<Template, ParseError> {
    match parse_nodes(source) {
        Ok(("", nodes)) => {
            debug!(nodes = nodes.len(), "parsed template");
            Ok(Template::new(label, nodes))
        }
        Ok((rest, _)) => {
            let message = match template::parse_directive_word(rest) {
                Ok((_, directive)) => format!("#{directive} without an open #if"),
                Err(_) => "unexpected input".to_string(),
            };
            Err(ParseError::at(source, rest, message))
        }
        Err(error) => Err(into_parse_error(source, error)),
    }
}

/// Parses a standalone expression such as the condition of an `#if`.
pub fn parse_expression(source: &str) -> Result<Expression, ParseError> {
    all_consuming(common::ws(expression::parse_expression))(source)
        .map(|(_, expression)| expression)
        .map_err(|error| into_parse_error(source, error))
}

fn into_parse_error(source: &str, error: nom::Err<VerboseError<&str>>) -> ParseError {
    match error {
        nom::Err::Error(error) | nom::Err::Failure(error) => ParseError::from_verbose(source, error),
        nom::Err::Incomplete(_) => ParseError::UnexpectedEof {
            message: "incomplete input".to_string(),
        },
    }
}
