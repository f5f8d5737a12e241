use nom::{
    branch::alt,
    character::complete::char,
    combinator::{consumed, cut, map, opt},
    error::context,
    multi::{many0, separated_list0},
    sequence::{delimited, pair, preceded, terminated},
};
use tracing::instrument;

use crate::ast::{Accessor, Expression, Reference};

use super::{
    common::{identifier, lws, ws},
    expression::parse_expression,
    ParserResult,
};

/// `$name`, `$!name`, `${name}`, `$!{name}`, each followed by any chain of
/// `.property` and `.method(args)` accessors.
#[instrument(level = "debug", skip(input))]
pub fn parse_reference(input: &str) -> ParserResult<Reference> {
    map(
        consumed(preceded(
            char('$'),
            pair(
                opt(char('!')),
                alt((delimited(char('{'), reference_body, char('}')), reference_body)),
            ),
        )),
        |(literal, (quiet, (root, path))): (&str, _)| Reference {
            quiet: quiet.is_some(),
            root: root.to_string(),
            path,
            literal: literal.to_string(),
        },
    )(input)
}

fn reference_body(input: &str) -> ParserResult<(&str, Vec<Accessor>)> {
    pair(identifier, many0(accessor))(input)
}

fn accessor(input: &str) -> ParserResult<Accessor> {
    map(
        preceded(char('.'), pair(identifier, opt(arguments))),
        |(name, arguments)| match arguments {
            Some(arguments) => Accessor::Method {
                name: name.to_string(),
                arguments,
            },
            None => Accessor::Property(name.to_string()),
        },
    )(input)
}

fn arguments(input: &str) -> ParserResult<Vec<Expression>> {
    preceded(
        char('('),
        cut(context(
            "expected ')' to close the argument list",
            terminated(
                separated_list0(char(','), ws(parse_expression)),
                lws(char(')')),
            ),
        )),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Literal;

    #[test]
    fn test_plain_and_quiet_forms() {
        let (rest, reference) = parse_reference("$name rest").unwrap();
        assert_eq!(rest, " rest");
        assert_eq!(reference, Reference::variable("name"));

        let (rest, reference) = parse_reference("$!{name}.").unwrap();
        assert_eq!(rest, ".");
        assert!(reference.quiet);
        assert_eq!(reference.root, "name");
        assert_eq!(reference.literal, "$!{name}");
    }

    #[test]
    fn test_member_chain() {
        let (rest, reference) = parse_reference("$obj.Items.Get( 1 , 'x' ).Name!").unwrap();
        assert_eq!(rest, "!");
        assert_eq!(
            reference.path,
            vec![
                Accessor::Property("Items".to_string()),
                Accessor::Method {
                    name: "Get".to_string(),
                    arguments: vec![
                        Expression::Literal(Literal::Integer(1)),
                        Expression::Literal(Literal::String("x".to_string())),
                    ],
                },
                Accessor::Property("Name".to_string()),
            ]
        );
        assert_eq!(reference.literal, "$obj.Items.Get( 1 , 'x' ).Name");
    }

    #[test]
    fn test_trailing_dot_is_not_consumed() {
        let (rest, reference) = parse_reference("$mail. ok").unwrap();
        assert_eq!(rest, ". ok");
        assert!(reference.path.is_empty());
    }

    #[test]
    fn test_not_a_reference() {
        assert!(matches!(parse_reference("$ 5"), Err(nom::Err::Error(_))));
        assert!(matches!(parse_reference("${name"), Err(nom::Err::Error(_))));
    }

    #[test]
    fn test_unclosed_arguments_fail() {
        assert!(matches!(
            parse_reference("$obj.Call(1, 2"),
            Err(nom::Err::Failure(_))
        ));
    }
}
