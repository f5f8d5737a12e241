use std::str::FromStr;

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1, one_of},
    combinator::{all_consuming, cut, map, map_opt, map_res, not, opt, recognize, value},
    error::context,
    multi::{many0, separated_list0},
    sequence::{pair, preceded, terminated, tuple},
};
use tracing::instrument;

use crate::{
    ast::{
        ArithmeticOperator, ComparisonOperator, Expression, Literal, LogicalOperator, Node,
    },
    tokenizer::WordOperator,
};

use super::{
    common::{
        escalate, fail, identifier, keyword, lws, nested, numeral, quoted, unescape,
        word_operator, ws, MAX_OPERATORS,
    },
    map_literal::parse_map_literal,
    reference::parse_reference,
    template::parse_nodes,
    ParserResult,
};

#[instrument(level = "debug", skip(input))]
pub fn parse_expression(input: &str) -> ParserResult<Expression> {
    nested(input, parse_or)
}

fn parse_or(input: &str) -> ParserResult<Expression> {
    let (input, first) = parse_and(input)?;
    let (rest, operands) = many0(pair(ws(or_operator), cut(parse_and)))(input)?;
    fold_binary(input, rest, first, operands, logical)
}

fn parse_and(input: &str) -> ParserResult<Expression> {
    let (input, first) = parse_comparison(input)?;
    let (rest, operands) = many0(pair(ws(and_operator), cut(parse_comparison)))(input)?;
    fold_binary(input, rest, first, operands, logical)
}

fn parse_comparison(input: &str) -> ParserResult<Expression> {
    let (input, first) = parse_additive(input)?;
    let (rest, operands) = many0(pair(ws(comparison_operator), cut(parse_additive)))(input)?;
    fold_binary(input, rest, first, operands, |op, left, right| {
        Expression::Comparison {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    })
}

fn parse_additive(input: &str) -> ParserResult<Expression> {
    let (input, first) = parse_multiplicative(input)?;
    let (rest, operands) = many0(pair(ws(additive_operator), cut(parse_multiplicative)))(input)?;
    fold_binary(input, rest, first, operands, arithmetic)
}

fn parse_multiplicative(input: &str) -> ParserResult<Expression> {
    let (input, first) = parse_unary(input)?;
    let (rest, operands) = many0(pair(ws(multiplicative_operator), cut(parse_unary)))(input)?;
    fold_binary(input, rest, first, operands, arithmetic)
}

fn parse_unary(input: &str) -> ParserResult<Expression> {
    alt((
        map(
            preceded(
                ws(alt((
                    terminated(tag("!"), not(char('='))),
                    word_operator(WordOperator::Not),
                ))),
                cut(nested_unary),
            ),
            |operand| Expression::Not(Box::new(operand)),
        ),
        parse_primary,
        map(preceded(ws(char('-')), cut(nested_unary)), |operand| {
            Expression::Negate(Box::new(operand))
        }),
    ))(input)
}

fn nested_unary(input: &str) -> ParserResult<Expression> {
    nested(input, parse_unary)
}

#[instrument(level = "debug", skip(input))]
fn parse_primary(input: &str) -> ParserResult<Expression> {
    ws(alt((
        parenthesized,
        map(parse_map_literal, Expression::Map),
        list,
        double_quoted,
        map(quoted('\''), |body| {
            Expression::Literal(Literal::String(unescape(body).into_owned()))
        }),
        map(number, Expression::Literal),
        value(Expression::Literal(Literal::Boolean(true)), keyword("true")),
        value(Expression::Literal(Literal::Boolean(false)), keyword("false")),
        value(Expression::Literal(Literal::Null), keyword("null")),
        map(parse_reference, Expression::Reference),
    )))(input)
}

fn parenthesized(input: &str) -> ParserResult<Expression> {
    preceded(
        char('('),
        cut(context(
            "expected ')' to close the expression",
            terminated(ws(parse_expression), char(')')),
        )),
    )(input)
}

fn list(input: &str) -> ParserResult<Expression> {
    map(
        preceded(
            char('['),
            cut(context(
                "expected ']' to close the list",
                terminated(
                    separated_list0(char(','), ws(parse_expression)),
                    lws(char(']')),
                ),
            )),
        ),
        Expression::List,
    )(input)
}

/// A double-quoted string interpolates like a template. When its content is a
/// single `%{...}` it is a map literal instead.
fn double_quoted(input: &str) -> ParserResult<Expression> {
    let (rest, raw) = quoted('"')(input)?;

    let trimmed = raw.trim();
    if trimmed.starts_with("%{") && trimmed.ends_with('}') {
        let (_, literal) = all_consuming(ws(parse_map_literal))(raw).map_err(escalate)?;
        return Ok((rest, Expression::Map(literal)));
    }

    let text = unescape(raw);
    let nodes = match all_consuming(parse_nodes)(text.as_ref()) {
        Ok((_, nodes)) => nodes,
        Err(_) => return fail(input, "invalid interpolated string"),
    };
    if nodes.iter().all(|node| matches!(node, Node::Text(_))) {
        let text = nodes
            .into_iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text),
                _ => None,
            })
            .collect();
        return Ok((rest, Expression::Literal(Literal::String(text))));
    }
    Ok((rest, Expression::Interpolated(nodes)))
}

fn number(input: &str) -> ParserResult<Literal> {
    map_opt(
        recognize(tuple((
            opt(char('-')),
            digit1,
            opt(pair(char('.'), digit1)),
        ))),
        numeral,
    )(input)
}

fn or_operator(input: &str) -> ParserResult<LogicalOperator> {
    value(
        LogicalOperator::Or,
        alt((tag("||"), word_operator(WordOperator::Or))),
    )(input)
}

fn and_operator(input: &str) -> ParserResult<LogicalOperator> {
    value(
        LogicalOperator::And,
        alt((tag("&&"), word_operator(WordOperator::And))),
    )(input)
}

fn comparison_operator(input: &str) -> ParserResult<ComparisonOperator> {
    alt((
        map_res(
            alt((
                tag("=="),
                tag("!="),
                tag("<="),
                tag(">="),
                tag("<"),
                tag(">"),
            )),
            ComparisonOperator::from_str,
        ),
        map_opt(map_res(identifier, WordOperator::from_str), WordOperator::comparison),
    ))(input)
}

fn additive_operator(input: &str) -> ParserResult<ArithmeticOperator> {
    map_res(recognize(one_of("+-")), ArithmeticOperator::from_str)(input)
}

fn multiplicative_operator(input: &str) -> ParserResult<ArithmeticOperator> {
    map_res(
        alt((tag("*"), tag("/"), terminated(tag("%"), not(char('{'))))),
        ArithmeticOperator::from_str,
    )(input)
}

/// Left-associates `first op operand op operand ...`. `start` is where the
/// operator run begins and `rest` is the input after it.
fn fold_binary<'a, Op>(
    start: &'a str,
    rest: &'a str,
    first: Expression,
    operands: Vec<(Op, Expression)>,
    build: impl Fn(Op, Expression, Expression) -> Expression,
) -> ParserResult<'a, Expression> {
    if operands.len() > MAX_OPERATORS {
        return fail(start, "too many operators in one expression");
    }
    let folded = operands
        .into_iter()
        .fold(first, |left, (op, right)| build(op, left, right));
    Ok((rest, folded))
}

fn logical(op: LogicalOperator, left: Expression, right: Expression) -> Expression {
    Expression::Logical {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn arithmetic(op: ArithmeticOperator, left: Expression, right: Expression) -> Expression {
    Expression::Arithmetic {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{MapValue, Reference};

    fn parse(input: &str) -> Expression {
        let (rest, expression) = parse_expression(input).unwrap();
        assert_eq!(rest, "", "unparsed input");
        expression
    }

    fn int(v: i32) -> Box<Expression> {
        Box::new(Expression::Literal(Literal::Integer(v)))
    }

    fn var(name: &str) -> Box<Expression> {
        Box::new(Expression::Reference(Reference::variable(name)))
    }

    #[test]
    fn test_multiplication_binds_tighter() {
        assert_eq!(
            parse("1 + 2 * 3"),
            Expression::Arithmetic {
                op: ArithmeticOperator::Add,
                left: int(1),
                right: Box::new(Expression::Arithmetic {
                    op: ArithmeticOperator::Multiply,
                    left: int(2),
                    right: int(3),
                }),
            }
        );
    }

    #[test]
    fn test_left_associative_subtraction() {
        assert_eq!(
            parse("$a - 1 - 2"),
            Expression::Arithmetic {
                op: ArithmeticOperator::Subtract,
                left: Box::new(Expression::Arithmetic {
                    op: ArithmeticOperator::Subtract,
                    left: var("a"),
                    right: int(1),
                }),
                right: int(2),
            }
        );
    }

    #[test]
    fn test_word_operators() {
        assert_eq!(
            parse("$a eq 1 and not $b"),
            Expression::Logical {
                op: LogicalOperator::And,
                left: Box::new(Expression::Comparison {
                    op: ComparisonOperator::Equal,
                    left: var("a"),
                    right: int(1),
                }),
                right: Box::new(Expression::Not(var("b"))),
            }
        );
    }

    #[test]
    fn test_symbolic_logic_and_comparison() {
        assert_eq!(
            parse("$x >= 2 || !($y != 3)"),
            Expression::Logical {
                op: LogicalOperator::Or,
                left: Box::new(Expression::Comparison {
                    op: ComparisonOperator::GreaterEqual,
                    left: var("x"),
                    right: int(2),
                }),
                right: Box::new(Expression::Not(Box::new(Expression::Comparison {
                    op: ComparisonOperator::NotEqual,
                    left: var("y"),
                    right: int(3),
                }))),
            }
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(parse("-7"), Expression::Literal(Literal::Integer(-7)));
        assert_eq!(parse("2.5"), Expression::Literal(Literal::Double(2.5)));
        assert_eq!(
            parse("9999999999"),
            Expression::Literal(Literal::Long(9_999_999_999))
        );
        assert_eq!(parse("null"), Expression::Literal(Literal::Null));
        assert_eq!(
            parse("'it\\'s $raw'"),
            Expression::Literal(Literal::String("it's $raw".to_string()))
        );
        assert_eq!(parse("-$n"), Expression::Negate(var("n")));
        assert_eq!(
            parse("[1, 'a' ]"),
            Expression::List(vec![
                Expression::Literal(Literal::Integer(1)),
                Expression::Literal(Literal::String("a".to_string())),
            ])
        );
    }

    #[test]
    fn test_double_quoted_forms() {
        assert_eq!(
            parse("\"plain\""),
            Expression::Literal(Literal::String("plain".to_string()))
        );
        assert_eq!(
            parse("\"id=$id\""),
            Expression::Interpolated(vec![
                Node::Text("id=".to_string()),
                Node::Reference(Reference::variable("id")),
            ])
        );
        match parse("\" %{ key = 10 } \"") {
            Expression::Map(literal) => {
                assert_eq!(literal.entries.len(), 1);
                assert_eq!(
                    literal.entries[0].value,
                    MapValue::Number(Literal::Integer(10))
                );
            }
            other => panic!("expected a map literal, got {other:?}"),
        }
    }

    #[test]
    fn test_errors() {
        assert!(matches!(parse_expression("(1 + 2"), Err(nom::Err::Failure(_))));
        assert!(matches!(parse_expression("1 +"), Err(nom::Err::Failure(_))));
        assert!(matches!(parse_expression(")"), Err(nom::Err::Error(_))));
    }
}
