use std::str::FromStr;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while1},
    character::complete::{char, line_ending, not_line_ending, one_of, space0},
    combinator::{cut, map, map_res, not, opt, recognize, value, verify},
    error::context,
    multi::many0,
    sequence::{delimited, pair, preceded, terminated, tuple},
};
use tracing::instrument;

use crate::{
    ast::{ConditionalBranch, Expression, IfDirective, Node, SetDirective},
    tokenizer::Directive,
};

use super::{
    common::{fail, identifier, lws, nested, ws},
    expression::parse_expression,
    reference::parse_reference,
    ParserResult,
};

/// Sequence of template nodes. Stops before `#elseif`, `#else` and `#end` so
/// that the enclosing `#if` can claim them.
#[instrument(level = "debug", skip(input))]
pub fn parse_nodes(input: &str) -> ParserResult<Vec<Node>> {
    map(many0(parse_node), |nodes| {
        let mut merged: Vec<Node> = Vec::with_capacity(nodes.len());
        for node in nodes.into_iter().flatten() {
            match (merged.last_mut(), node) {
                (Some(Node::Text(previous)), Node::Text(text)) => previous.push_str(&text),
                (_, node) => merged.push(node),
            }
        }
        merged
    })(input)
}

fn parse_node(input: &str) -> ParserResult<Option<Node>> {
    alt((
        value(None, parse_comment),
        map(parse_set, Some),
        map(parse_if, Some),
        map(parse_reference, |reference| Some(Node::Reference(reference))),
        map(text, |text| Some(Node::Text(text.to_string()))),
        map(stray_marker, |marker| Some(Node::Text(marker.to_string()))),
    ))(input)
}

fn text(input: &str) -> ParserResult<&str> {
    take_while1(|c| c != '$' && c != '#')(input)
}

/// A `$` or `#` that opens neither a reference nor a directive.
fn stray_marker(input: &str) -> ParserResult<&str> {
    preceded(not(block_terminator), recognize(one_of("$#")))(input)
}

fn parse_comment(input: &str) -> ParserResult<()> {
    alt((
        value((), tuple((tag("##"), not_line_ending, opt(line_ending)))),
        value(
            (),
            preceded(
                tag("#*"),
                cut(context(
                    "unterminated block comment",
                    terminated(take_until("*#"), tag("*#")),
                )),
            ),
        ),
    ))(input)
}

/// `#name` or `#{name}` naming a known directive.
pub fn parse_directive_word(input: &str) -> ParserResult<Directive> {
    map_res(
        preceded(
            char('#'),
            alt((delimited(char('{'), identifier, char('}')), identifier)),
        ),
        Directive::from_str,
    )(input)
}

fn directive<'a>(expected: Directive) -> impl FnMut(&'a str) -> ParserResult<'a, Directive> {
    verify(parse_directive_word, move |found: &Directive| *found == expected)
}

fn block_terminator(input: &str) -> ParserResult<Directive> {
    verify(parse_directive_word, |found: &Directive| found.continues_block())(input)
}

/// The line ending right after a directive belongs to the directive.
fn gobble_newline(input: &str) -> ParserResult<Option<&str>> {
    opt(alt((tag("\r\n"), tag("\n"))))(input)
}

#[instrument(level = "debug", skip(input))]
fn parse_set(input: &str) -> ParserResult<Node> {
    let (input, _) = directive(Directive::Set)(input)?;
    let (after_open, _) = cut(context(
        "expected '(' after #set",
        preceded(space0, char('(')),
    ))(input)?;
    let (input, target) = cut(context("expected a variable to assign", ws(parse_reference)))(
        after_open,
    )?;
    if !target.path.is_empty() || target.quiet {
        return fail(after_open, "assignment target must be a plain variable");
    }
    let (input, value) = cut(context(
        "malformed #set directive",
        delimited(char('='), parse_expression, lws(char(')'))),
    ))(input)?;
    let (input, _) = gobble_newline(input)?;

    Ok((
        input,
        Node::Set(SetDirective {
            target: target.root,
            value,
        }),
    ))
}

#[instrument(level = "debug", skip(input))]
fn parse_if(input: &str) -> ParserResult<Node> {
    let (input, _) = directive(Directive::If)(input)?;
    nested(input, if_block)
}

/// Everything after `#if`: the branches, an optional `#else` and the closing `#end`.
fn if_block(input: &str) -> ParserResult<Node> {
    let (input, first) = cut(branch)(input)?;
    let (input, alternatives) = many0(preceded(directive(Directive::ElseIf), cut(branch)))(input)?;
    let (input, otherwise) = opt(preceded(
        pair(directive(Directive::Else), gobble_newline),
        parse_nodes,
    ))(input)?;
    let (input, _) = cut(context(
        "expected #end to close #if",
        directive(Directive::End),
    ))(input)?;
    let (input, _) = gobble_newline(input)?;

    let mut branches = Vec::with_capacity(alternatives.len() + 1);
    branches.push(first);
    branches.extend(alternatives);
    Ok((input, Node::If(IfDirective { branches, otherwise })))
}

fn branch(input: &str) -> ParserResult<ConditionalBranch> {
    map(pair(condition, parse_nodes), |(condition, body)| {
        ConditionalBranch { condition, body }
    })(input)
}

fn condition(input: &str) -> ParserResult<Expression> {
    context(
        "malformed condition",
        terminated(
            delimited(
                pair(space0, char('(')),
                ws(parse_expression),
                char(')'),
            ),
            gobble_newline,
        ),
    )(input)
}
