//! `%{ key = value, ... }` map literals.
//!
//! Entries are split with [`StringTokenizer`] using a delimiter set that
//! covers the flexible separators (whitespace, `,`, `=`). Values are cut out
//! by scanning with quote and brace awareness before they are parsed.

use nom::{bytes::complete::tag, combinator::all_consuming, error::VerboseError};
use tracing::{debug, instrument};

use crate::{
    ast::{MapEntry, MapLiteral, MapValue},
    tokenizer::StringTokenizer,
};

use super::{
    common::{closing_quote, fail, failure, is_identifier, nested, numeral, unescape},
    reference::parse_reference,
    template::parse_nodes,
    ParserResult,
};

const ENTRY_DELIMITERS: &str = " \t\r\n,=";

type EntriesResult<'a> = Result<Vec<MapEntry>, nom::Err<VerboseError<&'a str>>>;

#[instrument(level = "debug", skip(input))]
pub fn parse_map_literal(input: &str) -> ParserResult<MapLiteral> {
    let (body, _) = tag("%{")(input)?;
    let Some(end) = matching_brace(body) else {
        return fail(input, "unterminated map literal");
    };
    let entries = parse_entries(&body[..end])?;
    debug!(entries = entries.len(), "parsed map literal");
    Ok((&body[end + 1..], MapLiteral { entries }))
}

fn parse_entries(body: &str) -> EntriesResult<'_> {
    let mut entries = Vec::new();
    let mut cursor = body;

    loop {
        let mut tokens = StringTokenizer::new(cursor);
        if !tokens.has_more_tokens() {
            break;
        }
        let key = tokens
            .next_token_with(ENTRY_DELIMITERS)
            .map_err(|_| failure(cursor, "expected a map key"))?;
        if !is_identifier(key) {
            return Err(failure(key, "map keys must be identifiers"));
        }

        let after_key = tokens.remainder();
        let raw_value = if tokens.last_delimiter() == Some('=') {
            after_key
        } else {
            after_key
                .trim_start()
                .strip_prefix('=')
                .ok_or_else(|| failure(after_key, "expected '=' after map key"))?
        }
        .trim_start();

        let (value, rest) = split_value(raw_value)?;
        if !(rest.is_empty() || rest.starts_with(|c: char| c.is_whitespace() || c == ',')) {
            return Err(failure(rest, "expected ',' or whitespace between map entries"));
        }

        entries.push(MapEntry {
            key: key.to_string(),
            value: parse_value(value)?,
        });
        cursor = rest;
    }

    Ok(entries)
}

/// Splits `input` into the text of one value and what follows it.
fn split_value(input: &str) -> Result<(&str, &str), nom::Err<VerboseError<&str>>> {
    match input.chars().next() {
        None => Err(failure(input, "expected a map value")),
        Some(quote @ ('\'' | '"')) => closing_quote(&input[1..], quote)
            .map(|end| input.split_at(end + 2))
            .ok_or_else(|| failure(input, "unterminated string in map literal")),
        Some('{') => matching_brace(&input[1..])
            .map(|end| input.split_at(end + 2))
            .ok_or_else(|| failure(input, "unterminated nested map")),
        Some(_) => Ok(input.split_at(scan_bare(input))),
    }
}

/// Length of a bare value: up to whitespace or `,` outside any brackets.
fn scan_bare(input: &str) -> usize {
    let mut depth = 0usize;
    for (index, c) in input.char_indices() {
        match c {
            '{' | '(' => depth += 1,
            '}' | ')' => depth = depth.saturating_sub(1),
            c if depth == 0 && (c.is_whitespace() || c == ',') => return index,
            _ => {}
        }
    }
    input.len()
}

/// Offset of the `}` closing a brace already consumed, ignoring braces inside quotes.
fn matching_brace(input: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (index, c) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (_, '\\') => escaped = true,
            (Some(open), c) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '{') => depth += 1,
            (None, '}') if depth == 0 => return Some(index),
            (None, '}') => depth -= 1,
            (None, _) => {}
        }
    }
    None
}

fn parse_value(input: &str) -> Result<MapValue, nom::Err<VerboseError<&str>>> {
    match input.chars().next() {
        Some('\'' | '"') => {
            let text = unescape(&input[1..input.len() - 1]);
            let result = match all_consuming(parse_nodes)(text.as_ref()) {
                Ok((_, nodes)) => Ok(MapValue::Text(nodes)),
                Err(_) => Err(failure(input, "invalid text in map value")),
            };
            result
        }
        Some('{') => nested(input, |input| {
            Ok(MapValue::Map(MapLiteral {
                entries: parse_entries(&input[1..input.len() - 1])?,
            }))
        }),
        Some('$') => {
            let (reference_text, quote) = strip_quote_suffix(input);
            let (_, reference) = all_consuming(parse_reference)(reference_text)
                .map_err(|_| failure(input, "invalid reference in map value"))?;
            Ok(MapValue::Reference { reference, quote })
        }
        _ => match input {
            "true" => Ok(MapValue::Boolean(true)),
            "false" => Ok(MapValue::Boolean(false)),
            _ => numeral(input)
                .map(MapValue::Number)
                .ok_or_else(|| failure(input, "unsupported map value")),
        },
    }
}

/// Detaches a trailing `.to_squote` / `.to_quote` (any case) from a reference.
fn strip_quote_suffix(input: &str) -> (&str, Option<char>) {
    for (suffix, quote) in [(".to_squote", '\''), (".to_quote", '"')] {
        if input.len() > suffix.len() {
            let split = input.len() - suffix.len();
            if input.is_char_boundary(split) && input[split..].eq_ignore_ascii_case(suffix) {
                return (&input[..split], Some(quote));
            }
        }
    }
    (input, None)
}
