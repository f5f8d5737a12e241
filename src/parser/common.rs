use std::{borrow::Cow, cell::Cell, str::FromStr};

use nom::{
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, multispace0, satisfy},
    combinator::{not, peek, recognize, verify},
    error::{VerboseError, VerboseErrorKind},
    sequence::{delimited, pair, preceded, terminated},
};

use crate::{ast::Literal, tokenizer::WordOperator};

use super::ParserResult;

/// Identifiers are `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

pub fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub fn identifier(input: &str) -> ParserResult<&str> {
    recognize(pair(
        take_while1(is_identifier_start),
        take_while(is_identifier_char),
    ))(input)
}

pub fn is_identifier(text: &str) -> bool {
    matches!(identifier(text), Ok(("", _)))
}

/// 空白文字のスキップ
pub fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> ParserResult<'a, O>
where
    F: FnMut(&'a str) -> ParserResult<'a, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Leading whitespace only; used before closing delimiters so that the line
/// ending after a directive stays visible.
pub fn lws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> ParserResult<'a, O>
where
    F: FnMut(&'a str) -> ParserResult<'a, O>,
{
    preceded(multispace0, inner)
}

/// A bare word that must not run on into an identifier (`true` but not `trueish`).
pub fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> ParserResult<'a, &'a str> {
    terminated(tag(word), not(peek(satisfy(is_identifier_char))))
}

pub fn word_operator<'a>(
    expected: WordOperator,
) -> impl FnMut(&'a str) -> ParserResult<'a, &'a str> {
    recognize(verify(identifier, move |word: &str| {
        WordOperator::from_str(word).is_ok_and(|op| op == expected)
    }))
}

/// Deepest nesting of expressions, `#if` blocks and map literals a template may use.
pub const MAX_NESTING: usize = 64;

/// Longest run of operators of one precedence level, such as `1 + 2 + ... + n`.
pub const MAX_OPERATORS: usize = 256;

thread_local! {
    static NESTING: Cell<usize> = const { Cell::new(0) };
}

/// Runs `inner` one nesting level deeper. Fails once [`MAX_NESTING`] is exceeded
/// so that hostile input cannot exhaust the stack.
pub fn nested<'a, O>(
    input: &'a str,
    inner: impl FnOnce(&'a str) -> Result<O, nom::Err<VerboseError<&'a str>>>,
) -> Result<O, nom::Err<VerboseError<&'a str>>> {
    let depth = NESTING.with(|nesting| nesting.get()) + 1;
    if depth > MAX_NESTING {
        return Err(failure(input, "nesting too deep"));
    }
    NESTING.with(|nesting| nesting.set(depth));
    let result = inner(input);
    NESTING.with(|nesting| nesting.set(depth - 1));
    result
}

/// Unrecoverable error labelled with `message`.
pub fn fail<'a, T>(input: &'a str, message: &'static str) -> ParserResult<'a, T> {
    Err(failure(input, message))
}

pub fn failure<'a>(input: &'a str, message: &'static str) -> nom::Err<VerboseError<&'a str>> {
    nom::Err::Failure(VerboseError {
        errors: vec![(input, VerboseErrorKind::Context(message))],
    })
}

/// Turns recoverable errors of a nested parse into failures.
pub fn escalate(error: nom::Err<VerboseError<&str>>) -> nom::Err<VerboseError<&str>> {
    match error {
        nom::Err::Error(e) => nom::Err::Failure(e),
        other => other,
    }
}

/// A string delimited by `quote`; yields the raw body with escapes intact.
pub fn quoted<'a>(quote: char) -> impl FnMut(&'a str) -> ParserResult<'a, &'a str> {
    move |input: &'a str| {
        let (body, _) = char(quote)(input)?;
        match closing_quote(body, quote) {
            Some(end) => Ok((&body[end + quote.len_utf8()..], &body[..end])),
            None => fail(input, "unterminated string literal"),
        }
    }
}

/// Byte offset of the first `quote` in `input` that is not escaped by a backslash.
pub fn closing_quote(input: &str, quote: char) -> Option<usize> {
    let mut escaped = false;
    for (index, c) in input.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Some(index);
        }
    }
    None
}

/// Resolves `\'`, `\"` and `\\`. Any other backslash is kept as written.
pub fn unescape(raw: &str) -> Cow<'_, str> {
    if !raw.contains('\\') {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('\\', Some(&next)) if matches!(next, '\'' | '"' | '\\') => {
                out.push(next);
                chars.next();
            }
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Types a decimal numeral: `i32` when it fits, then `i64`, otherwise double.
/// Returns `None` unless `text` is `-?digits(.digits)?`.
pub fn numeral(text: &str) -> Option<Literal> {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let (integral, fraction) = match unsigned.split_once('.') {
        Some((integral, fraction)) => (integral, Some(fraction)),
        None => (unsigned, None),
    };
    let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if !digits(integral) || !fraction.map_or(true, digits) {
        return None;
    }

    if fraction.is_none() {
        if let Ok(v) = text.parse::<i32>() {
            return Some(Literal::Integer(v));
        }
        if let Ok(v) = text.parse::<i64>() {
            return Some(Literal::Long(v));
        }
    }
    text.parse::<f64>().ok().map(Literal::Double)
}
