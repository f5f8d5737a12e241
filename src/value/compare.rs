//! Three-way comparison across the dynamic value domain.
//!
//! Numbers compare numerically after promotion. Strings, characters and enum
//! names compare ordinally, and a string meeting any other kind of value
//! compares against that value's canonical text, unless the other side is a
//! number and the string itself parses as one. Characters always compare a
//! number as its decimal text. Dates and spans use their native order. Any
//! other pairing is incomparable.

use std::cmp::Ordering;

use crate::ast::ComparisonOperator;

use super::{Number, Value};

/// Compares two values; `None` means the pair is incomparable.
pub fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Null, _) | (_, Value::Null) => None,

        (Value::Number(l), Value::Number(r)) => Number::compare(*l, *r),

        (Value::String(l), Value::String(r)) => Some(l.as_str().cmp(r.as_str())),
        (Value::Char(l), Value::Char(r)) => Some(l.cmp(r)),
        (Value::String(s), Value::Char(c)) => Some(ordinal(s, &c.to_string())),
        (Value::Char(_), Value::String(_)) => reversed(right, left),

        (Value::Enum(l), Value::Enum(r)) if l.type_name == r.type_name => {
            Some(l.ordinal.cmp(&r.ordinal))
        }
        (Value::Enum(_), Value::Enum(_)) => None,
        (Value::String(s), Value::Enum(e)) => Some(ordinal(s, &e.name)),
        (Value::Enum(_), Value::String(_)) => reversed(right, left),

        (Value::String(s), Value::Number(n)) => Some(string_against_number(s, *n)),
        (Value::Number(_), Value::String(_)) => reversed(right, left),
        (Value::Char(c), Value::Number(n)) => {
            Some(ordinal(&c.to_string(), &n.to_string()))
        }
        (Value::Number(_), Value::Char(_)) => reversed(right, left),

        (Value::Boolean(l), Value::Boolean(r)) => Some(l.cmp(r)),
        (Value::DateTime(l), Value::DateTime(r)) => Some(l.cmp(r)),
        (Value::TimeSpan(l), Value::TimeSpan(r)) => Some(l.cmp(r)),
        (Value::Object(l), Value::Object(r)) if l.same_instance(r) => Some(Ordering::Equal),

        (Value::String(s), other) => Some(ordinal(s, &other.to_string())),
        (_, Value::String(_)) => reversed(right, left),

        _ => None,
    }
}

/// `==` semantics: null equals only null, incomparable pairs are unequal.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left.is_null(), right.is_null()) {
        (true, true) => true,
        (true, false) | (false, true) => false,
        (false, false) => compare(left, right) == Some(Ordering::Equal),
    }
}

/// Applies a comparison operator. Ordering tests on incomparable pairs are false.
pub fn test(op: ComparisonOperator, left: &Value, right: &Value) -> bool {
    match op {
        ComparisonOperator::Equal => values_equal(left, right),
        ComparisonOperator::NotEqual => !values_equal(left, right),
        ordering_op => {
            let Some(ordering) = compare(left, right) else {
                return false;
            };
            match ordering_op {
                ComparisonOperator::Less => ordering == Ordering::Less,
                ComparisonOperator::Greater => ordering == Ordering::Greater,
                ComparisonOperator::LessEqual => ordering != Ordering::Greater,
                ComparisonOperator::GreaterEqual => ordering != Ordering::Less,
                ComparisonOperator::Equal | ComparisonOperator::NotEqual => false,
            }
        }
    }
}

fn reversed(left: &Value, right: &Value) -> Option<Ordering> {
    compare(left, right).map(Ordering::reverse)
}

fn ordinal(left: &str, right: &str) -> Ordering {
    left.cmp(right)
}

fn string_against_number(s: &str, n: Number) -> Ordering {
    match parse_numeral(s).and_then(|parsed| Number::compare(parsed, n)) {
        Some(ordering) => ordering,
        None => ordinal(s, &n.to_string()),
    }
}

fn parse_numeral(s: &str) -> Option<Number> {
    let s = s.trim();
    if let Ok(i) = s.parse::<i64>() {
        return Some(Number::I64(i));
    }
    if let Ok(u) = s.parse::<u64>() {
        return Some(Number::U64(u));
    }
    s.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(Number::F64)
}
