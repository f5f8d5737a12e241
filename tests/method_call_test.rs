mod common;

use std::error::Error;

use common::{context, engine, eval};
use pretty_assertions::assert_eq;
use vellum::{eval::EvalError, host::MethodError, EngineError};

#[test]
fn has_exact_signature() {
    let mut context = context().with("num", 55.0f64);
    assert_eq!(eval(&engine(), &mut context, "$test.justDoIt($num)"), "55");
}

#[test]
fn has_exact_signature_with_correct_case() {
    let mut context = context().with("num", 55.0f64);
    assert_eq!(eval(&engine(), &mut context, "$test.JustDoIt($num)"), "55");
}

#[test]
fn has_exact_signature_with_messed_up_case() {
    let mut context = context().with("num", 55.0f64);
    assert_eq!(eval(&engine(), &mut context, "$test.jUStDoIt($num)"), "55");
}

#[test]
fn has_compatible_signature() {
    let mut context = context().with("num", 99);
    assert_eq!(eval(&engine(), &mut context, "$test.justDoIt($num)"), "99");
}

#[test]
fn no_ambiguity() {
    let engine = engine();
    let mut context = context().with("num", 99);
    assert_eq!(eval(&engine, &mut context, "$test.Amb($num)"), "Int32");
    assert_eq!(eval(&engine, &mut context, "$test.Amb(\"%{id=1}\")"), "Map");
}

#[test]
fn invocation_failure_keeps_the_host_error() {
    let engine = engine();
    let mut context = context();
    let mut out = String::new();
    let err = engine
        .try_evaluate(&mut context, &mut out, "throws", "$test.ThrowException")
        .unwrap_err();

    let EngineError::Eval {
        source: EvalError::Method(method_error @ MethodError::Invocation { .. }),
        ..
    } = &err
    else {
        panic!("expected an invocation error, got {err:?}");
    };
    let inner = method_error.source().expect("inner cause");
    assert_eq!(inner.to_string(), "From ThrowException");

    assert!(!engine.evaluate(&mut context, &mut out, "throws", "$test.ThrowException()"));
}

#[test]
fn unknown_method_is_a_lookup_error_but_unknown_property_is_absent() {
    let engine = engine();
    let mut context = context();
    let mut out = String::new();
    let err = engine
        .try_evaluate(&mut context, &mut out, "missing", "$test.Nope(1)")
        .unwrap_err();
    assert!(
        matches!(
            err,
            EngineError::Eval {
                source: EvalError::Method(MethodError::NotFound { .. }),
                ..
            }
        ),
        "{err:?}"
    );

    assert_eq!(eval(&engine, &mut context, "$test.Nope|$!test.Nope"), "$test.Nope|");
}

#[test]
fn builtin_members_chain() {
    let engine = engine();
    let mut context = context().with("name", "  Schaefer ");
    assert_eq!(
        eval(&engine, &mut context, "${name.Trim().ToLower().Substring(0, 3)}"),
        "sch"
    );
    assert_eq!(eval(&engine, &mut context, "$name.Trim().Length"), "8");
}

#[test]
fn resolutions_are_cached_per_call_shape() {
    let engine = engine();
    let mut context = context().with("i", 1).with("d", 2.0f64);
    eval(&engine, &mut context, "$test.JustDoIt($i) $test.justdoit($i) $test.JustDoIt($d)");
    assert_eq!(engine.cached_resolutions(), 2);
}

#[test]
fn case_variant_overloads_ignore_call_order() {
    let mut context = context().with("letter", 'x');
    let cold = eval(&engine(), &mut context, "$test.Name($letter)");
    assert_eq!(cold, "x");

    let engine = engine();
    assert_eq!(
        eval(&engine, &mut context, "$test.name($letter) $test.Name($letter) $test.name($letter)"),
        "lower x lower"
    );
    assert_eq!(eval(&engine, &mut context, "$test.NAME($letter)"), "lower");
}
