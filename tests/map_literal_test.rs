mod common;

use common::{context, engine};
use pretty_assertions::assert_eq;
use vellum::{TemplateContext, Value, ValueMap};

const TEMPLATE_PREFIX: &str = "$Helper.Dump(";

fn interpolation_context() -> TemplateContext {
    let mut params = ValueMap::new();
    params.insert("id".to_string(), Value::from("123"));
    context()
        .with("params", params)
        .with("style", "style='color:red'")
        .with("survey", 1)
        .with("id", 2)
        .with("siteRoot", "")
}

/// Dumps the map literal `text`. When the helper call rendered as its own
/// source text, the literal itself is returned.
fn eval(text: &str) -> String {
    let template = format!("{TEMPLATE_PREFIX}\"{text}\")");
    let mut out = String::new();
    let ok = engine().evaluate(
        &mut interpolation_context(),
        &mut out,
        "ContextTest.CaseInsensitive",
        &template,
    );
    assert!(ok, "Evaluation returned failure");
    if out.starts_with(TEMPLATE_PREFIX) {
        text.to_string()
    } else {
        out
    }
}

#[test]
fn single_param_dict() {
    assert_eq!(eval("%{      key1     =  'value1' }"), "1:key1=<value1>");
    assert_eq!(eval("%{      key1='value1' }"), "1:key1=<value1>");
    assert_eq!(eval("%{key1='value1'}"), "1:key1=<value1>");
}

#[test]
fn multi_param_dict() {
    assert_eq!(eval("%{key1='value1', key2=10}"), "2:key1=<value1> key2=<10>");
    assert_eq!(eval("%{key1='value1' ,  key2=10}"), "2:key1=<value1> key2=<10>");
    assert_eq!(eval("%{key1='value1'   key2=10}"), "2:key1=<value1> key2=<10>");
}

#[test]
fn multi_param_dict_using_interpolation() {
    assert_eq!(
        eval("%{key1=${siteRoot}, key2=$params}"),
        "2:key1=<> key2=<1:id=<123>>"
    );
    assert_eq!(
        eval("%{ key1='value${survey}', key2='value$id', key3='value3' }"),
        "3:key1=<value1> key2=<value2> key3=<value3>"
    );
    assert_eq!(
        eval("%{ key1='value${survey}', key2='value$id' }"),
        "2:key1=<value1> key2=<value2>"
    );
    assert_eq!(eval("%{key1=${siteRoot}, key2=$id}"), "2:key1=<> key2=<2>");
}

#[test]
fn nested_dicts() {
    assert_eq!(
        eval("%{controller='area', action='index', params={}}"),
        "3:action=<index> controller=<area> params=<0>"
    );
    assert_eq!(
        eval("%{controller='area', action='index', params={id=1, lastpage=$id} }"),
        "3:action=<index> controller=<area> params=<2:id=<1> lastpage=<2>>"
    );
    assert_eq!(
        eval("%{params={}, action='index', controller='area'}"),
        "3:action=<index> controller=<area> params=<0>"
    );
    assert_eq!(
        eval("%{params={}, action=$survey, controller='area'}"),
        "3:action=<1> controller=<area> params=<0>"
    );
    assert_eq!(
        eval("%{params={id=$survey.to_squote, lastpage=$id}, controller='area', action='index'}"),
        "3:action=<index> controller=<area> params=<2:id=<'1'> lastpage=<2>>"
    );
    assert_eq!(
        eval("%{url={action='viewpage',pathinfo=$context.info,querystring={id=1}}}"),
        "1:url=<3:action=<viewpage> pathinfo=<> querystring=<1:id=<1>>>"
    );
}

#[test]
fn escape_chars() {
    assert_eq!(eval(r"%{action='\'abc\''}"), "1:action=<'abc'>");
}

#[test]
fn zero_param_dict_interpolation() {
    assert_eq!(eval("%{       }"), "0");
    assert_eq!(eval("%{}"), "0");
}

#[test]
fn inner_string_bug() {
    assert_eq!(
        eval(r"%{class='loader {department: {url: \'something\' } }'}"),
        "1:class=<loader {department: {url: 'something' } }>"
    );
}

#[test]
fn bare_map_literal_and_quote_wrapping() {
    let engine = engine();
    let mut context = interpolation_context();
    let mut out = String::new();
    assert!(engine.evaluate(
        &mut context,
        &mut out,
        "bare",
        "#set($m = %{a=$id.to_quote, b=$style, c=true})$Helper.Dump($m) $m.a",
    ));
    assert_eq!(out, "3:a=<\"2\"> b=<style='color:red'> c=<true> \"2\"");
}

#[test]
fn malformed_literal_is_a_parse_failure() {
    let engine = engine();
    for source in [
        "$Helper.Dump(\"%{key1 'value1'}\")",
        "$Helper.Dump(%{key1='value1')",
        "$Helper.Dump(%{key1=?})",
    ] {
        let mut out = String::new();
        assert!(
            !engine.evaluate(&mut interpolation_context(), &mut out, "bad", source),
            "{source}"
        );
    }
}
