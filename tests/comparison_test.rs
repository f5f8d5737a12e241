mod common;

use chrono::{Local, TimeDelta};
use common::{context, engine, enum_data, eval};
use pretty_assertions::assert_eq;
use vellum::{Engine, TemplateContext, Value};

const VM_TEMPLATE: &str = "#if ($left == $right )equal
#else
different
#end
#if ($left > $right)
greater
#end
#if ($left < $right)
smaller
#end
#if ($left >= $right)
geq
#end
#if ($left <= $right)
leq
#end";

const CMP_EQUAL: &str = "equal\ngeq\nleq\n";
const CMP_GREATER: &str = "different\ngreater\ngeq\n";
const CMP_SMALLER: &str = "different\nsmaller\nleq\n";

fn compare_couple(engine: &Engine, small: impl Into<Value>, big: impl Into<Value>) {
    let (small, big) = (small.into(), big.into());
    let cases = [
        (&small, &small, CMP_EQUAL),
        (&big, &big, CMP_EQUAL),
        (&small, &big, CMP_SMALLER),
        (&big, &small, CMP_GREATER),
    ];
    for (left, right, expected) in cases {
        let mut context = TemplateContext::new()
            .with("left", left.clone())
            .with("right", right.clone());
        assert_eq!(
            eval(engine, &mut context, VM_TEMPLATE),
            expected,
            "{left:?} vs {right:?}"
        );
    }
}

#[test]
fn equivalence() {
    let source = "#set($int = 1)\r\n\
                  #set($str = \"str\")\r\n\
                  #set($bool = true)\r\n\
                  #if( $int == $str)\r\nwrong\r\n#else\r\nright\r\n#end\r\n\
                  #if( $int == 1 )\r\nright\r\n#else\r\nwrong\r\n#end\r\n\
                  #if ( $int == 2 )\r\nwrong\r\n#else\r\nright\r\n#end\r\n\
                  #if( $str == 2 )\r\nwrong\r\n#else\r\nright\r\n#end\r\n\
                  #if( $str == \"str\")\r\nright\r\n#else\r\nwrong\r\n#end\r\n\
                  #if( $str == $nonexistantreference )\r\nwrong\r\n#else\r\nright\r\n#end\r\n\
                  #if( $str == $bool )\r\nwrong\r\n#else\r\nright\r\n#end\r\n\
                  #if ($bool == true )\r\nright\r\n#else\r\nwrong\r\n#end\r\n\
                  #if( $bool == false )\r\nwrong\r\n#else\r\nright\r\n#end\r\n";
    let expected = "right\r\n".repeat(9);

    let engine = engine();
    let mut context = TemplateContext::new();
    assert_eq!(eval(&engine, &mut context, source), expected);
    // a second pass sees the variables set by the first
    assert_eq!(eval(&engine, &mut context, source), expected);
}

#[test]
fn compare_primitives() {
    let engine = engine();
    let (int, ulong, float, double) = (11i32, 12u64, 13.878f32, 15.059f64);
    compare_couple(&engine, int, double);
    compare_couple(&engine, int, float);
    compare_couple(&engine, int, ulong);
    compare_couple(&engine, ulong, float);
    compare_couple(&engine, float, double);
    compare_couple(&engine, ulong, double);
}

#[test]
fn compare_strings_and_chars() {
    let engine = engine();
    compare_couple(&engine, "aaa", "aab");
    compare_couple(&engine, "aaa", 'c');
    compare_couple(&engine, "aab", 'c');
    compare_couple(&engine, 7i16, "aaa");
    compare_couple(&engine, 7i16, 'c');
}

#[test]
fn compare_date_time_and_span() {
    let engine = engine();
    let now = Local::now().naive_local();
    compare_couple(&engine, now, now + TimeDelta::seconds(3));

    let longer = TimeDelta::days(15)
        + TimeDelta::hours(12)
        + TimeDelta::minutes(37)
        + TimeDelta::seconds(12);
    let shorter = TimeDelta::hours(17) + TimeDelta::minutes(56) + TimeDelta::seconds(59);
    compare_couple(&engine, shorter, longer);
}

#[test]
fn enum_members_compare_by_name_and_member() {
    let engine = engine();
    let mut context = context().with("enumValue", enum_data(1));

    assert_eq!(
        eval(&engine, &mut context, "#if($enumValue == \"Value2\")equal#end"),
        "equal"
    );
    assert_eq!(
        eval(&engine, &mut context, "#if($enumValue == $EnumData.Value2)equal#end"),
        "equal"
    );
    assert_eq!(
        eval(&engine, &mut context, "#if($enumValue < $EnumData.Value3)less#end"),
        "less"
    );
}

#[test]
fn incomparable_values_fail_every_ordering_test() {
    let engine = engine();
    let mut context = TemplateContext::new().with("left", true).with("right", 1);
    assert_eq!(eval(&engine, &mut context, VM_TEMPLATE), "different\n");
}

#[test]
fn word_operators_match_symbols() {
    let engine = engine();
    let mut context = TemplateContext::new().with("a", 3).with("b", 4);
    assert_eq!(
        eval(
            &engine,
            &mut context,
            "#if($a lt $b and $b ge 4 or false)yes#{else}no#{end}"
        ),
        "yes"
    );
    assert_eq!(
        eval(&engine, &mut context, "#if(not ($a ne 3))same#end"),
        "same"
    );
}
