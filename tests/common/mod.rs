#![allow(dead_code)]

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, FmtSubscriber};
use vellum::{
    dump::DumpHelper, Engine, EngineConfig, EnumMember, HostObject, MethodRegistry, ParamType,
    TemplateContext, TypeTag, Value,
};

#[ctor::ctor]
fn init_tests() {
    // テストの前に一度だけ実行したい処理
    // tracing_subscriberの初期化
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

pub const ENUM_DATA: &str = "EnumData";
pub const TEST_CLASS: &str = "TestClass";

/// Host type whose constants are enum members, exposed as `$EnumData.Value2`.
pub struct EnumData;

pub fn enum_data(ordinal: i64) -> Value {
    Value::from(EnumMember::new(ENUM_DATA, format!("Value{}", ordinal + 1), ordinal))
}

/// Overloads used by the method resolution tests.
pub struct TestClass;

pub fn registry() -> MethodRegistry {
    let mut registry = MethodRegistry::with_builtins();
    registry
        .register::<EnumData>(ENUM_DATA)
        .constant("Value1", enum_data(0))
        .constant("Value2", enum_data(1))
        .constant("Value3", enum_data(2));

    registry
        .register::<TestClass>(TEST_CLASS)
        .method("JustDoIt", vec![ParamType::Is(TypeTag::Double)], |_, args| {
            Ok(Value::from(args[0].to_string()))
        })
        .method("JustDoIt", vec![ParamType::Any], |_, args| {
            Ok(Value::from(args[0].to_string()))
        })
        .method("Amb", vec![ParamType::Any], |_, args| {
            Ok(Value::from(args[0].type_name()))
        })
        .method("Amb", vec![ParamType::Is(TypeTag::Map)], |_, args| {
            Ok(Value::from(args[0].type_name()))
        })
        .method("Name", vec![ParamType::Is(TypeTag::String)], |_, args| {
            Ok(args[0].clone())
        })
        .method("name", vec![ParamType::Is(TypeTag::Char)], |_, _| {
            Ok(Value::from("lower"))
        })
        .method("ThrowException", vec![], |_, _| {
            Err("From ThrowException".into())
        });
    registry
}

pub fn engine() -> Engine {
    Engine::new(EngineConfig::default(), Arc::new(registry())).unwrap()
}

/// Context preloaded with the host objects the suites call into.
pub fn context() -> TemplateContext {
    TemplateContext::new()
        .with("test", HostObject::new(TEST_CLASS, TestClass))
        .with("EnumData", HostObject::new(ENUM_DATA, EnumData))
        .with("Helper", DumpHelper::host_object())
}

/// Renders `source` and fails the test if evaluation reports failure.
pub fn eval(engine: &Engine, context: &mut TemplateContext, source: &str) -> String {
    let mut out = String::new();
    if let Err(e) = engine.try_evaluate(context, &mut out, "test", source) {
        panic!("Evaluation returned failure: {e}");
    }
    out
}
