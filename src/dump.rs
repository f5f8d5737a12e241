//! Deterministic textual dump of maps, exposed to templates as `$Helper.Dump(map)`.

use std::fmt::Write;

use crate::{
    host::{MethodRegistry, ParamType},
    value::{TypeTag, Value, ValueMap},
};

/// Host object type under which [`DumpHelper`] is registered.
pub const DUMP_HELPER_TYPE: &str = "DumpHelper";

#[derive(Debug, Clone, Copy, Default)]
pub struct DumpHelper;

impl DumpHelper {
    pub fn host_object() -> crate::value::HostObject {
        crate::value::HostObject::new(DUMP_HELPER_TYPE, DumpHelper)
    }
}

/// Renders `<count>:<key>=<<value>> ...` with keys in ordinal order and nested
/// maps dumped recursively.
pub fn dump_map(map: &ValueMap) -> String {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();

    let mut out = format!("{}:", map.len());
    for key in keys {
        let _ = match &map[key.as_str()] {
            Value::Map(nested) => write!(out, "{key}=<{}> ", dump_map(nested)),
            value => write!(out, "{key}=<{value}> "),
        };
    }
    out.pop();
    out
}

pub fn register(registry: &mut MethodRegistry) {
    registry.register::<DumpHelper>(DUMP_HELPER_TYPE).method(
        "Dump",
        vec![ParamType::Is(TypeTag::Map)],
        |_, args| match &args[0] {
            Value::Map(map) => Ok(Value::from(dump_map(map))),
            Value::Null => Err("options must not be null".into()),
            other => Err(format!("cannot dump a {}", other.type_name()).into()),
        },
    );
}
