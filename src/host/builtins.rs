//! Members available on strings, maps and lists without host registration.

use crate::value::{TypeTag, Value};

use super::registry::{InvocationFailure, MethodRegistry, ParamType};

pub fn register(registry: &mut MethodRegistry) {
    register_string(registry);
    register_map(registry);
    register_list(registry);
}

fn register_string(registry: &mut MethodRegistry) {
    let string = TypeTag::String.to_string();
    let s = ParamType::Is(TypeTag::String);
    let int = ParamType::Is(TypeTag::Int32);

    registry.define(&string, "Length", vec![], |receiver, _| {
        Ok(Value::from(text(receiver)?.chars().count() as i32))
    });
    registry.define(&string, "ToUpper", vec![], |receiver, _| {
        Ok(Value::from(text(receiver)?.to_uppercase()))
    });
    registry.define(&string, "ToLower", vec![], |receiver, _| {
        Ok(Value::from(text(receiver)?.to_lowercase()))
    });
    registry.define(&string, "Trim", vec![], |receiver, _| {
        Ok(Value::from(text(receiver)?.trim()))
    });
    registry.define(&string, "Contains", vec![s.clone()], |receiver, args| {
        Ok(Value::from(text(receiver)?.contains(text(&args[0])?)))
    });
    registry.define(&string, "StartsWith", vec![s.clone()], |receiver, args| {
        Ok(Value::from(text(receiver)?.starts_with(text(&args[0])?)))
    });
    registry.define(&string, "EndsWith", vec![s], |receiver, args| {
        Ok(Value::from(text(receiver)?.ends_with(text(&args[0])?)))
    });
    registry.define(&string, "Substring", vec![int.clone()], |receiver, args| {
        let chars: Vec<char> = text(receiver)?.chars().collect();
        let start = index(&args[0], chars.len())?;
        Ok(Value::from(chars[start..].iter().collect::<String>()))
    });
    registry.define(
        &string,
        "Substring",
        vec![int.clone(), int],
        |receiver, args| {
            let chars: Vec<char> = text(receiver)?.chars().collect();
            let start = index(&args[0], chars.len())?;
            let length = index(&args[1], chars.len() - start)?;
            Ok(Value::from(
                chars[start..start + length].iter().collect::<String>(),
            ))
        },
    );
}

fn register_map(registry: &mut MethodRegistry) {
    let map = TypeTag::Map.to_string();

    registry.define(&map, "Count", vec![], |receiver, _| {
        Ok(Value::from(entries(receiver)?.len() as i32))
    });
    registry.define(
        &map,
        "ContainsKey",
        vec![ParamType::Is(TypeTag::String)],
        |receiver, args| Ok(Value::from(entries(receiver)?.contains_key(text(&args[0])?))),
    );
    registry.define(
        &map,
        "Get",
        vec![ParamType::Is(TypeTag::String)],
        |receiver, args| {
            Ok(entries(receiver)?
                .get(text(&args[0])?)
                .cloned()
                .unwrap_or_default())
        },
    );
    registry.define(&map, "Keys", vec![], |receiver, _| {
        Ok(Value::List(
            entries(receiver)?.keys().cloned().map(Value::from).collect(),
        ))
    });
}

fn register_list(registry: &mut MethodRegistry) {
    let list = TypeTag::List.to_string();

    registry.define(&list, "Count", vec![], |receiver, _| {
        Ok(Value::from(items(receiver)?.len() as i32))
    });
    registry.define(
        &list,
        "Get",
        vec![ParamType::Is(TypeTag::Int32)],
        |receiver, args| {
            let items = items(receiver)?;
            let at = index(&args[0], items.len().saturating_sub(1))?;
            items
                .get(at)
                .cloned()
                .ok_or_else(|| format!("index {at} is out of range").into())
        },
    );
}

fn text(value: &Value) -> Result<&str, InvocationFailure> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(format!("expected a string, got {}", other.type_name()).into()),
    }
}

fn entries(value: &Value) -> Result<&crate::value::ValueMap, InvocationFailure> {
    value
        .as_map()
        .ok_or_else(|| format!("expected a map, got {}", value.type_name()).into())
}

fn items(value: &Value) -> Result<&[Value], InvocationFailure> {
    match value {
        Value::List(items) => Ok(items),
        other => Err(format!("expected a list, got {}", other.type_name()).into()),
    }
}

/// Reads a non-negative integer argument no greater than `max`.
fn index(value: &Value, max: usize) -> Result<usize, InvocationFailure> {
    let raw = value
        .as_number()
        .and_then(|n| n.as_i128())
        .ok_or_else(|| format!("expected an integer index, got {}", value.type_name()))?;
    usize::try_from(raw)
        .ok()
        .filter(|i| *i <= max)
        .ok_or_else(|| format!("index {raw} is out of range 0..={max}").into())
}
