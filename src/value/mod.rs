//! Dynamic value domain shared by the evaluator, the comparator and host methods.

pub mod compare;
pub mod format;
pub mod number;

use std::{any::Any, fmt, sync::Arc};

use chrono::{NaiveDateTime, TimeDelta};
use indexmap::IndexMap;

pub use compare::{compare, values_equal};
pub use number::{Number, NumberClass};

pub type ValueMap = IndexMap<String, Value>;

#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Number(Number),
    Char(char),
    String(String),
    Enum(EnumMember),
    DateTime(NaiveDateTime),
    TimeSpan(TimeDelta),
    List(Vec<Value>),
    Map(ValueMap),
    Object(HostObject),
}

/// Runtime type of a value, as seen by overload resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Null,
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Single,
    Double,
    Char,
    String,
    Enum(Arc<str>),
    DateTime,
    TimeSpan,
    List,
    Map,
    Object(Arc<str>),
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Enum(name) | TypeTag::Object(name) => f.write_str(name),
            other => write!(f, "{other:?}"),
        }
    }
}

impl TypeTag {
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TypeTag::Int8
                | TypeTag::Int16
                | TypeTag::Int32
                | TypeTag::Int64
                | TypeTag::UInt8
                | TypeTag::UInt16
                | TypeTag::UInt32
                | TypeTag::UInt64
                | TypeTag::Single
                | TypeTag::Double
        )
    }
}

/// A member of a host enumeration: its type, name and declaration ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumMember {
    pub type_name: Arc<str>,
    pub name: String,
    pub ordinal: i64,
}

impl EnumMember {
    pub fn new(type_name: impl Into<Arc<str>>, name: impl Into<String>, ordinal: i64) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
            ordinal,
        }
    }
}

/// Opaque host value. Dispatch goes through the method registry using `type_name`.
#[derive(Clone)]
pub struct HostObject {
    type_name: Arc<str>,
    handle: Arc<dyn Any + Send + Sync>,
}

impl HostObject {
    pub fn new<T: Any + Send + Sync>(type_name: impl Into<Arc<str>>, value: T) -> Self {
        Self {
            type_name: type_name.into(),
            handle: Arc::new(value),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.handle.downcast_ref::<T>()
    }

    /// True when both handles point at the same host allocation.
    pub fn same_instance(&self, other: &HostObject) -> bool {
        Arc::as_ptr(&self.handle) as *const () == Arc::as_ptr(&other.handle) as *const ()
    }
}

impl fmt::Debug for HostObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostObject")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

impl Value {
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Null => TypeTag::Null,
            Value::Boolean(_) => TypeTag::Boolean,
            Value::Number(n) => n.type_tag(),
            Value::Char(_) => TypeTag::Char,
            Value::String(_) => TypeTag::String,
            Value::Enum(member) => TypeTag::Enum(member.type_name.clone()),
            Value::DateTime(_) => TypeTag::DateTime,
            Value::TimeSpan(_) => TypeTag::TimeSpan,
            Value::List(_) => TypeTag::List,
            Value::Map(_) => TypeTag::Map,
            Value::Object(object) => TypeTag::Object(object.type_name.clone()),
        }
    }

    /// Key under which members of this value are registered.
    pub fn type_name(&self) -> String {
        self.type_tag().to_string()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Conditions treat null and `false` as false and everything else as true.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Boolean(false))
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Char(c) => write!(f, "{c}"),
            Value::String(s) => f.write_str(s),
            Value::Enum(member) => f.write_str(&member.name),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.f")),
            Value::TimeSpan(span) => write_time_span(f, *span),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}={value}")?;
                }
                f.write_str("}")
            }
            Value::Object(object) => f.write_str(object.type_name()),
        }
    }
}

// [-][d.]hh:mm:ss[.fffffff]
fn write_time_span(f: &mut fmt::Formatter<'_>, span: TimeDelta) -> fmt::Result {
    if span < TimeDelta::zero() {
        f.write_str("-")?;
    }
    let seconds = span.num_seconds().unsigned_abs();
    let ticks = span.subsec_nanos().unsigned_abs() / 100;
    let (days, rest) = (seconds / 86_400, seconds % 86_400);
    if days > 0 {
        write!(f, "{days}.")?;
    }
    write!(
        f,
        "{:02}:{:02}:{:02}",
        rest / 3600,
        (rest % 3600) / 60,
        rest % 60
    )?;
    if ticks > 0 {
        write!(f, ".{ticks:07}")?;
    }
    Ok(())
}

macro_rules! value_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Number(value.into())
                }
            }
        )*
    };
}

value_from_number!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Char(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl From<TimeDelta> for Value {
    fn from(value: TimeDelta) -> Self {
        Value::TimeSpan(value)
    }
}

impl From<EnumMember> for Value {
    fn from(value: EnumMember) -> Self {
        Value::Enum(value)
    }
}

impl From<HostObject> for Value {
    fn from(value: HostObject) -> Self {
        Value::Object(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<ValueMap> for Value {
    fn from(value: ValueMap) -> Self {
        Value::Map(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    match i32::try_from(i) {
                        Ok(i) => Value::from(i),
                        Err(_) => Value::from(i),
                    }
                } else if let Some(u) = n.as_u64() {
                    Value::from(u)
                } else {
                    Value::from(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}
