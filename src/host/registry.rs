use std::{
    any::Any,
    collections::{HashMap, HashSet},
    fmt,
    marker::PhantomData,
    sync::Arc,
};

use thiserror::Error;
use tracing::debug;

use crate::value::{TypeTag, Value};

/// Failure raised by a host method. Preserved as the source of an invocation error.
pub type InvocationFailure = Box<dyn std::error::Error + Send + Sync>;

pub type Invocable =
    Arc<dyn Fn(&Value, &[Value]) -> Result<Value, InvocationFailure> + Send + Sync>;

/// Declared parameter type of a host method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// Accepts any value, including null. Never an exact match.
    Any,
    Is(TypeTag),
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Any => f.write_str("Any"),
            ParamType::Is(tag) => write!(f, "{tag}"),
        }
    }
}

impl From<TypeTag> for ParamType {
    fn from(tag: TypeTag) -> Self {
        ParamType::Is(tag)
    }
}

/// Stable index of a method descriptor inside a [`MethodRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodId(usize);

pub struct MethodDescriptor {
    pub type_name: String,
    pub name: String,
    pub params: Vec<ParamType>,
    invocable: Invocable,
}

impl MethodDescriptor {
    pub fn invoke(&self, receiver: &Value, arguments: &[Value]) -> Result<Value, InvocationFailure> {
        (self.invocable)(receiver, arguments)
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("type_name", &self.type_name)
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.type_name, self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        f.write_str(")")
    }
}

#[derive(Error, Debug)]
#[error("receiver is not a {expected} host object (got {actual})")]
pub struct ReceiverMismatch {
    pub expected: String,
    pub actual: String,
}

/// Arena of host-exposed methods, grouped per receiver type in declaration order.
#[derive(Default)]
pub struct MethodRegistry {
    methods: Vec<MethodDescriptor>,
    by_type: HashMap<String, Vec<MethodId>>,
    /// (type, lowercase name) pairs declared under more than one spelling.
    case_variants: HashSet<(String, String)>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in string, map and list members and
    /// the map dump helper.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        super::builtins::register(&mut registry);
        crate::dump::register(&mut registry);
        registry
    }

    /// Adds a method whose receiver is any value tagged `type_name`.
    pub fn define<F>(
        &mut self,
        type_name: &str,
        name: &str,
        params: Vec<ParamType>,
        invocable: F,
    ) -> MethodId
    where
        F: Fn(&Value, &[Value]) -> Result<Value, InvocationFailure> + Send + Sync + 'static,
    {
        let id = MethodId(self.methods.len());
        debug!(type_name, name, arity = params.len(), "registering method");
        let folded = name.to_lowercase();
        let respelled = self
            .candidates(type_name)
            .any(|(_, method)| method.name != name && method.name.to_lowercase() == folded);
        if respelled {
            debug!(type_name, name, "method name differs from an existing one only by case");
            self.case_variants.insert((type_name.to_string(), folded));
        }
        self.methods.push(MethodDescriptor {
            type_name: type_name.to_string(),
            name: name.to_string(),
            params,
            invocable: Arc::new(invocable),
        });
        self.by_type.entry(type_name.to_string()).or_default().push(id);
        id
    }

    /// Starts a typed registration for host objects carrying a `T`.
    pub fn register<T: Any + Send + Sync>(&mut self, type_name: &str) -> TypeRegistration<'_, T> {
        TypeRegistration {
            registry: self,
            type_name: type_name.to_string(),
            _marker: PhantomData,
        }
    }

    pub fn descriptor(&self, id: MethodId) -> Option<&MethodDescriptor> {
        self.methods.get(id.0)
    }

    /// Methods of `type_name` in declaration order.
    pub fn candidates<'a>(
        &'a self,
        type_name: &str,
    ) -> impl Iterator<Item = (MethodId, &'a MethodDescriptor)> + 'a {
        self.by_type
            .get(type_name)
            .into_iter()
            .flatten()
            .filter_map(|id| self.methods.get(id.0).map(|method| (*id, method)))
    }

    /// Whether `type_name` declares methods whose names differ only by case
    /// from `folded_name`, which must already be lowercase.
    pub fn has_case_variants(&self, type_name: &str, folded_name: &str) -> bool {
        self.case_variants
            .contains(&(type_name.to_string(), folded_name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl fmt::Debug for MethodRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.methods.iter()).finish()
    }
}

/// Builder returned by [`MethodRegistry::register`].
pub struct TypeRegistration<'r, T> {
    registry: &'r mut MethodRegistry,
    type_name: String,
    _marker: PhantomData<fn() -> T>,
}

impl<'r, T: Any + Send + Sync> TypeRegistration<'r, T> {
    pub fn method<F>(self, name: &str, params: Vec<ParamType>, invocable: F) -> Self
    where
        F: Fn(&T, &[Value]) -> Result<Value, InvocationFailure> + Send + Sync + 'static,
    {
        let expected = self.type_name.clone();
        self.registry.define(
            &self.type_name,
            name,
            params,
            move |receiver: &Value, arguments: &[Value]| {
                let host = match receiver {
                    Value::Object(object) => object.downcast_ref::<T>(),
                    _ => None,
                };
                match host {
                    Some(host) => invocable(host, arguments),
                    None => Err(ReceiverMismatch {
                        expected: expected.clone(),
                        actual: receiver.type_name(),
                    }
                    .into()),
                }
            },
        );
        self
    }

    /// Zero-argument member that always yields `value`.
    pub fn constant(self, name: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.method(name, Vec::new(), move |_, _| Ok(value.clone()))
    }
}
