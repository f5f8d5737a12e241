use std::{
    fmt,
    num::NonZeroUsize,
    sync::{Arc, Mutex, PoisonError},
};

use thiserror::Error;
use tracing::{debug, instrument};

use crate::{
    lru::LruMap,
    value::{Number, TypeTag, Value},
};

use super::registry::{InvocationFailure, MethodDescriptor, MethodId, MethodRegistry, ParamType};

#[derive(Error, Debug)]
pub enum MethodError {
    #[error("no method {type_name}.{method}{signature}")]
    NotFound {
        type_name: String,
        method: String,
        signature: String,
    },
    #[error("invocation of {type_name}.{method} failed: {message}")]
    Invocation {
        type_name: String,
        method: String,
        message: String,
        #[source]
        source: InvocationFailure,
    },
}

/// Receiver type, method name and argument types of a call site shape.
///
/// The name is case-folded unless the receiver type declares methods whose
/// names differ only by case. Those keep the spelling used at the call site,
/// since the exact-case tier depends on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolutionKey {
    pub type_name: String,
    pub method: String,
    pub arguments: Vec<TypeTag>,
}

/// Conversion applied to one argument before invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coercion {
    Identity,
    Widen(TypeTag),
    Stringify,
}

impl Coercion {
    pub fn apply(&self, value: Value) -> Value {
        match (self, value) {
            (Coercion::Identity, value) => value,
            (Coercion::Widen(target), Value::Number(n)) => widen(n, target)
                .map(Value::Number)
                .unwrap_or(Value::Number(n)),
            (Coercion::Stringify, value @ Value::Char(_)) => Value::String(value.to_string()),
            (_, value) => value,
        }
    }
}

/// Chosen overload plus the per-argument coercion plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub method: MethodId,
    pub coercions: Vec<Coercion>,
}

pub type ResolutionCache = LruMap<ResolutionKey, Resolution>;

/// Resolution cache guarded for sharing between resolvers on different threads.
pub type SharedResolutionCache = Arc<Mutex<ResolutionCache>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Fit {
    Exact,
    Compatible,
}

/// Selects and invokes host methods by name and argument values.
///
/// Overloads are ranked in four tiers: exact-case name with exact parameter
/// types, exact-case name with compatible types, then the same two for a
/// case-insensitive name. Within a tier the earliest declared method wins.
/// Decisions are memoised per [`ResolutionKey`].
#[derive(Clone)]
pub struct MethodResolver {
    registry: Arc<MethodRegistry>,
    cache: SharedResolutionCache,
}

impl MethodResolver {
    pub fn new(registry: Arc<MethodRegistry>, capacity: NonZeroUsize) -> Self {
        Self::with_shared_cache(registry, Self::new_cache(capacity))
    }

    pub fn with_shared_cache(registry: Arc<MethodRegistry>, cache: SharedResolutionCache) -> Self {
        Self { registry, cache }
    }

    pub fn new_cache(capacity: NonZeroUsize) -> SharedResolutionCache {
        Arc::new(Mutex::new(LruMap::new(capacity)))
    }

    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    pub fn cached_resolutions(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[instrument(level = "debug", skip(self, receiver, arguments))]
    pub fn resolve(
        &self,
        receiver: &Value,
        name: &str,
        arguments: &[Value],
    ) -> Result<Resolution, MethodError> {
        let type_name = receiver.type_name();
        let folded = name.to_lowercase();
        let method = if self.registry.has_case_variants(&type_name, &folded) {
            name.to_string()
        } else {
            folded
        };
        let key = ResolutionKey {
            type_name,
            method,
            arguments: arguments.iter().map(Value::type_tag).collect(),
        };

        {
            let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(hit) = cache.get(&key) {
                debug!(?key, "resolution cache hit");
                return Ok(hit.clone());
            }
        }

        let resolution = self.select(&key, name).ok_or_else(|| MethodError::NotFound {
            type_name: key.type_name.clone(),
            method: name.to_string(),
            signature: signature(&key.arguments),
        })?;

        debug!(?key, ?resolution, "resolved method");
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(key, resolution.clone());
        Ok(resolution)
    }

    /// Applies the coercion plan and calls the chosen method.
    pub fn invoke(
        &self,
        resolution: &Resolution,
        receiver: &Value,
        arguments: Vec<Value>,
    ) -> Result<Value, MethodError> {
        let method = self.registry.descriptor(resolution.method).ok_or_else(|| {
            MethodError::NotFound {
                type_name: receiver.type_name(),
                method: format!("{:?}", resolution.method),
                signature: String::new(),
            }
        })?;
        let arguments: Vec<Value> = arguments
            .into_iter()
            .zip(&resolution.coercions)
            .map(|(value, coercion)| coercion.apply(value))
            .collect();

        method
            .invoke(receiver, &arguments)
            .map_err(|source| MethodError::Invocation {
                type_name: method.type_name.clone(),
                method: method.name.clone(),
                message: source.to_string(),
                source,
            })
    }

    pub fn call(
        &self,
        receiver: &Value,
        name: &str,
        arguments: Vec<Value>,
    ) -> Result<Value, MethodError> {
        let resolution = self.resolve(receiver, name, &arguments)?;
        self.invoke(&resolution, receiver, arguments)
    }

    fn select(&self, key: &ResolutionKey, name: &str) -> Option<Resolution> {
        let candidates: Vec<(MethodId, &MethodDescriptor)> = self
            .registry
            .candidates(&key.type_name)
            .filter(|(_, method)| method.arity() == key.arguments.len())
            .collect();

        let folded_name = name.to_lowercase();
        let exact_case = candidates.iter().filter(|(_, m)| m.name == name);
        let folded = candidates
            .iter()
            .filter(|(_, m)| m.name != name && m.name.to_lowercase() == folded_name);

        let mut exact_case_hits: Vec<_> = exact_case
            .filter_map(|(id, m)| fit(m, &key.arguments).map(|f| (*id, f)))
            .collect();
        let mut folded_hits: Vec<_> = folded
            .filter_map(|(id, m)| fit(m, &key.arguments).map(|f| (*id, f)))
            .collect();

        best(&mut exact_case_hits).or_else(|| best(&mut folded_hits))
    }
}

impl fmt::Debug for MethodResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodResolver")
            .field("methods", &self.registry.len())
            .field("cached", &self.cached_resolutions())
            .finish()
    }
}

// Stable sort keeps declaration order inside a tier.
fn best(hits: &mut [(MethodId, (Fit, Vec<Coercion>))]) -> Option<Resolution> {
    hits.sort_by_key(|(_, (fit, _))| *fit);
    hits.first().map(|(id, (_, coercions))| Resolution {
        method: *id,
        coercions: coercions.clone(),
    })
}

fn fit(method: &MethodDescriptor, arguments: &[TypeTag]) -> Option<(Fit, Vec<Coercion>)> {
    let mut overall = Fit::Exact;
    let mut coercions = Vec::with_capacity(arguments.len());
    for (param, argument) in method.params.iter().zip(arguments) {
        let (fit, coercion) = fit_param(param, argument)?;
        overall = overall.max(fit);
        coercions.push(coercion);
    }
    Some((overall, coercions))
}

fn fit_param(param: &ParamType, argument: &TypeTag) -> Option<(Fit, Coercion)> {
    let ParamType::Is(target) = param else {
        return Some((Fit::Compatible, Coercion::Identity));
    };
    if target == argument {
        return Some((Fit::Exact, Coercion::Identity));
    }
    match (argument, target) {
        (a, t) if a.is_numeric() && t.is_numeric() && widens(a, t) => {
            Some((Fit::Compatible, Coercion::Widen(t.clone())))
        }
        (TypeTag::Char, TypeTag::String) => Some((Fit::Compatible, Coercion::Stringify)),
        (TypeTag::Null, t) if accepts_null(t) => Some((Fit::Compatible, Coercion::Identity)),
        _ => None,
    }
}

fn accepts_null(target: &TypeTag) -> bool {
    matches!(
        target,
        TypeTag::String | TypeTag::List | TypeTag::Map | TypeTag::Object(_)
    )
}

fn rank(tag: &TypeTag) -> Option<(u8, u32)> {
    Some(match tag {
        TypeTag::Int8 => (0, 8),
        TypeTag::Int16 => (0, 16),
        TypeTag::Int32 => (0, 32),
        TypeTag::Int64 => (0, 64),
        TypeTag::UInt8 => (1, 8),
        TypeTag::UInt16 => (1, 16),
        TypeTag::UInt32 => (1, 32),
        TypeTag::UInt64 => (1, 64),
        TypeTag::Single => (2, 32),
        TypeTag::Double => (3, 64),
        _ => return None,
    })
}

/// Implicit numeric conversions: integers widen to any float, signed to wider
/// signed, unsigned to wider unsigned or wider signed, single to double.
fn widens(from: &TypeTag, to: &TypeTag) -> bool {
    let (Some((from_class, from_bits)), Some((to_class, to_bits))) = (rank(from), rank(to)) else {
        return false;
    };
    match to_class {
        3 => true,
        2 => from_class < 2,
        0 => from_class <= 1 && from_bits < to_bits,
        1 => from_class == 1 && from_bits < to_bits,
        _ => false,
    }
}

fn widen(n: Number, target: &TypeTag) -> Option<Number> {
    let exact = n.as_i128();
    Some(match target {
        TypeTag::Double => Number::F64(n.as_f64()),
        TypeTag::Single => Number::F32(n.as_f32()),
        TypeTag::Int16 => Number::I16(i16::try_from(exact?).ok()?),
        TypeTag::Int32 => Number::I32(i32::try_from(exact?).ok()?),
        TypeTag::Int64 => Number::I64(i64::try_from(exact?).ok()?),
        TypeTag::UInt16 => Number::U16(u16::try_from(exact?).ok()?),
        TypeTag::UInt32 => Number::U32(u32::try_from(exact?).ok()?),
        TypeTag::UInt64 => Number::U64(u64::try_from(exact?).ok()?),
        _ => return None,
    })
}

fn signature(arguments: &[TypeTag]) -> String {
    let names: Vec<String> = arguments.iter().map(ToString::to_string).collect();
    format!("({})", names.join(", "))
}
