//! Capability registry for host-exposed methods and the overload resolver.

pub mod builtins;
pub mod registry;
pub mod resolver;

pub use registry::{
    InvocationFailure, MethodDescriptor, MethodId, MethodRegistry, ParamType, TypeRegistration,
};
pub use resolver::{
    Coercion, MethodError, MethodResolver, Resolution, ResolutionKey, SharedResolutionCache,
};
