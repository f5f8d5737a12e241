//! # Vellum: a Velocity-style text templating engine
//!
//! Templates mix literal text with `$references`, `#set`/`#if` directives and
//! inline `%{ key = value }` map literals. Rendering walks the parsed tree
//! against a variable [`Context`](eval::Context) and writes text to any
//! [`std::fmt::Write`] sink.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Parser → Template (AST) → Evaluator → Output
//! ```
//!
//! - [`parser`] builds the [`ast`] with nom combinators. Map literal entries
//!   are split with the delimiter [`tokenizer`].
//! - [`eval`] renders the tree. Dynamic values and their promotion and
//!   comparison rules live in [`value`].
//! - Member access on values goes through [`host`]: a registry of host
//!   methods and a resolver that picks overloads and memoises the choice in
//!   an [`lru`] cache.
//! - [`Engine`] ties these together behind an `evaluate(...) -> bool` call.
//!
//! ```
//! use vellum::{Engine, TemplateContext};
//!
//! let engine = Engine::default();
//! let mut context = TemplateContext::new().with("name", "world");
//! let mut out = String::new();
//! assert!(engine.evaluate(&mut context, &mut out, "hello", "Hello $name!$!nothing"));
//! assert_eq!(out, "Hello world!");
//! ```

pub mod ast;
pub mod config;
pub mod dump;
pub mod engine;
pub mod error;
pub mod eval;
pub mod host;
pub mod lru;
pub mod parser;
pub mod tokenizer;
pub mod value;

// Re-exports
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::*;
pub use eval::{Context, TemplateContext};
pub use host::{MethodRegistry, ParamType};
pub use value::{EnumMember, HostObject, TypeTag, Value, ValueMap};
