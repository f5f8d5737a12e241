//! Tree-walking evaluation of parsed templates.

pub mod context;
pub mod evaluator;
mod expression;
mod statement;

pub use context::{Context, TemplateContext};
pub use evaluator::{EvalError, EvalResult, Evaluator};
