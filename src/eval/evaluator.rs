use std::fmt;

use thiserror::Error;
use tracing::{error, instrument};

use crate::{
    ast::{Expression, Template},
    host::{MethodError, MethodResolver},
    value::Value,
};

use super::context::Context;

#[derive(Error, Debug)]
pub enum EvalError {
    #[error("cannot apply '{operator}' to {left} and {right}")]
    InvalidOperand {
        operator: String,
        left: String,
        right: String,
    },
    #[error("cannot apply '{operator}' to {operand}")]
    InvalidUnaryOperand { operator: String, operand: String },
    #[error("{literal} is not defined")]
    UndefinedReference { literal: String },
    #[error(transparent)]
    Method(#[from] MethodError),
    #[error("failed to write output")]
    Output(#[from] fmt::Error),
}

impl EvalError {
    /// Operand kind errors. These are absorbed while rendering instead of aborting it.
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            EvalError::InvalidOperand { .. } | EvalError::InvalidUnaryOperand { .. }
        )
    }
}

pub type EvalResult<T> = Result<T, EvalError>;

/// Type errors absorbed during one render. The first is reported once the render completes.
#[derive(Debug, Default)]
pub(super) struct Diagnostics {
    first: Option<EvalError>,
    absorbed: usize,
}

impl Diagnostics {
    /// Turns a type error into `None` and records it. Other errors pass through.
    pub(super) fn absorb<T>(&mut self, result: EvalResult<T>) -> EvalResult<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_type_error() => {
                error!(error = %e, "type error, value treated as null");
                self.absorbed += 1;
                self.first.get_or_insert(e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub(super) fn finish(self) -> EvalResult<()> {
        match self.first {
            Some(e) => {
                if self.absorbed > 1 {
                    error!(absorbed = self.absorbed, "render completed with type errors");
                }
                Err(e)
            }
            None => Ok(()),
        }
    }
}

/// Renders templates, dispatching member access through a [`MethodResolver`].
#[derive(Clone)]
pub struct Evaluator {
    pub(super) resolver: MethodResolver,
    pub(super) strict_references: bool,
}

impl Evaluator {
    pub fn new(resolver: MethodResolver) -> Self {
        Self {
            resolver,
            strict_references: false,
        }
    }

    /// Makes unresolved non-quiet references an error instead of printing their source text.
    pub fn with_strict_references(mut self, strict: bool) -> Self {
        self.strict_references = strict;
        self
    }

    pub fn resolver(&self) -> &MethodResolver {
        &self.resolver
    }

    /// Top level entry point. Output already written stays in `out` on error.
    ///
    /// A type error does not stop the render: the offending value is null and
    /// the rest of the template is still written. The first one is returned
    /// once the whole template has been rendered.
    #[instrument(level = "debug", skip_all, fields(label = %template.label))]
    pub fn render(
        &self,
        template: &Template,
        context: &mut dyn Context,
        out: &mut dyn fmt::Write,
    ) -> EvalResult<()> {
        let mut diagnostics = Diagnostics::default();
        self.render_nodes(&template.nodes, context, out, &mut diagnostics)?;
        diagnostics.finish()
    }

    pub fn evaluate(&self, expression: &Expression, context: &mut dyn Context) -> EvalResult<Value> {
        self.eval_expression(expression, context)
    }
}
