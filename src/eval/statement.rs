use std::fmt;

use tracing::debug;

use crate::{
    ast::{IfDirective, Node, Reference, SetDirective},
    host::MethodError,
    value::Value,
};

use super::{
    context::Context,
    evaluator::{Diagnostics, EvalError, EvalResult, Evaluator},
};

impl Evaluator {
    pub(super) fn render_nodes(
        &self,
        nodes: &[Node],
        context: &mut dyn Context,
        out: &mut dyn fmt::Write,
        diagnostics: &mut Diagnostics,
    ) -> EvalResult<()> {
        for node in nodes {
            match node {
                Node::Text(text) => out.write_str(text)?,
                Node::Reference(reference) => {
                    self.render_reference(reference, context, out, diagnostics)?
                }
                Node::Set(set) => self.eval_set(set, context, diagnostics)?,
                Node::If(directive) => self.render_if(directive, context, out, diagnostics)?,
            }
        }
        Ok(())
    }

    /// Renders nested text such as an interpolated string. A type error inside
    /// it fails the enclosing expression.
    pub(super) fn render_to_string(
        &self,
        nodes: &[Node],
        context: &mut dyn Context,
    ) -> EvalResult<String> {
        let mut out = String::new();
        let mut diagnostics = Diagnostics::default();
        self.render_nodes(nodes, context, &mut out, &mut diagnostics)?;
        diagnostics.finish()?;
        Ok(out)
    }

    fn render_reference(
        &self,
        reference: &Reference,
        context: &mut dyn Context,
        out: &mut dyn fmt::Write,
        diagnostics: &mut Diagnostics,
    ) -> EvalResult<()> {
        let value = diagnostics
            .absorb(self.resolve_reference(reference, context))?
            .unwrap_or(Value::Null);
        if !value.is_null() {
            return Ok(out.write_str(&self.stringify(&value)?)?);
        }
        if reference.quiet {
            return Ok(());
        }
        if self.strict_references {
            return Err(EvalError::UndefinedReference {
                literal: reference.literal.clone(),
            });
        }
        Ok(out.write_str(&reference.literal)?)
    }

    fn eval_set(
        &self,
        set: &SetDirective,
        context: &mut dyn Context,
        diagnostics: &mut Diagnostics,
    ) -> EvalResult<()> {
        let value = diagnostics
            .absorb(self.eval_expression(&set.value, context))?
            .unwrap_or(Value::Null);
        debug!(variable = %set.target, value = ?value, "#set");
        context.put(&set.target, value);
        Ok(())
    }

    fn render_if(
        &self,
        directive: &IfDirective,
        context: &mut dyn Context,
        out: &mut dyn fmt::Write,
        diagnostics: &mut Diagnostics,
    ) -> EvalResult<()> {
        for branch in &directive.branches {
            let condition = diagnostics.absorb(self.eval_expression(&branch.condition, context))?;
            if condition.is_some_and(|value| value.is_truthy()) {
                return self.render_nodes(&branch.body, context, out, diagnostics);
            }
        }
        match &directive.otherwise {
            Some(body) => self.render_nodes(body, context, out, diagnostics),
            None => Ok(()),
        }
    }

    /// Text form of a value. Host objects use their `ToString` member when they have one.
    pub(super) fn stringify(&self, value: &Value) -> EvalResult<String> {
        if let Value::Object(object) = value {
            return match self.resolver.call(value, "ToString", Vec::new()) {
                Ok(text) => Ok(text.to_string()),
                Err(MethodError::NotFound { .. }) => Ok(object.type_name().to_string()),
                Err(error) => Err(error.into()),
            };
        }
        Ok(value.to_string())
    }
}
