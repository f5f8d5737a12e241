use tracing::{debug, warn};

use crate::{
    ast::{
        Accessor, ArithmeticOperator, Expression, Literal, LogicalOperator, MapLiteral, MapValue,
        Reference,
    },
    host::MethodError,
    value::{compare, Number, Value, ValueMap},
};

use super::{
    context::Context,
    evaluator::{EvalError, EvalResult, Evaluator},
};

impl Evaluator {
    pub(super) fn eval_expression(
        &self,
        expression: &Expression,
        context: &mut dyn Context,
    ) -> EvalResult<Value> {
        match expression {
            Expression::Literal(literal) => Ok(literal_value(literal)),
            Expression::Reference(reference) => self.resolve_reference(reference, context),
            Expression::Interpolated(nodes) => {
                Ok(Value::String(self.render_to_string(nodes, context)?))
            }
            Expression::Map(literal) => Ok(Value::Map(self.eval_map_literal(literal, context)?)),
            Expression::List(items) => Ok(Value::List(
                items
                    .iter()
                    .map(|item| self.eval_expression(item, context))
                    .collect::<EvalResult<_>>()?,
            )),
            Expression::Arithmetic { op, left, right } => {
                let left = self.eval_expression(left, context)?;
                let right = self.eval_expression(right, context)?;
                eval_arithmetic(*op, &left, &right)
            }
            Expression::Comparison { op, left, right } => {
                let left = self.eval_expression(left, context)?;
                let right = self.eval_expression(right, context)?;
                Ok(Value::Boolean(compare::test(*op, &left, &right)))
            }
            Expression::Logical { op, left, right } => {
                let left = self.eval_expression(left, context)?.is_truthy();
                let result = match (op, left) {
                    (LogicalOperator::And, false) => false,
                    (LogicalOperator::Or, true) => true,
                    _ => self.eval_expression(right, context)?.is_truthy(),
                };
                Ok(Value::Boolean(result))
            }
            Expression::Not(operand) => Ok(Value::Boolean(
                !self.eval_expression(operand, context)?.is_truthy(),
            )),
            Expression::Negate(operand) => match self.eval_expression(operand, context)? {
                Value::Null => Ok(Value::Null),
                Value::Number(n) => Ok(Value::Number(n.negate())),
                other => Err(EvalError::InvalidUnaryOperand {
                    operator: "-".to_string(),
                    operand: other.type_name(),
                }),
            },
        }
    }

    /// Walks the accessor chain. Anything unresolved along the way is null.
    pub(super) fn resolve_reference(
        &self,
        reference: &Reference,
        context: &mut dyn Context,
    ) -> EvalResult<Value> {
        let Some(mut current) = context.get(&reference.root).cloned() else {
            debug!(reference = %reference, "unresolved variable");
            return Ok(Value::Null);
        };

        for accessor in &reference.path {
            if current.is_null() {
                return Ok(Value::Null);
            }
            current = match accessor {
                Accessor::Property(name) => self.property(&current, name)?,
                Accessor::Method { name, arguments } => {
                    let arguments = arguments
                        .iter()
                        .map(|argument| self.eval_expression(argument, context))
                        .collect::<EvalResult<Vec<_>>>()?;
                    self.resolver.call(&current, name, arguments)?
                }
            };
        }
        Ok(current)
    }

    /// Map keys first, then a zero-argument member of the same name.
    fn property(&self, receiver: &Value, name: &str) -> EvalResult<Value> {
        if let Some(value) = receiver.as_map().and_then(|map| map.get(name)) {
            return Ok(value.clone());
        }
        match self.resolver.call(receiver, name, Vec::new()) {
            Ok(value) => Ok(value),
            Err(MethodError::NotFound { .. }) => Ok(Value::Null),
            Err(error) => Err(error.into()),
        }
    }

    fn eval_map_literal(
        &self,
        literal: &MapLiteral,
        context: &mut dyn Context,
    ) -> EvalResult<ValueMap> {
        let mut map = ValueMap::with_capacity(literal.entries.len());
        for entry in &literal.entries {
            let value = match &entry.value {
                MapValue::Text(nodes) => Value::String(self.render_to_string(nodes, context)?),
                MapValue::Number(literal) => literal_value(literal),
                MapValue::Boolean(b) => Value::Boolean(*b),
                MapValue::Map(nested) => Value::Map(self.eval_map_literal(nested, context)?),
                MapValue::Reference { reference, quote } => {
                    match (self.resolve_reference(reference, context)?, quote) {
                        (Value::Null, _) => Value::Null,
                        (value, Some(quote)) => {
                            Value::String(format!("{quote}{}{quote}", self.stringify(&value)?))
                        }
                        (value, None) => value,
                    }
                }
            };
            map.insert(entry.key.clone(), value);
        }
        Ok(map)
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Integer(v) => Value::from(*v),
        Literal::Long(v) => Value::from(*v),
        Literal::Double(v) => Value::from(*v),
        Literal::String(s) => Value::String(s.clone()),
        Literal::Boolean(b) => Value::Boolean(*b),
        Literal::Null => Value::Null,
    }
}

/// Null operands and division by zero produce null rather than an error.
fn eval_arithmetic(op: ArithmeticOperator, left: &Value, right: &Value) -> EvalResult<Value> {
    if left.is_null() || right.is_null() {
        warn!(%op, "arithmetic on a null operand");
        return Ok(Value::Null);
    }
    match (left.as_number(), right.as_number()) {
        (Some(l), Some(r)) => match Number::apply(op, l, r) {
            Some(result) => Ok(Value::Number(result)),
            None => {
                warn!(%op, left = %l, right = %r, "division by zero");
                Ok(Value::Null)
            }
        },
        _ => Err(EvalError::InvalidOperand {
            operator: op.to_string(),
            left: left.type_name(),
            right: right.type_name(),
        }),
    }
}
