//! Binary operators.

use super::{Render, RenderContext, Whitespace, take_slots};
use crate::error::{BuilderError, Result};
use crate::value::{Args, Value};

/// `OP value`, or `value OP` when inverted.
///
/// The operand is bound unless it is a nested builder, or unless binding is
/// disabled (aliases and other raw operators). Map operands expand into a
/// map literal whose leaves are bound one by one.
#[derive(Debug, Clone, Default)]
pub struct Operator {
    operator: String,
    value: Value,
    inverse: bool,
    bind: bool,
}

impl Operator {
    pub fn new(operator: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            operator: operator.into(),
            value: value.into(),
            inverse: false,
            bind: true,
        }
    }

    /// An operator whose operand is emitted verbatim.
    pub fn raw(operator: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            bind: false,
            ..Self::new(operator, value)
        }
    }

    pub fn inverted(mut self) -> Self {
        self.inverse = true;
        self
    }

    pub fn from_args(operator: &str, bind: bool, mut args: Args) -> Result<Self> {
        let inverse = match args.take("inverse") {
            None => false,
            Some(Value::Bool(b)) => b,
            Some(other) => {
                return Err(BuilderError::invalid(format!(
                    "inverse must be a bool, got {}",
                    other.type_name()
                )));
            }
        };
        let value = take_slots(&mut args, &["value"], "operator")?
            .pop()
            .flatten()
            .unwrap_or_default();
        Ok(Self {
            operator: operator.to_string(),
            value,
            inverse,
            bind,
        })
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    pub fn is_inverse(&self) -> bool {
        self.inverse
    }
}

impl Render for Operator {
    fn render(&self, ctx: &RenderContext) -> Result<String> {
        let value = match &self.value {
            v if v.is_builder() => ctx.nested(v)?,
            v @ Value::Map(_) => ctx.expand(v, self.bind)?,
            v if self.bind => ctx.placeholder(v)?,
            v => ctx.literal(v)?,
        };
        if self.inverse {
            Ok(format!("{} {}", value, self.operator))
        } else {
            Ok(format!("{} {}", self.operator, value))
        }
    }

    fn whitespace(&self) -> Whitespace {
        Whitespace::OPERATOR
    }
}
