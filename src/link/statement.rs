//! Clause-like links whose arguments render as literal text.
//!
//! Builders among the arguments render in place and `Param` values bind
//! under their own name; nothing else is bound.

use super::{Render, RenderContext, Whitespace, string_arg, take_slots};
use crate::error::Result;
use crate::quote::quote_property;
use crate::value::{Args, Value};

/// A clause: `NAME` or `NAME arg, arg`.
#[derive(Debug, Clone, Default)]
pub struct Statement {
    name: String,
    args: Vec<Value>,
}

impl Statement {
    pub fn new(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Render for Statement {
    fn render(&self, ctx: &RenderContext) -> Result<String> {
        if self.args.is_empty() {
            return Ok(self.name.clone());
        }
        let args = ctx.join(&self.args, |arg| ctx.literal(arg))?;
        Ok(format!("{} {}", self.name, args))
    }
}

/// Arguments emitted verbatim, separated by single spaces.
#[derive(Debug, Clone, Default)]
pub struct Raw {
    args: Vec<Value>,
}

impl Raw {
    pub fn new(args: Vec<Value>) -> Self {
        Self { args }
    }
}

impl Render for Raw {
    fn render(&self, ctx: &RenderContext) -> Result<String> {
        let parts = self
            .args
            .iter()
            .map(|arg| ctx.literal(arg))
            .collect::<Result<Vec<_>>>()?;
        Ok(parts.join(" "))
    }
}

/// A `.property` accessor. Clears the whitespace before it so that it
/// attaches to the preceding variable.
#[derive(Debug, Clone, Default)]
pub struct Property {
    name: String,
}

impl Property {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn from_args(mut args: Args) -> Result<Self> {
        let name = take_slots(&mut args, &["name"], "property")?
            .pop()
            .flatten()
            .unwrap_or_default();
        Ok(Self::new(string_arg(&name, "property name")?))
    }
}

impl Render for Property {
    fn render(&self, _ctx: &RenderContext) -> Result<String> {
        Ok(format!(".{}", quote_property(&self.name)))
    }

    fn whitespace(&self) -> Whitespace {
        Whitespace::ACCESSOR
    }
}
