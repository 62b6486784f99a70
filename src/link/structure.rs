//! List and map literals.

use std::collections::BTreeMap;

use super::{Render, RenderContext, Whitespace, string_arg};
use crate::error::Result;
use crate::params::NameHint;
use crate::quote::quote_map_key;
use crate::value::{Args, Value};

/// `[a, b]` with every literal bound. A plain list attaches to what comes
/// before it (`n[0]`); a comprehension stands apart (`RETURN [x IN ..]`).
#[derive(Debug, Clone, Default)]
pub struct List {
    items: Vec<Value>,
    comprehension: bool,
}

impl List {
    pub fn new(items: Vec<Value>) -> Self {
        Self {
            items,
            comprehension: false,
        }
    }

    pub fn comprehension(items: Vec<Value>) -> Self {
        Self {
            items,
            comprehension: true,
        }
    }
}

impl Render for List {
    fn render(&self, ctx: &RenderContext) -> Result<String> {
        Ok(format!("[{}]", ctx.join(&self.items, |item| ctx.placeholder(item))?))
    }

    fn whitespace(&self) -> Whitespace {
        if self.comprehension {
            Whitespace::CLAUSE
        } else {
            Whitespace::ACCESSOR
        }
    }
}

/// A map literal.
///
/// Positional entries render as bare identifiers, which is how projection
/// shorthand (`{.name, .age}`) is written. Keyword entries render as quoted
/// keys in sorted order; their scalar values are bound under names derived
/// from the key.
#[derive(Debug, Clone, Default)]
pub struct Map {
    positional: Vec<Value>,
    entries: BTreeMap<String, Value>,
}

impl Map {
    pub fn new(positional: Vec<Value>, entries: BTreeMap<String, Value>) -> Self {
        Self {
            positional,
            entries,
        }
    }

    pub fn from_args(args: Args) -> Self {
        Self::new(args.positional, args.keyword)
    }

    fn render_positional(ctx: &RenderContext, value: &Value) -> Result<String> {
        match value {
            Value::List(_) | Value::Map(_) => ctx.expand(value, true),
            Value::Param(_) => ctx.placeholder(value),
            _ => ctx.literal(value),
        }
    }

    fn render_entry(ctx: &RenderContext, key: &str, value: &Value) -> Result<String> {
        match value {
            Value::List(_) | Value::Map(_) => ctx.expand(value, true),
            _ if value.is_builder() => ctx.nested(value),
            _ => Ok(ctx.bind(value, NameHint::Hinted(key))?.placeholder()),
        }
    }

    fn body(&self, ctx: &RenderContext) -> Result<String> {
        let mut body = Vec::with_capacity(self.positional.len() + self.entries.len());
        for value in &self.positional {
            body.push(Self::render_positional(ctx, value)?);
        }
        for (key, value) in &self.entries {
            body.push(format!(
                "{}: {}",
                quote_map_key(key),
                Self::render_entry(ctx, key, value)?
            ));
        }
        Ok(format!("{{{}}}", body.join(", ")))
    }
}

impl Render for Map {
    fn render(&self, ctx: &RenderContext) -> Result<String> {
        self.body(ctx)
    }
}

/// `name {map}`, e.g. `actor {.name, .realName}`.
#[derive(Debug, Clone, Default)]
pub struct MapProjection {
    name: String,
    map: Map,
}

impl MapProjection {
    pub fn new(name: impl Into<String>, map: Map) -> Self {
        Self {
            name: name.into(),
            map,
        }
    }

    /// The first positional argument names the projected variable.
    pub fn from_args(mut args: Args) -> Result<Self> {
        let name = if args.positional.is_empty() {
            Value::Null
        } else {
            args.positional.remove(0)
        };
        Ok(Self::new(
            string_arg(&name, "projection name")?,
            Map::from_args(args),
        ))
    }
}

impl Render for MapProjection {
    fn render(&self, ctx: &RenderContext) -> Result<String> {
        Ok(format!("{} {}", self.name, self.map.body(ctx)?))
    }
}
