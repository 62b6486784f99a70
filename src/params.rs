//! Parameter binding for rendered queries.
//!
//! A `ParamStore` owns the name → value table of one chain (or of several
//! chains sharing it by injection). Values are kept as `serde_json::Value`
//! so that the bound table can be handed to any driver as-is, and so that
//! deduplication compares value *and* type: `1`, `1.0`, `"1"` and `true`
//! are all distinct.
//!
//! Booleans and null are never bound; they render as `true`, `false` and
//! `NULL`. Nested builders bound as values are rendered immediately and
//! their text becomes both the stored value and the placeholder.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde_json::Value as JsonValue;
use tracing::trace;

use crate::error::{BuilderError, Result};
use crate::value::Value;

/// Bound parameters sorted by name.
pub type BoundParams = BTreeMap<String, JsonValue>;

/// A store shared between a chain and every chain nested into it.
pub type SharedParams = Rc<RefCell<ParamStore>>;

/// How the name of a new binding is chosen.
#[derive(Debug, Clone, Copy)]
pub enum NameHint<'a> {
    /// Reuse an equal bound value, else generate `{prefix}_{key}_{seq}`
    Auto,
    /// Reuse an equal bound value, else generate `{hint}_{key}_{seq}`
    Hinted(&'a str),
    /// Bind under exactly this name, replacing any previous value
    Named(&'a str),
}

/// A named parameter.
///
/// Clients construct one to force the name a value is bound under; binding
/// operations return one describing the placeholder that was produced.
#[derive(Debug, Clone)]
pub struct Param {
    name: String,
    value: Value,
    placeholder: Option<String>,
}

impl Param {
    /// Create a named parameter. A leading `$` on the name is dropped.
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        Self {
            name: name.trim_start_matches('$').to_string(),
            value: value.into(),
            placeholder: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Text substituted for this parameter in the rendered query.
    pub fn placeholder(&self) -> String {
        if let Some(placeholder) = &self.placeholder {
            return placeholder.clone();
        }
        match &self.value {
            Value::Null => "NULL".to_string(),
            Value::Bool(true) => "true".to_string(),
            Value::Bool(false) => "false".to_string(),
            _ => format!("${}", self.name),
        }
    }

    fn with_placeholder(mut self, placeholder: String) -> Self {
        self.placeholder = Some(placeholder);
        self
    }
}

/// Name → value table with deduplication and name generation.
#[derive(Debug, Clone)]
pub struct ParamStore {
    prefix: String,
    key: String,
    bound: BoundParams,
    sequence: usize,
}

impl ParamStore {
    /// Create a store. Without a key, a short random one is generated so
    /// that names from distinct stores do not collide when merged.
    pub fn new(prefix: Option<&str>, key: Option<&str>) -> Self {
        let key = match key {
            Some(key) => key.to_string(),
            None => {
                let id = uuid::Uuid::new_v4().simple().to_string();
                id[id.len() - 5..].to_string()
            }
        };
        Self {
            prefix: prefix.unwrap_or_default().to_string(),
            key,
            bound: BoundParams::new(),
            sequence: 0,
        }
    }

    /// Wrap in the shared handle chains hold.
    pub fn shared(self) -> SharedParams {
        Rc::new(RefCell::new(self))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.bound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.bound.get(name)
    }

    /// Snapshot of the bound parameters, sorted by name.
    pub fn bound_params(&self) -> BoundParams {
        self.bound.clone()
    }

    /// Name of an already-bound value equal in type and value, if any.
    pub fn find(&self, value: &JsonValue) -> Option<&str> {
        self.bound
            .iter()
            .find(|(_, bound)| *bound == value)
            .map(|(name, _)| name.as_str())
    }

    /// Generate the next unused name. The counter only moves forward.
    pub fn next_name(&mut self, hint: Option<&str>) -> String {
        let head = hint.unwrap_or(&self.prefix);
        loop {
            let name = if head.is_empty() {
                format!("{}_{}", self.key, self.sequence)
            } else {
                format!("{}_{}_{}", head, self.key, self.sequence)
            };
            self.sequence += 1;
            if !self.bound.contains_key(&name) {
                return name;
            }
        }
    }

    /// Bind a value and return the name it is stored under.
    pub fn bind(&mut self, value: JsonValue, hint: NameHint<'_>) -> String {
        let name = match hint {
            NameHint::Named(name) => name.trim_start_matches('$').to_string(),
            NameHint::Auto | NameHint::Hinted(_) => {
                if let Some(existing) = self.find(&value) {
                    let existing = existing.to_string();
                    trace!(name = %existing, "reused bound parameter");
                    return existing;
                }
                let hint = match hint {
                    NameHint::Hinted(h) => Some(h),
                    _ => None,
                };
                self.next_name(hint)
            }
        };
        trace!(name = %name, "bound parameter");
        self.bound.insert(name.clone(), value);
        name
    }

    /// Take over every binding of `other` under its existing name.
    pub fn absorb(&mut self, other: &ParamStore) {
        for (name, value) in &other.bound {
            self.bound.insert(name.clone(), value.clone());
        }
    }

    /// Drop every binding and restart the name sequence.
    pub fn reset(&mut self) {
        self.bound.clear();
        self.sequence = 0;
    }
}

/// Bind `value` into `store`, producing the `Param` that describes it.
///
/// Nested builders are re-parented into `store` and rendered; `Param`
/// values bind under their own name.
pub fn bind_value(store: &SharedParams, value: &Value, hint: NameHint<'_>) -> Result<Param> {
    match value {
        Value::Param(param) => bind_value(store, &param.value, NameHint::Named(&param.name)),
        Value::Null | Value::Bool(_) => {
            let name = match hint {
                NameHint::Named(name) => name.to_string(),
                NameHint::Hinted(h) => store.borrow_mut().next_name(Some(h)),
                NameHint::Auto => store.borrow_mut().next_name(None),
            };
            Ok(Param::new(name, value.clone()))
        }
        Value::Chain(_) | Value::Partial(_) => {
            let text = render_nested(store, value)?;
            let name = store
                .borrow_mut()
                .bind(JsonValue::String(text.clone()), hint);
            Ok(Param::new(name, value.clone()).with_placeholder(text))
        }
        _ => {
            let json = to_json(store, value)?;
            let name = store.borrow_mut().bind(json, hint);
            Ok(Param::new(name, value.clone()))
        }
    }
}

/// Render a nested `Chain` or `Partial` against `store`.
pub(crate) fn render_nested(store: &SharedParams, value: &Value) -> Result<String> {
    match value {
        Value::Chain(chain) => {
            chain.reparent(store);
            chain.render()
        }
        Value::Partial(partial) => partial.render_within(store),
        _ => Ok(String::new()),
    }
}

/// Convert a value to its JSON parameter form.
///
/// Builders nested inside lists or maps contribute their rendered text.
/// NaN and infinities have no JSON form and are rejected.
pub(crate) fn to_json(store: &SharedParams, value: &Value) -> Result<JsonValue> {
    Ok(match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Int(i) => JsonValue::from(*i),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .ok_or_else(|| BuilderError::invalid(format!("cannot bind non-finite float {}", f)))?,
        Value::Str(s) => JsonValue::String(s.clone()),
        Value::List(items) => JsonValue::Array(
            items
                .iter()
                .map(|item| to_json(store, item))
                .collect::<Result<Vec<_>>>()?,
        ),
        Value::Map(map) => {
            let mut object = serde_json::Map::new();
            for (key, item) in map {
                object.insert(key.clone(), to_json(store, item)?);
            }
            JsonValue::Object(object)
        }
        Value::Chain(_) | Value::Partial(_) => JsonValue::String(render_nested(store, value)?),
        Value::Param(param) => to_json(store, &param.value)?,
    })
}
