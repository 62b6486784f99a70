//! Chain links and their renderers.
//!
//! A link is one rendered fragment of a query. Each kind owns its own text
//! rule and a whitespace policy that the chain's stringification pass uses
//! to glue fragments together:
//!
//! | Kind                          | clears preceding | wants preceding | wants trailing |
//! |-------------------------------|------------------|-----------------|----------------|
//! | statement, raw, function, in  | no               | yes             | yes            |
//! | property, label, list         | yes              | no              | yes            |
//! | comprehension, map            | no               | yes             | yes            |
//! | operator                      | no               | yes             | no             |
//! | node, relationship            | no               | no              | no             |

mod entity;
mod function;
mod operator;
mod statement;
mod structure;

use enum_dispatch::enum_dispatch;

pub use entity::{Direction, Hops, Label, LabelJoin, Node, Relationship};
pub use function::{Bitwise, BitwiseOp, Conditional, ConditionalKind, Func, In};
pub use operator::Operator;
pub use statement::{Property, Raw, Statement};
pub use structure::{List, Map, MapProjection};

use crate::error::{BuilderError, Result};
use crate::params::{self, NameHint, Param, SharedParams};
use crate::quote::quote_map_key;
use crate::registry::{self, Variant};
use crate::value::{Args, Value};

/// Whitespace policy of a link kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Whitespace {
    /// Right-trim the previous fragment before this one
    pub clear_preceding: bool,
    /// Ensure a single space separates this fragment from the previous one
    pub preceding: bool,
    /// Emit a space after this fragment
    pub trailing: bool,
}

impl Whitespace {
    pub const CLAUSE: Self = Self {
        clear_preceding: false,
        preceding: true,
        trailing: true,
    };
    pub const ACCESSOR: Self = Self {
        clear_preceding: true,
        preceding: false,
        trailing: true,
    };
    pub const OPERATOR: Self = Self {
        clear_preceding: false,
        preceding: true,
        trailing: false,
    };
    pub const ENTITY: Self = Self {
        clear_preceding: false,
        preceding: false,
        trailing: false,
    };
}

/// State shared by every link rendered in one pass: the store parameters
/// bind into and nested builders are re-parented into.
#[derive(Debug, Clone)]
pub struct RenderContext {
    store: SharedParams,
}

impl RenderContext {
    pub fn new(store: SharedParams) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SharedParams {
        &self.store
    }

    pub fn bind(&self, value: &Value, hint: NameHint<'_>) -> Result<Param> {
        params::bind_value(&self.store, value, hint)
    }

    /// Render a nested builder in place against this pass's store.
    pub fn nested(&self, value: &Value) -> Result<String> {
        params::render_nested(&self.store, value)
    }

    /// Nested builders render in place; everything else is bound and
    /// replaced by its placeholder.
    pub fn placeholder(&self, value: &Value) -> Result<String> {
        if value.is_builder() {
            return self.nested(value);
        }
        Ok(self.bind(value, NameHint::Auto)?.placeholder())
    }

    /// Render a value as literal query text. Only `Param` values are bound.
    pub fn literal(&self, value: &Value) -> Result<String> {
        Ok(match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format!("{:?}", f),
            Value::Str(s) => s.clone(),
            Value::List(items) => format!("[{}]", self.join(items, |v| self.literal(v))?),
            Value::Map(map) => {
                let entries = map
                    .iter()
                    .map(|(k, v)| Ok(format!("{}: {}", quote_map_key(k), self.literal(v)?)))
                    .collect::<Result<Vec<_>>>()?;
                format!("{{{}}}", entries.join(", "))
            }
            Value::Chain(_) | Value::Partial(_) => self.nested(value)?,
            Value::Param(_) => self.bind(value, NameHint::Auto)?.placeholder(),
        })
    }

    /// Expand lists and maps structurally, keys sorted, leaves bound
    /// individually (or rendered literally when `bind` is false).
    pub fn expand(&self, value: &Value, bind: bool) -> Result<String> {
        match value {
            Value::Map(map) => {
                let entries = map
                    .iter()
                    .map(|(k, v)| Ok(format!("{}: {}", quote_map_key(k), self.expand(v, bind)?)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("{{{}}}", entries.join(", ")))
            }
            Value::List(items) => Ok(format!("[{}]", self.join(items, |v| self.expand(v, bind))?)),
            _ if value.is_builder() => self.nested(value),
            _ if bind => self.placeholder(value),
            _ => self.literal(value),
        }
    }

    /// Render each value with `f` and join with `, `.
    pub fn join<F>(&self, values: &[Value], f: F) -> Result<String>
    where
        F: Fn(&Value) -> Result<String>,
    {
        Ok(values.iter().map(f).collect::<Result<Vec<_>>>()?.join(", "))
    }

    pub fn returns_list(&self, function: &str) -> bool {
        registry::returns_list(function)
    }
}

/// Per-kind rendering contract.
#[enum_dispatch]
pub trait Render {
    /// Text of this link alone, without surrounding whitespace.
    fn render(&self, ctx: &RenderContext) -> Result<String>;

    fn whitespace(&self) -> Whitespace {
        Whitespace::CLAUSE
    }
}

/// Every link kind a chain can hold.
#[enum_dispatch(Render)]
#[derive(Debug, Clone)]
pub enum LinkKind {
    Statement(Statement),
    Raw(Raw),
    Property(Property),
    Label(Label),
    Func(Func),
    In(In),
    Conditional(Conditional),
    Bitwise(Bitwise),
    List(List),
    Map(Map),
    MapProjection(MapProjection),
    Operator(Operator),
    Node(Node),
    Relationship(Relationship),
}

/// Identity of a link within its chain, stable across insertions.
pub type LinkId = u64;

/// A link in a chain: its kind plus the variant it was created from, kept
/// so that a later call can rebuild it with arguments.
#[derive(Debug, Clone)]
pub struct Link {
    pub(crate) id: LinkId,
    pub(crate) variant: Variant,
    pub(crate) kind: LinkKind,
}

impl Link {
    pub fn id(&self) -> LinkId {
        self.id
    }

    pub fn variant(&self) -> &Variant {
        &self.variant
    }

    pub fn kind(&self) -> &LinkKind {
        &self.kind
    }
}

/// Read a string argument. Null reads as the empty string.
pub(crate) fn string_arg(value: &Value, what: &str) -> Result<String> {
    match value {
        Value::Str(s) => Ok(s.clone()),
        Value::Null => Ok(String::new()),
        other => Err(BuilderError::invalid(format!(
            "{} must be a string, got {}",
            what,
            other.type_name()
        ))),
    }
}

/// Take the arguments that may be given either positionally (in `names`
/// order) or by keyword. Surplus positionals and a slot filled both ways
/// are rejected.
pub(crate) fn take_slots(args: &mut Args, names: &[&str], what: &str) -> Result<Vec<Option<Value>>> {
    let positional = std::mem::take(&mut args.positional);
    if positional.len() > names.len() {
        return Err(BuilderError::invalid(format!(
            "{} takes at most {} positional argument(s), got {}",
            what,
            names.len(),
            positional.len()
        )));
    }
    let mut positional = positional.into_iter();
    names
        .iter()
        .map(|name| match (args.take(name), positional.next()) {
            (Some(_), Some(_)) => Err(BuilderError::invalid(format!(
                "{} got '{}' both positionally and by keyword",
                what, name
            ))),
            (keyword, position) => Ok(keyword.or(position)),
        })
        .collect()
}

/// Read one label or a list of labels.
pub(crate) fn labels_arg(value: &Value) -> Result<Vec<String>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Str(s) => Ok(vec![s.clone()]),
        Value::List(items) => items.iter().map(|item| string_arg(item, "label")).collect(),
        other => Err(BuilderError::invalid(format!(
            "labels must be a string or a list of strings, got {}",
            other.type_name()
        ))),
    }
}
