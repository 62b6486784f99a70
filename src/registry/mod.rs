//! Name → link variant resolution.
//!
//! The registry maps lower-cased clause, function and alias names to the
//! [`Variant`] that builds their link. It is populated from the built-in
//! variants and the [`catalog`] on first use; clients may add their own
//! names at run time through [`create_statement`], [`create_function`] or
//! [`register`]. A name may only ever be bound to one variant.

pub mod catalog;

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use once_cell::sync::Lazy;
use tracing::debug;

use crate::error::{BuilderError, Result};
use crate::link::{
    Bitwise, BitwiseOp, Conditional, ConditionalKind, Func, In, Label, LinkKind, List, Map,
    MapProjection, Node, Operator, Property, Raw, Relationship, Statement,
};
use crate::value::{Args, Value};

/// A link factory: what a registered name builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Variant {
    /// A clause rendered under `name`
    Statement { name: String },
    /// A function rendered under `name`; raw functions do not bind
    Func { name: String, raw: bool },
    Raw,
    Property,
    Label,
    In,
    Conditional(ConditionalKind),
    Bitwise(BitwiseOp),
    List,
    Comprehension,
    Map,
    MapProjection,
    /// A binary operator; `bind: false` emits its operand verbatim
    Operator { operator: String, bind: bool },
    Node,
    Relationship,
}

impl Variant {
    pub fn statement(name: impl Into<String>) -> Self {
        Variant::Statement { name: name.into() }
    }

    pub fn function(name: impl Into<String>, raw: bool) -> Self {
        Variant::Func {
            name: name.into(),
            raw,
        }
    }

    pub fn operator(operator: impl Into<String>, bind: bool) -> Self {
        Variant::Operator {
            operator: operator.into(),
            bind,
        }
    }

    /// The link this variant produces when referenced without arguments.
    pub fn empty(&self) -> LinkKind {
        match self {
            Variant::Statement { name } => Statement::new(name.clone(), Vec::new()).into(),
            Variant::Func { name, raw: false } => Func::new(name.clone(), Vec::new()).into(),
            Variant::Func { name, raw: true } => Func::raw(name.clone(), Vec::new()).into(),
            Variant::Raw => Raw::default().into(),
            Variant::Property => Property::default().into(),
            Variant::Label => Label::default().into(),
            Variant::In => In::default().into(),
            Variant::Conditional(kind) => Conditional::new(*kind, Vec::new()).into(),
            Variant::Bitwise(op) => Bitwise::new(*op, Vec::new()).into(),
            Variant::List => List::default().into(),
            Variant::Comprehension => List::comprehension(Vec::new()).into(),
            Variant::Map => Map::default().into(),
            Variant::MapProjection => MapProjection::default().into(),
            Variant::Operator { operator, bind: true } => {
                Operator::new(operator.clone(), Value::Null).into()
            }
            Variant::Operator { operator, bind: false } => {
                Operator::raw(operator.clone(), Value::Null).into()
            }
            Variant::Node => Node::new().into(),
            Variant::Relationship => Relationship::new().into(),
        }
    }

    /// Build this variant's link from call arguments.
    pub fn instantiate(&self, args: Args) -> Result<LinkKind> {
        Ok(match self {
            Variant::Statement { name } => Statement::new(name.clone(), args.positional).into(),
            Variant::Func { name, raw: false } => Func::new(name.clone(), args.positional).into(),
            Variant::Func { name, raw: true } => Func::raw(name.clone(), args.positional).into(),
            Variant::Raw => Raw::new(args.positional).into(),
            Variant::Property => Property::from_args(args)?.into(),
            Variant::Label => Label::from_args(args)?.into(),
            Variant::In => In::new(args.positional).into(),
            Variant::Conditional(kind) => Conditional::new(*kind, args.positional).into(),
            Variant::Bitwise(op) => Bitwise::from_args(*op, args)?.into(),
            Variant::List => List::new(args.positional).into(),
            Variant::Comprehension => List::comprehension(args.positional).into(),
            Variant::Map => Map::from_args(args).into(),
            Variant::MapProjection => MapProjection::from_args(args)?.into(),
            Variant::Operator { operator, bind } => Operator::from_args(operator, *bind, args)?.into(),
            Variant::Node => Node::from_args(args)?.into(),
            Variant::Relationship => Relationship::from_args(args)?.into(),
        })
    }
}

#[derive(Debug, Clone)]
struct Entry {
    owner: String,
    variant: Variant,
}

/// Case-insensitive name → variant table.
#[derive(Debug, Clone, Default)]
pub struct LinkRegistry {
    entries: HashMap<String, Entry>,
    list_functions: HashSet<String>,
}

impl LinkRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in variants and the full catalog.
    pub fn with_builtins() -> Result<Self> {
        let mut registry = Self::new();
        for (name, aliases, variant) in builtin_variants() {
            registry.register(name, aliases, variant)?;
        }
        for entry in catalog::STATEMENTS {
            let rendered = entry
                .rendered
                .map(str::to_string)
                .unwrap_or_else(|| entry.name.to_uppercase());
            registry.register(entry.name, &[], Variant::statement(rendered))?;
        }
        for entry in catalog::FUNCTIONS {
            let rendered = entry.rendered.unwrap_or(entry.name);
            registry.register(entry.name, &[], Variant::function(rendered, entry.raw))?;
        }
        for name in catalog::FUNCTIONS_RETURNING_LIST {
            registry.mark_returns_list(name);
        }
        Ok(registry)
    }

    /// Bind `name` and every alias to `variant`.
    ///
    /// Re-registering a name to the same variant is a no-op. Binding a name
    /// already held by a different variant fails and leaves the registry
    /// unchanged.
    pub fn register(&mut self, name: &str, aliases: &[&str], variant: Variant) -> Result<()> {
        let keys: Vec<String> = std::iter::once(name)
            .chain(aliases.iter().copied())
            .map(str::to_lowercase)
            .collect();

        for key in &keys {
            if let Some(existing) = self.entries.get(key) {
                if existing.variant != variant {
                    return Err(BuilderError::AliasConflict {
                        alias: key.clone(),
                        existing: existing.owner.clone(),
                        requested: name.to_string(),
                    });
                }
            }
        }

        debug!(name, aliases = aliases.len(), "registering link variant");
        for key in keys {
            self.entries.entry(key).or_insert_with(|| Entry {
                owner: name.to_string(),
                variant: variant.clone(),
            });
        }
        Ok(())
    }

    /// Look a name up, ignoring case.
    pub fn resolve(&self, name: &str) -> Option<Variant> {
        self.entries
            .get(&name.to_lowercase())
            .map(|entry| entry.variant.clone())
    }

    pub fn mark_returns_list(&mut self, function: &str) {
        self.list_functions.insert(function.to_lowercase());
    }

    /// True when `function` is known to return a list.
    pub fn returns_list(&self, function: &str) -> bool {
        self.list_functions.contains(&function.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

type Builtin = (&'static str, &'static [&'static str], Variant);

fn builtin(name: &'static str, aliases: &'static [&'static str], variant: Variant) -> Builtin {
    (name, aliases, variant)
}

fn builtin_variants() -> Vec<Builtin> {
    vec![
        builtin("Property", &["prop"], Variant::Property),
        builtin("Label", &[], Variant::Label),
        builtin("IN", &[], Variant::In),
        builtin("ID", &[], Variant::function("id", true)),
        builtin("Conditional", &[], Variant::Conditional(ConditionalKind::Comma)),
        builtin("ConditionalAND", &["CAND", "COND_AND"], Variant::Conditional(ConditionalKind::And)),
        builtin("ConditionalOR", &["COR", "COND_OR"], Variant::Conditional(ConditionalKind::Or)),
        builtin("BitwiseAnd", &["BAND"], Variant::Bitwise(BitwiseOp::And)),
        builtin("BitwiseOr", &["BOR"], Variant::Bitwise(BitwiseOp::Or)),
        builtin("BitwiseXOr", &["BXOR"], Variant::Bitwise(BitwiseOp::Xor)),
        builtin("BitwiseNot", &["BNOT"], Variant::Bitwise(BitwiseOp::Not)),
        builtin("BitwiseLeftShift", &["BLSHIFT"], Variant::Bitwise(BitwiseOp::LeftShift)),
        builtin("BitwiseRightShift", &["BRSHIFT"], Variant::Bitwise(BitwiseOp::RightShift)),
        builtin(
            "BitwiseUnsignedRightShift",
            &["BURSHIFT"],
            Variant::Bitwise(BitwiseOp::UnsignedRightShift),
        ),
        builtin("List", &[], Variant::List),
        builtin("Comprehension", &["comp"], Variant::Comprehension),
        builtin("Map", &[], Variant::Map),
        builtin("MapProjection", &["map_projection", "projection"], Variant::MapProjection),
        builtin("AND", &[], Variant::operator("AND", true)),
        builtin("Assign", &[], Variant::operator("=", true)),
        builtin("Alias", &["AS"], Variant::operator("AS", false)),
        builtin("Rexp", &["re"], Variant::operator("=~", true)),
        builtin("Node", &["n_"], Variant::Node),
        builtin("Relationship", &["rel", "r_"], Variant::Relationship),
    ]
}

static REGISTRY: Lazy<RwLock<LinkRegistry>> = Lazy::new(|| {
    // The built-in table is static; a collision in it cannot be recovered from.
    match LinkRegistry::with_builtins() {
        Ok(registry) => RwLock::new(registry),
        Err(e) => panic!("built-in link catalog is inconsistent: {}", e),
    }
});

/// Resolve a name against the process-wide registry.
pub fn resolve(name: &str) -> Option<Variant> {
    REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .resolve(name)
}

/// Register a variant in the process-wide registry.
pub fn register(name: &str, aliases: &[&str], variant: Variant) -> Result<()> {
    REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register(name, aliases, variant)
}

pub fn returns_list(function: &str) -> bool {
    REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .returns_list(function)
}

/// Optional settings for [`create_statement`] and [`create_function`].
#[derive(Debug, Clone, Default)]
pub struct VariantOverrides {
    /// Text emitted instead of the default rendering of the name
    pub rendered_name: Option<String>,
    pub aliases: Vec<String>,
    /// Mark a function as list-returning for `IN`
    pub returns_list: bool,
}

impl VariantOverrides {
    pub fn rendered(name: impl Into<String>) -> Self {
        Self {
            rendered_name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn returning_list(mut self) -> Self {
        self.returns_list = true;
        self
    }
}

/// Register a custom clause. Without a rendered name it renders upper-cased.
pub fn create_statement(name: &str, overrides: VariantOverrides) -> Result<()> {
    let rendered = overrides
        .rendered_name
        .clone()
        .unwrap_or_else(|| name.to_uppercase());
    let aliases: Vec<&str> = overrides.aliases.iter().map(String::as_str).collect();
    register(name, &aliases, Variant::statement(rendered))
}

/// Register a custom function. Without a rendered name it renders as given.
pub fn create_function(name: &str, overrides: VariantOverrides, raw: bool) -> Result<()> {
    let rendered = overrides
        .rendered_name
        .clone()
        .unwrap_or_else(|| name.to_string());
    let aliases: Vec<&str> = overrides.aliases.iter().map(String::as_str).collect();

    let mut registry = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    registry.register(name, &aliases, Variant::function(rendered.clone(), raw))?;
    if overrides.returns_list {
        registry.mark_returns_list(&rendered);
    }
    Ok(())
}
