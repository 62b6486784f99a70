//! Node and relationship patterns, plus the label sets they carry.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::{Render, RenderContext, Whitespace, labels_arg, string_arg, take_slots};
use crate::error::{BuilderError, Result};
use crate::params::NameHint;
use crate::quote::{quote_label, quote_property};
use crate::value::{Args, Value};

/// How the labels of a set combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LabelJoin {
    /// Every label applies: `:A:B`
    #[default]
    All,
    /// Any of the labels (relationship types): `:A|B`
    Any,
}

impl LabelJoin {
    pub fn separator(&self) -> &'static str {
        match self {
            LabelJoin::All => ":",
            LabelJoin::Any => "|",
        }
    }
}

impl FromStr for LabelJoin {
    type Err = BuilderError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "+" => Ok(LabelJoin::All),
            "|" => Ok(LabelJoin::Any),
            other => Err(BuilderError::invalid(format!(
                "label operator '{}' is not one of '+', '|'",
                other
            ))),
        }
    }
}

/// An ordered label set. Also usable as a standalone link (`n:Person`).
#[derive(Debug, Clone, Default)]
pub struct Label {
    labels: Vec<String>,
    join: LabelJoin,
}

impl Label {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
            join: LabelJoin::All,
        }
    }

    pub fn with_join(mut self, join: LabelJoin) -> Self {
        self.join = join;
        self
    }

    pub fn push(&mut self, label: impl Into<String>) {
        self.labels.push(label.into());
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels from positional arguments; `operator` selects the join.
    pub fn from_args(mut args: Args) -> Result<Self> {
        let join = match args.take("operator") {
            Some(op) => string_arg(&op, "label operator")?.parse()?,
            None => LabelJoin::All,
        };
        let mut labels = Vec::new();
        for arg in &args.positional {
            labels.extend(labels_arg(arg)?);
        }
        if let Some(named) = args.take("labels") {
            labels.extend(labels_arg(&named)?);
        }
        Ok(Self { labels, join })
    }

    fn text(&self) -> String {
        if self.labels.is_empty() {
            return String::new();
        }
        let quoted: Vec<String> = self.labels.iter().map(|l| quote_label(l)).collect();
        format!(":{}", quoted.join(self.join.separator()))
    }
}

impl Render for Label {
    fn render(&self, _ctx: &RenderContext) -> Result<String> {
        Ok(self.text())
    }

    fn whitespace(&self) -> Whitespace {
        Whitespace::ACCESSOR
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Undirected,
    In,
    Out,
}

impl Direction {
    fn template(&self) -> (&'static str, &'static str) {
        match self {
            Direction::Undirected => ("-", "-"),
            Direction::In => ("<-", "-"),
            Direction::Out => ("-", "->"),
        }
    }
}

impl FromStr for Direction {
    type Err = BuilderError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "-" | "undirected" => Ok(Direction::Undirected),
            "<" | "in" => Ok(Direction::In),
            ">" | "out" => Ok(Direction::Out),
            other => Err(BuilderError::invalid(format!(
                "The direction: {} is not valid",
                other
            ))),
        }
    }
}

/// Variable-length hop specification of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hops {
    Exact(u32),
    Range { min: Option<u32>, max: Option<u32> },
}

impl Hops {
    pub fn exact(n: u32) -> Self {
        Hops::Exact(n)
    }

    /// A bounded or half-open range. Equal bounds collapse to an exact count.
    pub fn range(min: Option<u32>, max: Option<u32>) -> Self {
        match (min, max) {
            (Some(lo), Some(hi)) if lo == hi => Hops::Exact(lo),
            _ => Hops::Range { min, max },
        }
    }

    /// Combine the three ways hops can be given. An exact count together
    /// with either bound is rejected.
    pub fn from_parts(hops: Option<u32>, min: Option<u32>, max: Option<u32>) -> Result<Option<Self>> {
        match (hops, min, max) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(BuilderError::invalid(
                "If 'hops' is specified, do not specify 'min_hops' or 'max_hops'",
            )),
            (Some(n), None, None) => Ok(Some(Hops::Exact(n))),
            (None, None, None) => Ok(None),
            (None, min, max) => Ok(Some(Hops::range(min, max))),
        }
    }
}

impl fmt::Display for Hops {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = |b: &Option<u32>| b.map(|n| n.to_string()).unwrap_or_default();
        match self {
            Hops::Exact(n) => write!(f, "*{}", n),
            Hops::Range { min, max } => write!(f, "*{}..{}", bound(min), bound(max)),
        }
    }
}

fn hop_arg(args: &mut Args, key: &str) -> Result<Option<u32>> {
    match args.take(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Int(n)) => u32::try_from(n)
            .map(Some)
            .map_err(|_| BuilderError::invalid(format!("{} must be non-negative, got {}", key, n))),
        Some(other) => Err(BuilderError::invalid(format!(
            "{} must be an integer, got {}",
            key,
            other.type_name()
        ))),
    }
}

/// Variable, labels and properties shared by nodes and relationships.
#[derive(Debug, Clone, Default)]
struct Pattern {
    variable: String,
    labels: Label,
    properties: BTreeMap<String, Value>,
}

impl Pattern {
    /// `variable` and `labels` come positionally or by keyword; every other
    /// keyword is a property.
    fn from_args(args: &mut Args, join: LabelJoin, what: &str) -> Result<Self> {
        let mut slots = take_slots(args, &["variable", "labels"], what)?.into_iter();
        let variable = slots.next().flatten().unwrap_or_default();
        let labels = slots.next().flatten().unwrap_or_default();
        Ok(Self {
            variable: string_arg(&variable, "variable")?,
            labels: Label::new(labels_arg(&labels)?).with_join(join),
            properties: BTreeMap::new(),
        })
    }

    fn head(&self) -> String {
        format!("{}{}", self.variable, self.labels.text())
    }

    /// ` {`k`: $k_..}` with a leading space, or empty without properties.
    fn properties(&self, ctx: &RenderContext) -> Result<String> {
        if self.properties.is_empty() {
            return Ok(String::new());
        }
        let mut parts = Vec::with_capacity(self.properties.len());
        for (key, value) in &self.properties {
            let param = ctx.bind(value, NameHint::Hinted(key))?;
            parts.push(format!("{}: {}", quote_property(key), param.placeholder()));
        }
        Ok(format!(" {{{}}}", parts.join(", ")))
    }
}

/// `(variable:Label {props})`
#[derive(Debug, Clone, Default)]
pub struct Node {
    pattern: Pattern,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(variable: impl Into<String>) -> Self {
        let mut node = Self::new();
        node.pattern.variable = variable.into();
        node
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.pattern.labels.push(label);
        self
    }

    pub fn labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for label in labels {
            self.pattern.labels.push(label);
        }
        self
    }

    pub fn prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.pattern.properties.insert(key.into(), value.into());
        self
    }

    pub fn from_args(mut args: Args) -> Result<Self> {
        let mut pattern = Pattern::from_args(&mut args, LabelJoin::All, "node")?;
        pattern.properties = args.keyword;
        Ok(Self { pattern })
    }
}

impl Render for Node {
    fn render(&self, ctx: &RenderContext) -> Result<String> {
        Ok(format!(
            "({}{})",
            self.pattern.head(),
            self.pattern.properties(ctx)?
        ))
    }

    fn whitespace(&self) -> Whitespace {
        Whitespace::ENTITY
    }
}

/// `-[variable:TYPE*1..3 {props}]->`
#[derive(Debug, Clone, Default)]
pub struct Relationship {
    pattern: Pattern,
    direction: Direction,
    hops: Option<Hops>,
}

impl Relationship {
    pub fn new() -> Self {
        Self {
            pattern: Pattern {
                labels: Label::default().with_join(LabelJoin::Any),
                ..Pattern::default()
            },
            ..Self::default()
        }
    }

    pub fn named(variable: impl Into<String>) -> Self {
        let mut rel = Self::new();
        rel.pattern.variable = variable.into();
        rel
    }

    /// Add an alternative relationship type.
    pub fn rel_type(mut self, rel_type: impl Into<String>) -> Self {
        self.pattern.labels.push(rel_type);
        self
    }

    pub fn types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for rel_type in types {
            self.pattern.labels.push(rel_type);
        }
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn hops(mut self, hops: Hops) -> Self {
        self.hops = Some(hops);
        self
    }

    pub fn prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.pattern.properties.insert(key.into(), value.into());
        self
    }

    /// Recognised keywords: `variable`, `labels`, `types` (wins over
    /// `labels`), `direction`, `hops`, `min_hops`, `max_hops`. Every other
    /// keyword is a property.
    pub fn from_args(mut args: Args) -> Result<Self> {
        if let Some(types) = args.take("types") {
            if !types.is_null() {
                args.insert("labels", types);
            }
        }
        let direction = match args.take("direction") {
            None | Some(Value::Null) => Direction::Undirected,
            Some(value) => string_arg(&value, "direction")?.parse()?,
        };
        let hops = hop_arg(&mut args, "hops")?;
        let min = hop_arg(&mut args, "min_hops")?;
        let max = hop_arg(&mut args, "max_hops")?;
        let hops = Hops::from_parts(hops, min, max)?;

        let mut pattern = Pattern::from_args(&mut args, LabelJoin::Any, "relationship")?;
        pattern.properties = args.keyword;
        Ok(Self {
            pattern,
            direction,
            hops,
        })
    }
}

impl Render for Relationship {
    fn render(&self, ctx: &RenderContext) -> Result<String> {
        let head = self.pattern.head();
        let hops = self.hops.map(|h| h.to_string()).unwrap_or_default();
        let properties = self.pattern.properties(ctx)?;

        let fill = if head.is_empty() && hops.is_empty() && properties.is_empty() {
            String::new()
        } else {
            format!("[{}{}{}]", head, hops, properties)
        };
        let (left, right) = self.direction.template();
        Ok(format!("{}{}{}", left, fill, right))
    }

    fn whitespace(&self) -> Whitespace {
        Whitespace::ENTITY
    }
}
