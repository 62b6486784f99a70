//! The builder: an ordered chain of links plus the parameter store its
//! placeholders resolve against.
//!
//! # Example
//!
//! ```ignore
//! let chain = Chain::new()
//!     .clause("MATCH")
//!     .node(Node::named("n").label("Person").prop("name", "Alice"))
//!     .clause("RETURN")
//!     .link("n");
//!
//! let query = chain.to_query()?;
//! // MATCH (n:`Person` {`name`: $name_1a2b3_0}) RETURN n
//! ```
//!
//! Building methods consume and return the chain. Rendering takes `&self`
//! and may be repeated; each render walks the links once, binding values
//! into the current store.
//!
//! A chain is not thread-safe. Render and mutate one chain from one place.

use std::cell::RefCell;
use std::rc::Rc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use crate::config;
use crate::error::{BuilderError, Result};
use crate::link::{
    Direction, Func, In, Label, Link, LinkId, LinkKind, List, Map, MapProjection, Node, Operator,
    Property, Raw, Relationship, Render, RenderContext, Statement,
};
use crate::params::{self, BoundParams, NameHint, Param, ParamStore, SharedParams};
use crate::partial::Build;
use crate::registry::{self, Variant};
use crate::value::{Args, Value};

/// Names wrapped in single underscores (`_name_`) are bare property accessors.
static PROPERTY_SENTINEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^_[A-Za-z0-9]+_$").unwrap());

/// Generate the named binary-operator methods.
macro_rules! operator_methods {
    ($($(#[$meta:meta])* $method:ident => $op:literal),* $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $method(self, value: impl Into<Value>) -> Self {
                self.operator($op, value)
            }
        )*
    };
}

#[derive(Debug, Clone)]
pub struct Chain {
    links: Vec<Link>,
    params: RefCell<SharedParams>,
    prefix: String,
    key: String,
    bottom: Option<LinkId>,
    next_id: LinkId,
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

impl Chain {
    /// An empty chain with a private store using the configured prefix.
    pub fn new() -> Self {
        Self::with_prefix(&config::param_prefix())
    }

    pub fn with_prefix(prefix: &str) -> Self {
        Self::with_store(ParamStore::new(Some(prefix), None).shared())
    }

    /// An empty chain binding into an existing, possibly shared, store.
    pub fn with_store(store: SharedParams) -> Self {
        let (prefix, key) = {
            let s = store.borrow();
            (s.prefix().to_string(), s.key().to_string())
        };
        Self {
            links: Vec::new(),
            params: RefCell::new(store),
            prefix,
            key,
            bottom: None,
            next_id: 0,
        }
    }

    /// An empty chain with a fresh private store named like this one's.
    pub(crate) fn detached(&self) -> Self {
        Self::with_store(ParamStore::new(Some(&self.prefix), Some(&self.key)).shared())
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// The store this chain currently binds into.
    pub fn store(&self) -> SharedParams {
        Rc::clone(&self.params.borrow())
    }

    /// Move this chain's bindings into `store` and bind there from now on.
    ///
    /// Called whenever the chain is rendered inside another chain. A no-op
    /// when the chain already uses `store`.
    pub fn reparent(&self, store: &SharedParams) {
        let current = self.store();
        if Rc::ptr_eq(&current, store) {
            return;
        }
        store.borrow_mut().absorb(&current.borrow());
        *self.params.borrow_mut() = Rc::clone(store);
    }

    /// Drop every link and binding. The chain leaves any shared store and
    /// gets a fresh private one with its original prefix and key.
    pub fn reset(&mut self) {
        *self = self.detached();
    }

    fn push(mut self, variant: Variant, kind: LinkKind) -> Self {
        let id = self.next_id;
        self.next_id += 1;
        self.links.push(Link { id, variant, kind });
        self.bottom = Some(id);
        self
    }

    /// Remove a link by identity, returning its position.
    fn remove_link(&mut self, id: LinkId) -> Option<(usize, Link)> {
        let position = self.links.iter().position(|link| link.id == id)?;
        Some((position, self.links.remove(position)))
    }

    /// Append whatever `name` resolves to: a `_property_` accessor, a
    /// registered clause/function/variant, or else a literal clause.
    pub fn clause(self, name: &str) -> Self {
        if PROPERTY_SENTINEL.is_match(name) {
            trace!(name, "resolved as property");
            let property = name.trim_matches('_');
            return self.push(Variant::Property, Property::new(property).into());
        }
        match registry::resolve(name) {
            Some(variant) => {
                trace!(name, ?variant, "resolved from registry");
                let kind = variant.empty();
                self.push(variant, kind)
            }
            None => {
                trace!(name, "resolved as literal statement");
                self.link(name)
            }
        }
    }

    /// Rebuild the most recently appended link with arguments, keeping its
    /// position in the chain.
    pub fn call(mut self, args: impl Into<Args>) -> Result<Self> {
        let id = self
            .bottom
            .ok_or_else(|| BuilderError::invalid("call() needs a preceding link"))?;
        let (position, link) = self
            .remove_link(id)
            .ok_or_else(|| BuilderError::invalid("call() target is no longer in the chain"))?;
        let kind = match link.variant.instantiate(args.into()) {
            Ok(kind) => kind,
            Err(e) => {
                self.links.insert(position, link);
                return Err(e);
            }
        };
        self.links.insert(
            position,
            Link {
                id,
                variant: link.variant,
                kind,
            },
        );
        Ok(self)
    }

    /// Shorthand for `clause(name).call(args)`.
    pub fn invoke(self, name: &str, args: impl Into<Args>) -> Result<Self> {
        self.clause(name).call(args)
    }

    /// A literal clause, bypassing the registry.
    pub fn link(self, name: &str) -> Self {
        self.push(Variant::statement(name), Statement::new(name, Vec::new()).into())
    }

    /// A literal clause with literal arguments: `NAME a, b`.
    pub fn statement(self, name: &str, args: impl Into<Args>) -> Self {
        let args = args.into();
        self.push(
            Variant::statement(name),
            Statement::new(name, args.positional).into(),
        )
    }

    pub fn property(self, name: &str) -> Self {
        self.push(Variant::Property, Property::new(name).into())
    }

    pub fn label<I, S>(self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Variant::Label, Label::new(labels).into())
    }

    /// Arguments emitted verbatim, space separated.
    pub fn raw(self, args: impl Into<Args>) -> Self {
        self.push(Variant::Raw, Raw::new(args.into().positional).into())
    }

    /// `name(args)` with every argument bound.
    pub fn func(self, name: &str, args: impl Into<Args>) -> Self {
        self.push(
            Variant::function(name, false),
            Func::new(name, args.into().positional).into(),
        )
    }

    /// `name(args)` with literal arguments.
    pub fn func_raw(self, name: &str, args: impl Into<Args>) -> Self {
        self.push(
            Variant::function(name, true),
            Func::raw(name, args.into().positional).into(),
        )
    }

    pub fn in_(self, args: impl Into<Args>) -> Self {
        self.push(Variant::In, In::new(args.into().positional).into())
    }

    /// `[a, b]` attached to the preceding fragment, as in `n.list[0]`.
    pub fn list(self, args: impl Into<Args>) -> Self {
        self.push(Variant::List, List::new(args.into().positional).into())
    }

    pub fn map(self, args: impl Into<Args>) -> Self {
        self.push(Variant::Map, Map::from_args(args.into()).into())
    }

    pub fn map_projection(self, name: &str, args: impl Into<Args>) -> Self {
        let map = Map::from_args(args.into());
        self.push(Variant::MapProjection, MapProjection::new(name, map).into())
    }

    pub fn node(self, node: Node) -> Self {
        self.push(Variant::Node, node.into())
    }

    pub fn relationship(self, relationship: Relationship) -> Self {
        self.push(Variant::Relationship, relationship.into())
    }

    pub fn rel_out(self, relationship: Relationship) -> Self {
        self.relationship(relationship.direction(Direction::Out))
    }

    pub fn rel_in(self, relationship: Relationship) -> Self {
        self.relationship(relationship.direction(Direction::In))
    }

    /// Append `op value`, binding the value.
    pub fn operator(self, operator: &str, value: impl Into<Value>) -> Self {
        self.push(
            Variant::operator(operator, true),
            Operator::new(operator, value).into(),
        )
    }

    /// Append `op value` with the value emitted verbatim.
    pub fn operator_raw(self, operator: &str, value: impl Into<Value>) -> Self {
        self.push(
            Variant::operator(operator, false),
            Operator::raw(operator, value).into(),
        )
    }

    /// Insert `value op` in front of the whole chain, for expressions whose
    /// left-hand side is a plain value: `prepend_operator("-", x)` on `two`
    /// renders `$x - two`.
    pub fn prepend_operator(mut self, operator: &str, value: impl Into<Value>) -> Self {
        let id = self.next_id;
        self.next_id += 1;
        self.links.insert(
            0,
            Link {
                id,
                variant: Variant::operator(operator, true),
                kind: Operator::new(operator, value).inverted().into(),
            },
        );
        self
    }

    operator_methods! {
        plus => "+",
        plus_assign => "+=",
        minus => "-",
        minus_assign => "-=",
        times => "*",
        times_assign => "*=",
        divide => "/",
        divide_assign => "/=",
        modulo => "%",
        modulo_assign => "%=",
        bit_and => "&",
        bit_or => "|",
        bit_xor => "^",
        xor_assign => "^=",
        gt => ">",
        gte => ">=",
        lt => "<",
        lte => "<=",
        /// `<>`
        ne => "<>",
        eq => "=",
        and => "AND",
        or => "OR",
        assign => "=",
        /// Regular-expression match, `=~`
        rexp => "=~",
    }

    /// `AS name`, never bound.
    pub fn alias(self, name: &str) -> Self {
        self.operator_raw("AS", name)
    }

    /// Copy `other`'s links onto the end of this chain and take over its
    /// bindings.
    pub fn append(mut self, other: &Chain) -> Self {
        let store = self.store();
        let theirs = other.store();
        if !Rc::ptr_eq(&store, &theirs) {
            store.borrow_mut().absorb(&theirs.borrow());
        }
        for link in &other.links {
            let id = self.next_id;
            self.next_id += 1;
            self.links.push(Link {
                id,
                variant: link.variant.clone(),
                kind: link.kind.clone(),
            });
            self.bottom = Some(id);
        }
        self
    }

    /// Run a partial's build step directly against this chain.
    pub fn apply_partial(self, partial: &dyn Build) -> Result<Self> {
        partial.build(self)
    }

    /// Bind a value now, under `name` if given, and return its parameter.
    pub fn bind_param(&self, value: impl Into<Value>, name: Option<&str>) -> Result<Param> {
        let hint = match name {
            Some(name) => NameHint::Named(name),
            None => NameHint::Auto,
        };
        params::bind_value(&self.store(), &value.into(), hint)
    }

    /// Bind a map (each entry under its key) or a list (each item under a
    /// generated name). Returns the full bound table.
    pub fn bind_params(&self, values: impl Into<Value>) -> Result<BoundParams> {
        match values.into() {
            Value::Map(map) => {
                for (name, value) in map {
                    self.bind_param(value, Some(&name))?;
                }
            }
            Value::List(items) => {
                for value in items {
                    self.bind_param(value, None)?;
                }
            }
            Value::Null => {}
            other => {
                self.bind_param(other, None)?;
            }
        }
        Ok(self.bound_params())
    }

    /// Bound parameters sorted by name.
    pub fn bound_params(&self) -> BoundParams {
        self.store().borrow().bound_params()
    }

    /// Render the chain to query text, binding parameters as it goes.
    pub fn render(&self) -> Result<String> {
        let ctx = RenderContext::new(self.store());
        let mut fragments: Vec<String> = Vec::with_capacity(self.links.len());

        for link in &self.links {
            let whitespace = link.kind.whitespace();

            if whitespace.clear_preceding {
                if let Some(previous) = fragments.last_mut() {
                    previous.truncate(previous.trim_end().len());
                }
            }

            let mut fragment = String::new();
            if whitespace.preceding && !fragments.last().is_some_and(|p| p.ends_with(' ')) {
                fragment.push(' ');
            }
            fragment.push_str(&link.kind.render(&ctx)?);
            if whitespace.trailing {
                fragment.push(' ');
            }
            fragments.push(fragment);
        }

        let rendered = fragments.concat().trim().to_string();
        debug!(
            links = self.links.len(),
            params = ctx.store().borrow().len(),
            "rendered chain"
        );
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::link::Hops;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn chain() -> Chain {
        Chain::with_store(ParamStore::new(Some("NEO"), Some("abcde")).shared())
    }

    #[rstest]
    fn test_empty_chain(chain: Chain) {
        assert_eq!(chain.render().unwrap(), "");
        assert!(chain.bound_params().is_empty());
    }

    #[rstest]
    fn test_registered_clauses(chain: Chain) {
        let chain = chain.clause("match").clause("optionalMatch").clause("orderBy");
        assert_eq!(chain.render().unwrap(), "MATCH OPTIONAL MATCH ORDER BY");
    }

    #[rstest]
    fn test_unknown_name_is_literal_statement(chain: Chain) {
        let chain = chain.clause("SomeCustomThing");
        assert_eq!(chain.render().unwrap(), "SomeCustomThing");
    }

    #[rstest]
    fn test_property_sentinel(chain: Chain) {
        let chain = chain.clause("n").clause("_name_");
        assert_eq!(chain.render().unwrap(), "n.`name`");
    }

    #[rstest]
    fn test_call_replaces_in_place(chain: Chain) {
        let chain = chain
            .clause("MATCH")
            .clause("node")
            .call(args!["n"; labels = "Test"])
            .unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.render().unwrap(), "MATCH (n:`Test`)");
    }

    #[rstest]
    fn test_call_without_link_fails(chain: Chain) {
        assert!(matches!(
            chain.call(args![1]),
            Err(BuilderError::InvalidArgument { .. })
        ));
    }

    #[rstest]
    fn test_statement_call_keeps_name(chain: Chain) {
        let chain = chain.invoke("return", args!["n", "m"]).unwrap();
        assert_eq!(chain.render().unwrap(), "RETURN n, m");
    }

    #[rstest]
    fn test_function_call_binds(chain: Chain) {
        let chain = chain.invoke("size", args!["xyz"]).unwrap();
        assert_eq!(chain.render().unwrap(), "size($NEO_abcde_0)");
    }

    #[rstest]
    fn test_match_path_pattern(chain: Chain) {
        let chain = chain
            .clause("MATCH")
            .link("p")
            .eq(Chain::new()
                .node(Node::named("n"))
                .rel_out(Relationship::new())
                .node(Node::named("m")));
        assert_eq!(chain.render().unwrap(), "MATCH p = (n)-->(m)");
    }

    #[rstest]
    fn test_same_value_bound_once(chain: Chain) {
        let a = chain.bind_param("x", None).unwrap();
        let b = chain.bind_param("x", None).unwrap();
        assert_eq!(a.name(), b.name());
        assert_eq!(chain.bound_params().len(), 1);
    }

    #[rstest]
    fn test_true_and_one_do_not_collide(chain: Chain) {
        let chain = chain.func("f", args![true, 1, false, 0]);
        assert_eq!(
            chain.render().unwrap(),
            "f(true, $NEO_abcde_1, false, $NEO_abcde_3)"
        );
        let params = chain.bound_params();
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("NEO_abcde_1"), Some(&json!(1)));
        assert_eq!(params.get("NEO_abcde_3"), Some(&json!(0)));
    }

    #[rstest]
    fn test_none_renders_null(chain: Chain) {
        let chain = chain.link("n").property("x").eq(None::<i64>);
        assert_eq!(chain.render().unwrap(), "n.`x` = NULL");
        assert!(chain.bound_params().is_empty());
    }

    #[rstest]
    fn test_node_round_trip(chain: Chain) {
        let chain = chain.node(Node::named("n").label("Test").prop("age", 99));
        assert_eq!(chain.render().unwrap(), "(n:`Test` {`age`: $age_abcde_0})");
        assert_eq!(chain.bound_params().get("age_abcde_0"), Some(&json!(99)));
    }

    #[rstest]
    #[case(Hops::range(Some(1), Some(3)), "-[*1..3]-")]
    #[case(Hops::exact(3), "-[*3]-")]
    #[case(Hops::range(None, Some(2)), "-[*..2]-")]
    fn test_relationship_hops(chain: Chain, #[case] hops: Hops, #[case] expected: &str) {
        let chain = chain.relationship(Relationship::new().hops(hops));
        assert_eq!(chain.render().unwrap(), expected);
    }

    #[rstest]
    fn test_in_with_list_function(chain: Chain) {
        let chain = chain
            .link("x")
            .in_(args![Chain::new().func("split", args!["a b", " "])]);
        assert_eq!(chain.render().unwrap(), "x IN split($NEO_abcde_0, $NEO_abcde_1)");
    }

    #[rstest]
    fn test_in_with_scalars(chain: Chain) {
        let chain = chain.link("x").in_(args![1, 2]);
        assert_eq!(chain.render().unwrap(), "x IN [$NEO_abcde_0, $NEO_abcde_1]");
    }

    #[rstest]
    fn test_property_clears_whitespace(chain: Chain) {
        let chain = chain.clause("RETURN").link("n").property("name").alias("name");
        assert_eq!(chain.render().unwrap(), "RETURN n.`name` AS name");
    }

    #[rstest]
    fn test_label_attaches_to_variable(chain: Chain) {
        let chain = chain.link("n").label(["Person", "Admin"]);
        assert_eq!(chain.render().unwrap(), "n:`Person`:`Admin`");
    }

    #[rstest]
    fn test_list_index(chain: Chain) {
        let chain = chain.link("n").property("items").list(args![0]);
        assert_eq!(chain.render().unwrap(), "n.`items`[$NEO_abcde_0]");
    }

    #[rstest]
    fn test_prepend_operator(chain: Chain) {
        let chain = chain.link("two").prepend_operator("-", "x");
        assert_eq!(chain.render().unwrap(), "$NEO_abcde_0 - two");
    }

    #[rstest]
    fn test_set_with_map_operator(chain: Chain) {
        let value = json!({"name": "n", "loc": {"city": "c", "latlng": ["a", "b"]}});
        let chain = chain.clause("SET").link("user").plus_assign(value);
        assert_eq!(
            chain.render().unwrap(),
            "SET user += {`loc`: {`city`: $NEO_abcde_0, `latlng`: [$NEO_abcde_1, $NEO_abcde_2]}, `name`: $NEO_abcde_3}"
        );
    }

    #[rstest]
    fn test_conditionals_compose(chain: Chain) {
        let inner = Chain::new().invoke("cand", args!["b", "c"]).unwrap();
        let chain = chain.invoke("cor", args!["a", inner]).unwrap();
        assert_eq!(
            chain.render().unwrap(),
            "($NEO_abcde_0 OR ($NEO_abcde_1 AND $NEO_abcde_2))"
        );
    }

    #[rstest]
    fn test_raw_and_id(chain: Chain) {
        let chain = chain
            .raw(args!["this", "will be", "s test"])
            .invoke("id", args!["i"])
            .unwrap();
        assert_eq!(chain.render().unwrap(), "this will be s test id(i)");
    }

    #[rstest]
    fn test_nested_chain_bindings_move_to_parent(chain: Chain) {
        let inner = Chain::new().link("n").property("age").gt(30);
        inner.bind_param("kept", Some("early")).unwrap();
        let chain = chain.clause("WHERE").raw(args![inner]);

        assert_eq!(chain.render().unwrap(), "WHERE n.`age` > $NEO_abcde_0");
        let params = chain.bound_params();
        assert_eq!(params.get("NEO_abcde_0"), Some(&json!(30)));
        assert_eq!(params.get("early"), Some(&json!("kept")));
    }

    #[rstest]
    fn test_nested_chains_dedup_across_stores(chain: Chain) {
        let left = Chain::new().link("a").eq("same");
        let right = Chain::new().link("b").eq("same");
        let chain = chain.raw(args![left]).and(right);
        let rendered = chain.render().unwrap();
        assert_eq!(chain.bound_params().len(), 1);
        let name = chain.bound_params().keys().next().cloned().unwrap();
        assert_eq!(rendered, format!("a = ${0} AND b = ${0}", name));
    }

    #[rstest]
    fn test_clone_diverges_with_shared_params(chain: Chain) {
        let base = chain.clause("MATCH").node(Node::named("n").prop("name", "x"));
        base.render().unwrap();
        let clone = base.clone();
        assert_eq!(base.bound_params(), clone.bound_params());

        let base = base.clause("RETURN").link("n");
        let clone = clone.clause("DELETE").link("n");
        let (a, b) = (base.render().unwrap(), clone.render().unwrap());
        assert_ne!(a, b);
        assert!(a.ends_with("RETURN n"));
        assert!(b.ends_with("DELETE n"));
    }

    #[rstest]
    fn test_append_copies_links_and_params(chain: Chain) {
        let other = Chain::new().clause("RETURN").link("n");
        other.bind_param(5, Some("five")).unwrap();
        let chain = chain.clause("MATCH").node(Node::named("n")).append(&other);
        assert_eq!(chain.render().unwrap(), "MATCH (n) RETURN n");
        assert_eq!(chain.bound_params().get("five"), Some(&json!(5)));
    }

    #[rstest]
    fn test_reset_clears_links_and_params(chain: Chain) {
        let mut chain = chain.func("f", args![1]);
        chain.render().unwrap();
        chain.reset();
        assert!(chain.is_empty());
        assert_eq!(chain.render().unwrap(), "");
        assert!(chain.bound_params().is_empty());
    }

    #[rstest]
    fn test_reset_leaves_shared_store(chain: Chain) {
        let shared = chain.store();
        let mut other = Chain::with_store(Rc::clone(&shared));
        other.bind_param(1, None).unwrap();
        other.reset();
        other.bind_param(2, None).unwrap();
        assert_eq!(shared.borrow().len(), 1);
    }

    #[rstest]
    fn test_bind_params_map_and_list(chain: Chain) {
        let params = chain.bind_params(json!({"a": 1, "b": "two"})).unwrap();
        assert_eq!(params.get("a"), Some(&json!(1)));
        let params = chain.bind_params(vec![3, 4]).unwrap();
        assert_eq!(params.len(), 4);
    }

    #[rstest]
    fn test_map_projection_chain(chain: Chain) {
        let movies = Chain::new().func(
            "collect",
            args![Chain::new().map_projection("movie", args![".title", ".year"])],
        );
        let chain = chain
            .clause("RETURN")
            .map_projection("actor", args![".name", ".realName"; movies = movies]);
        assert_eq!(
            chain.render().unwrap(),
            "RETURN actor {.name, .realName, `movies`: collect(movie {.title, .year})}"
        );
    }

    #[rstest]
    fn test_render_is_repeatable(chain: Chain) {
        let chain = chain.clause("MATCH").node(Node::named("n").prop("name", "x"));
        let first = chain.render().unwrap();
        let second = chain.render().unwrap();
        assert_eq!(first, second);
        assert_eq!(chain.bound_params().len(), 1);
    }

    #[rstest]
    fn test_bitwise_call_with_one_operand_fails(chain: Chain) {
        assert!(matches!(
            chain.invoke("band", args![1]),
            Err(BuilderError::InvalidArgument { .. })
        ));
    }

    #[rstest]
    fn test_node_call_with_surplus_arguments_fails(chain: Chain) {
        let result = chain
            .clause("MATCH")
            .invoke("node", args!["n", "Person", "junk", 42]);
        assert!(matches!(result, Err(BuilderError::InvalidArgument { .. })));
    }

    #[rstest]
    fn test_render_error_propagates(chain: Chain) {
        let chain = chain.clause("band");
        assert!(matches!(
            chain.render(),
            Err(BuilderError::InvalidArgument { .. })
        ));
    }
}
