//! End-to-end query building through the public API.
//!
//! Every chain here binds into a store with a fixed key so that generated
//! parameter names are predictable.

use cypher_chain::{
    Args, BuilderError, Case, Chain, CompiledQuery, Direction, Hops, Node, Param, ParamStore,
    Partial, QueryBuilder, Relationship, Result, VariantOverrides, args, create_function,
    create_statement,
};
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn chain() -> Chain {
    Chain::with_store(ParamStore::new(Some("NEO"), Some("k1k1k")).shared())
}

// ============================================================================
// Clauses and patterns
// ============================================================================

#[rstest]
fn test_match_where_return(chain: Chain) {
    let query = chain
        .clause("MATCH")
        .node(Node::named("n").label("Person"))
        .rel_out(Relationship::named("r").rel_type("KNOWS"))
        .node(Node::named("m"))
        .clause("WHERE")
        .link("n")
        .property("age")
        .gte(18)
        .clause("RETURN")
        .link("m")
        .to_query()
        .unwrap();

    assert_eq!(
        query.script,
        "MATCH (n:`Person`)-[r:`KNOWS`]->(m) WHERE n.`age` >= $NEO_k1k1k_0 RETURN m"
    );
    assert_eq!(query.params.get("NEO_k1k1k_0"), Some(&json!(18)));
}

#[rstest]
fn test_dynamic_relationship_call(chain: Chain) {
    let rendered = chain
        .invoke(
            "rel",
            args!["test"; types = vec!["one", "two", "three"], min_hops = 1, max_hops = 3, since = 2001],
        )
        .unwrap()
        .render()
        .unwrap();

    assert_eq!(
        rendered,
        "-[test:`one`|`two`|`three`*1..3 {`since`: $since_k1k1k_0}]-"
    );
}

#[rstest]
fn test_dynamic_relationship_hop_conflict(chain: Chain) {
    let result = chain.invoke("relationship", args![; hops = 3, min_hops = 1]);
    assert!(matches!(result, Err(BuilderError::InvalidArgument { .. })));
}

#[rstest]
fn test_dynamic_relationship_bad_direction(chain: Chain) {
    let result = chain.invoke("rel", args![; direction = "sideways"]);
    assert!(matches!(result, Err(BuilderError::InvalidArgument { .. })));
}

#[rstest]
fn test_typed_relationship_directions(chain: Chain) {
    let rendered = chain
        .node(Node::named("a"))
        .rel_in(Relationship::new().hops(Hops::range(Some(2), None)))
        .node(Node::named("b"))
        .relationship(Relationship::new().direction(Direction::Undirected))
        .node(Node::named("c"))
        .render()
        .unwrap();

    assert_eq!(rendered, "(a)<-[*2..]-(b)--(c)");
}

#[rstest]
fn test_merge_on_create_set(chain: Chain) {
    let query = chain
        .clause("MERGE")
        .node(Node::named("u").label("User").prop("email", "a@b.c"))
        .clause("OnCreateSet")
        .link("u")
        .property("created")
        .eq(Chain::new().invoke("timestamp", Args::new()).unwrap())
        .to_query()
        .unwrap();

    assert_eq!(
        query.script,
        "MERGE (u:`User` {`email`: $email_k1k1k_0}) ON CREATE SET u.`created` = timestamp()"
    );
    assert_eq!(query.param_count(), 1);
}

#[rstest]
fn test_unwind_collect_in(chain: Chain) {
    let rendered = chain
        .clause("MATCH")
        .node(Node::named("n"))
        .clause("WHERE")
        .link("n")
        .property("id")
        .in_(args![Chain::new().invoke("collect", args![Chain::new().link("ids")]).unwrap()])
        .render()
        .unwrap();

    assert_eq!(rendered, "MATCH (n) WHERE n.`id` IN collect(ids)");
}

#[rstest]
fn test_order_skip_limit(chain: Chain) {
    let query = chain
        .clause("RETURN")
        .link("n")
        .clause("ORDERBY")
        .link("n")
        .property("name")
        .clause("desc")
        .invoke("skip", args![Param::new("$offset", 20)])
        .unwrap()
        .invoke("limit", args![Param::new("size", 10)])
        .unwrap()
        .to_query()
        .unwrap();

    assert_eq!(
        query.script,
        "RETURN n ORDER BY n.`name` DESC SKIP $offset LIMIT $size"
    );
    assert_eq!(query.params.get("offset"), Some(&json!(20)));
    assert_eq!(query.params.get("size"), Some(&json!(10)));
}

#[rstest]
fn test_alias_and_map_projection(chain: Chain) {
    let rendered = chain
        .clause("WITH")
        .link("n")
        .property("name")
        .alias("name")
        .clause("RETURN")
        .invoke("projection", args!["n", ".name", ".age"])
        .unwrap()
        .render()
        .unwrap();

    assert_eq!(rendered, "WITH n.`name` AS name RETURN n {.name, .age}");
}

#[rstest]
fn test_bitwise_function(chain: Chain) {
    let rendered = chain
        .clause("RETURN")
        .invoke("bxor", args![1, 2, 3])
        .unwrap()
        .render()
        .unwrap();

    assert_eq!(
        rendered,
        r#"RETURN apoc.bitwise.op($NEO_k1k1k_0, "^", apoc.bitwise.op($NEO_k1k1k_1, "^", $NEO_k1k1k_2))"#
    );
}

#[rstest]
fn test_distinct_is_raw(chain: Chain) {
    let rendered = chain
        .clause("RETURN")
        .invoke("count", args![Chain::new().invoke("distinct", args!["n"]).unwrap()])
        .unwrap()
        .render()
        .unwrap();

    assert_eq!(rendered, "RETURN count(distinct(n))");
}

#[rstest]
fn test_comprehension_keeps_its_space(chain: Chain) {
    let rendered = chain
        .clause("RETURN")
        .invoke("comp", args![Chain::new().raw(args!["x IN range(0, 10)"])])
        .unwrap()
        .render()
        .unwrap();

    assert_eq!(rendered, "RETURN [x IN range(0, 10)]");
}

// ============================================================================
// Parameters
// ============================================================================

#[rstest]
fn test_repeated_value_shares_one_parameter(chain: Chain) {
    let query = chain
        .clause("MATCH")
        .node(Node::named("a"))
        .clause("WHERE")
        .link("a")
        .property("first")
        .eq("x")
        .or(Chain::new().link("a").property("last").eq("x"))
        .to_query()
        .unwrap();

    assert_eq!(
        query.script,
        "MATCH (a) WHERE a.`first` = $NEO_k1k1k_0 OR a.`last` = $NEO_k1k1k_0"
    );
    assert_eq!(query.param_count(), 1);
}

#[rstest]
fn test_bool_int_and_float_stay_distinct(chain: Chain) {
    let query = chain
        .func("f", args![true, 1, 1.0, "1", false, 0])
        .to_query()
        .unwrap();

    assert_eq!(query.param_count(), 4);
    assert!(query.script.starts_with("f(true, $"));
    assert!(query.script.contains("false, $"));
}

#[test]
fn test_shared_store_between_chains() {
    let store = ParamStore::new(Some("Q"), Some("zzzzz")).shared();
    let first = Chain::with_store(store.clone()).func("f", args!["a"]);
    let second = Chain::with_store(store.clone()).func("g", args!["a"]);

    assert_eq!(first.render().unwrap(), "f($Q_zzzzz_0)");
    assert_eq!(second.render().unwrap(), "g($Q_zzzzz_0)");
    assert_eq!(store.borrow().len(), 1);
}

#[rstest]
fn test_clone_shares_params_until_divergence(chain: Chain) {
    let base = chain
        .clause("MATCH")
        .node(Node::named("n").prop("name", "x"));
    base.render().unwrap();
    let fork = base.clone();
    assert_eq!(base.bound_params(), fork.bound_params());

    let left = base.clause("RETURN").link("n").render().unwrap();
    let right = fork.clause("DELETE").link("n").render().unwrap();
    assert_ne!(left, right);
}

// ============================================================================
// Partials
// ============================================================================

#[rstest]
fn test_case_partial_in_return(chain: Chain) {
    let case = Partial::shared(Case::new("n.eyes").when("'blue'", 1).otherwise(2));
    let rendered = chain
        .clause("RETURN")
        .raw(args![&case])
        .alias("eyes")
        .render()
        .unwrap();

    assert_eq!(rendered, "RETURN CASE n.eyes WHEN 'blue' THEN 1 ELSE 2 END AS eyes");
}

#[test]
fn test_partial_reused_across_queries() {
    let partial = Partial::shared(|chain: Chain| -> Result<Chain> {
        Ok(chain.link("n").property("age").gt(21))
    });

    let first = Chain::with_store(ParamStore::new(Some("A"), Some("aaaaa")).shared())
        .clause("WHERE")
        .raw(args![&partial]);
    let second = Chain::with_store(ParamStore::new(Some("B"), Some("bbbbb")).shared())
        .clause("WHERE")
        .raw(args![&partial]);

    assert_eq!(first.render().unwrap(), "WHERE n.`age` > $A_aaaaa_0");
    assert_eq!(second.render().unwrap(), "WHERE n.`age` > $B_bbbbb_0");
    assert_eq!(first.bound_params().len(), 1);
    assert_eq!(second.bound_params().len(), 1);
}

#[test]
fn test_partial_standalone_render_is_stable() {
    let partial = Partial::new(|chain: Chain| -> Result<Chain> {
        Ok(chain.clause("MATCH").node(Node::named("n").prop("id", 7)))
    });

    let first = CompiledQuery::from_builder(&partial).unwrap();
    let second = CompiledQuery::from_builder(&partial).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.param_count(), 1);
}

// ============================================================================
// Custom registrations
// ============================================================================

#[rstest]
fn test_custom_statement_and_function(chain: Chain) {
    create_statement("UseGraph", VariantOverrides::rendered("USE")).unwrap();
    create_function("myUpper", VariantOverrides::rendered("custom.upper"), false).unwrap();

    let rendered = chain
        .invoke("usegraph", args!["people"])
        .unwrap()
        .clause("RETURN")
        .invoke("MYUPPER", args!["x"])
        .unwrap()
        .render()
        .unwrap();

    assert_eq!(rendered, "USE people RETURN custom.upper($NEO_k1k1k_0)");
}

#[test]
fn test_custom_registration_conflict() {
    let err = create_statement("Anything", VariantOverrides::default().alias("match")).unwrap_err();
    assert!(matches!(err, BuilderError::AliasConflict { .. }));
}
