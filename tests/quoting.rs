//! Process-wide quoting and prefix settings.
//!
//! These tests mutate global settings, so each one runs serially and restores
//! the defaults before returning.

use std::io::Write;

use cypher_chain::config::{self, reset_settings, set_param_prefix, set_quotes};
use cypher_chain::{Chain, Node, ParamStore, QuoteConfig, Relationship, Settings, args};
use rstest::{fixture, rstest};
use serial_test::serial;

#[fixture]
fn chain() -> Chain {
    Chain::with_store(ParamStore::new(Some("NEO"), Some("qqqqq")).shared())
}

#[rstest]
#[serial]
fn test_default_quotes(chain: Chain) {
    reset_settings();
    let rendered = chain
        .node(Node::named("n").label("Person").prop("name", "x"))
        .render()
        .unwrap();
    assert_eq!(rendered, "(n:`Person` {`name`: $name_qqqqq_0})");
}

#[rstest]
#[serial]
fn test_custom_quotes_apply_at_render_time(chain: Chain) {
    let chain = chain
        .clause("MATCH")
        .node(Node::named("n").label("Per\"son"))
        .clause("SET")
        .link("n")
        .plus_assign(serde_json::json!({"nick": "x"}));

    set_quotes(QuoteConfig {
        label: "\"".to_string(),
        property: "'".to_string(),
        map_key: String::new(),
    });
    let rendered = chain.render();
    reset_settings();

    assert_eq!(
        rendered.unwrap(),
        "MATCH (n:\"Per\"\"son\") SET n += {nick: $NEO_qqqqq_0}"
    );
}

#[rstest]
#[serial]
fn test_property_quote_doubles_embedded_mark(chain: Chain) {
    set_quotes(QuoteConfig {
        property: "'".to_string(),
        ..QuoteConfig::default()
    });
    let rendered = chain.link("n").property("it's").render();
    reset_settings();

    assert_eq!(rendered.unwrap(), "n.'it''s'");
}

#[rstest]
#[serial]
fn test_relationship_types_use_label_quote(chain: Chain) {
    set_quotes(QuoteConfig {
        label: "|".to_string(),
        ..QuoteConfig::default()
    });
    let rendered = chain
        .rel_out(Relationship::new().rel_type("KNOWS"))
        .render();
    reset_settings();

    assert_eq!(rendered.unwrap(), "-[:|KNOWS|]->");
}

#[test]
#[serial]
fn test_param_prefix_for_new_chains() {
    set_param_prefix("QRY");
    let chain = Chain::new().func("f", args![1]);
    let rendered = chain.render();
    reset_settings();

    assert!(rendered.unwrap().starts_with("f($QRY_"));
}

#[test]
#[serial]
fn test_settings_loaded_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"param_prefix": "FILE", "quotes": {{"label": "'", "map_key": "\""}}}}"#
    )
    .unwrap();

    Settings::load(file.path()).unwrap().apply();
    let current = config::settings();
    let rendered = Chain::new().node(Node::named("n").label("L")).render();
    let prefixed = Chain::new().func("f", args!["v"]).render();
    reset_settings();

    assert_eq!(current.param_prefix, "FILE");
    assert_eq!(current.quotes.property, "`");
    assert_eq!(rendered.unwrap(), "(n:'L')");
    assert!(prefixed.unwrap().starts_with("f($FILE_"));
}

#[test]
#[serial]
fn test_reset_restores_defaults() {
    set_param_prefix("X");
    set_quotes(QuoteConfig {
        label: "'".to_string(),
        ..QuoteConfig::default()
    });
    reset_settings();
    assert_eq!(config::settings(), Settings::default());
}
