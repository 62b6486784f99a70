//! Predefined clause and function names.
//!
//! Every entry is registered under its lower-cased name when the global
//! registry is first used. Statements without a rendered name render their
//! name upper-cased; functions render their name exactly as written.

/// One predefined clause or function.
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    /// Registry name (matched case-insensitively)
    pub name: &'static str,
    /// Text emitted when rendered, if it differs from the name
    pub rendered: Option<&'static str>,
    /// Raw functions render their arguments literally instead of binding them
    pub raw: bool,
}

const fn entry(name: &'static str) -> CatalogEntry {
    CatalogEntry {
        name,
        rendered: None,
        raw: false,
    }
}

const fn renamed(name: &'static str, rendered: &'static str) -> CatalogEntry {
    CatalogEntry {
        name,
        rendered: Some(rendered),
        raw: false,
    }
}

pub const STATEMENTS: &[CatalogEntry] = &[
    entry("Match"),
    entry("Create"),
    entry("Merge"),
    entry("Delete"),
    entry("Remove"),
    entry("Drop"),
    entry("Where"),
    renamed("OrderBy", "ORDER BY"),
    entry("Set"),
    entry("Skip"),
    entry("Limit"),
    entry("Return"),
    entry("Unwind"),
    entry("ASSERT"),
    entry("Detach"),
    renamed("DetachDelete", "DETACH DELETE"),
    entry("Foreach"),
    entry("Load"),
    entry("CSV"),
    entry("FROM"),
    entry("Headers"),
    renamed("LoadCsvFrom", "LOAD CSV FROM"),
    renamed("LoadCSVWithHeadersFrom", "LOAD CSV WITH HEADERS FROM"),
    entry("WITH"),
    renamed("UsingPeriodIcCommit", "USING PERIODIC COMMIT"),
    entry("Periodic"),
    entry("Commit"),
    renamed("FieldTerminator", "FIELDTERMINATOR"),
    renamed("Optional", "OPTIONAL"),
    renamed("OptionalMatch", "OPTIONAL MATCH"),
    entry("Desc"),
    entry("When"),
    entry("ELSE"),
    entry("Case"),
    entry("End"),
    renamed("OnCreateSet", "ON CREATE SET"),
    renamed("OnMatchSet", "ON MATCH SET"),
    renamed("CreateIndexOn", "CREATE INDEX ON"),
    renamed("UsingIndex", "USING INDEX"),
    renamed("DropIndexOn", "DROP INDEX ON"),
    renamed("CreateConstraintOn", "CREATE CONSTRAINT ON"),
    renamed("OnCreate", "ON CREATE"),
    renamed("DropConstraintOn", "DROP CONSTRAINT ON"),
    entry("WHEN"),
    entry("THEN"),
    entry("NOT"),
    entry("XOR"),
    entry("NULL"),
    renamed("IS_NULL", "IS NULL"),
    renamed("IS_NOT_NULL", "IS NOT NULL"),
    entry("OR"),
    entry("IS"),
    entry("CONTAINS"),
];

pub const FUNCTIONS: &[CatalogEntry] = &[
    entry("size"),
    entry("reverse"),
    entry("head"),
    entry("tail"),
    entry("last"),
    entry("extract"),
    entry("filter"),
    entry("reduce"),
    renamed("Type", "type"),
    entry("startNode"),
    entry("endNode"),
    entry("count"),
    entry("collect"),
    entry("sum"),
    entry("percentileDisc"),
    entry("stDev"),
    entry("coalesce"),
    entry("timestamp"),
    entry("toInteger"),
    entry("toFloat"),
    entry("toBoolean"),
    entry("keys"),
    entry("properties"),
    entry("length"),
    entry("nodes"),
    entry("relationships"),
    entry("point"),
    entry("distance"),
    entry("abs"),
    entry("rand"),
    renamed("ROUND", "round"),
    renamed("CEIL", "ceil"),
    renamed("Floor", "floor"),
    entry("sqrt"),
    entry("sign"),
    entry("sin"),
    entry("cos"),
    entry("tan"),
    entry("cot"),
    entry("asin"),
    entry("acos"),
    entry("atan"),
    entry("atanZ"),
    entry("haversin"),
    entry("degrees"),
    entry("radians"),
    entry("pi"),
    entry("log10"),
    entry("log"),
    entry("exp"),
    renamed("E", "e"),
    entry("toString"),
    entry("replace"),
    entry("substring"),
    entry("left"),
    entry("right"),
    entry("trim"),
    entry("ltrim"),
    entry("toUpper"),
    entry("toLower"),
    renamed("SPLIT", "split"),
    entry("exists"),
    CatalogEntry {
        name: "distinct",
        rendered: Some("distinct"),
        raw: true,
    },
    renamed("MAX", "max"),
    entry("labels"),
];

/// Functions whose result is already a list, so `IN` must not wrap them.
pub const FUNCTIONS_RETURNING_LIST: &[&str] = &[
    "collect",
    "reverse",
    "tail",
    "labels",
    "nodes",
    "keys",
    "relationships",
    "split",
];
