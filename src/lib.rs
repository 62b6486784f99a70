//! cypher_chain library - Fluent Cypher query builder
//!
//! Assembles a chain of clauses, functions, patterns and operators and
//! renders it to a single Cypher string plus a table of named, deduplicated
//! parameters ready to hand to a driver.

#[macro_use]
pub mod value;

pub mod chain;
pub mod config;
pub mod error;
pub mod link;
pub mod params;
pub mod partial;
pub mod query;
pub mod quote;
pub mod registry;

pub use chain::Chain;
pub use config::{QuoteConfig, Settings};
pub use error::{BuilderError, Result};
pub use link::{Direction, Hops, LabelJoin, Node, Relationship};
pub use params::{BoundParams, NameHint, Param, ParamStore};
pub use partial::{Build, Case, Partial, PartialState};
pub use query::{CompiledQuery, QueryBuilder};
pub use registry::{Variant, VariantOverrides, create_function, create_statement};
pub use value::{Args, Value};
