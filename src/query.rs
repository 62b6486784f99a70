//! Finished queries.
//!
//! A builder is only useful once it has been turned into a query string and
//! the parameters that go with it. [`QueryBuilder`] is that contract, and
//! [`CompiledQuery`] is the record handed to whatever executes the query.
//!
//! ```ignore
//! let compiled = CompiledQuery::from_builder(&chain)?;
//! driver.run(&compiled.script, &compiled.params)?;
//! ```

use serde::Serialize;

use crate::chain::Chain;
use crate::error::Result;
use crate::params::BoundParams;
use crate::partial::Partial;

/// Something that renders to a query string plus bound parameters.
pub trait QueryBuilder {
    /// Render the query text.
    ///
    /// Rendering binds parameters, so call this before [`parameters`].
    ///
    /// [`parameters`]: QueryBuilder::parameters
    fn compile(&self) -> Result<String>;

    /// Get query parameters (name -> value pairs), sorted by name.
    fn parameters(&self) -> BoundParams;

    /// Get the number of parameters.
    fn param_count(&self) -> usize {
        self.parameters().len()
    }

    /// Compile and collect parameters in one step.
    fn to_query(&self) -> Result<CompiledQuery> {
        let script = self.compile()?;
        Ok(CompiledQuery {
            script,
            params: self.parameters(),
        })
    }
}

/// A rendered query ready for execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledQuery {
    pub script: String,
    pub params: BoundParams,
}

impl CompiledQuery {
    /// Create a compiled query from a builder.
    pub fn from_builder(builder: &dyn QueryBuilder) -> Result<Self> {
        builder.to_query()
    }

    /// Get the number of parameters in this query.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }
}

impl QueryBuilder for Chain {
    fn compile(&self) -> Result<String> {
        self.render()
    }

    fn parameters(&self) -> BoundParams {
        self.bound_params()
    }
}

/// A partial resets after rendering, so its parameters are the ones
/// captured by the most recent `compile`.
impl QueryBuilder for Partial {
    fn compile(&self) -> Result<String> {
        self.render()
    }

    fn parameters(&self) -> BoundParams {
        self.rendered_params()
    }

    fn to_query(&self) -> Result<CompiledQuery> {
        Partial::to_query(self)
    }
}
