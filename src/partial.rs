//! Deferred sub-builders.
//!
//! A [`Partial`] owns a private [`Chain`] and a [`Build`] step that fills
//! it. The chain is built on first use and reset after every render, so the
//! same partial can be rendered (or embedded in several queries) any number
//! of times without leaking bindings between them.
//!
//! ```ignore
//! let case = Partial::shared(Case::new("n.eyes").when("'blue'", 1).otherwise(2));
//! let chain = Chain::new().clause("RETURN").raw(args![&case]).alias("eyes");
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::chain::Chain;
use crate::error::{BuilderError, Result};
use crate::params::{BoundParams, SharedParams};
use crate::query::CompiledQuery;
use crate::value::{Args, Value};

/// The build step of a partial: append this partial's links to `chain`.
pub trait Build {
    fn build(&self, chain: Chain) -> Result<Chain> {
        let _ = chain;
        Err(BuilderError::NotImplemented {
            what: format!("{} has no build step", std::any::type_name::<Self>()),
        })
    }
}

impl<F> Build for F
where
    F: Fn(Chain) -> Result<Chain>,
{
    fn build(&self, chain: Chain) -> Result<Chain> {
        self(chain)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialState {
    Unbuilt,
    Built,
}

pub struct Partial {
    builder: Box<dyn Build>,
    chain: RefCell<Chain>,
    state: Cell<PartialState>,
    /// Bindings of the last standalone render, kept across the reset
    rendered: RefCell<BoundParams>,
}

impl fmt::Debug for Partial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Partial")
            .field("state", &self.state.get())
            .field("links", &self.chain.borrow().len())
            .finish()
    }
}

impl Partial {
    pub fn new(builder: impl Build + 'static) -> Self {
        Self {
            builder: Box::new(builder),
            chain: RefCell::new(Chain::new()),
            state: Cell::new(PartialState::Unbuilt),
            rendered: RefCell::new(BoundParams::new()),
        }
    }

    /// A partial ready to be passed as an argument to other chains.
    pub fn shared(builder: impl Build + 'static) -> Rc<Self> {
        Rc::new(Self::new(builder))
    }

    pub fn state(&self) -> PartialState {
        self.state.get()
    }

    /// Run the build step unless the chain is already built.
    pub fn ensure_built(&self) -> Result<()> {
        if self.state.get() == PartialState::Built {
            return Ok(());
        }
        debug!("building partial");
        let chain = {
            let mut slot = self.chain.borrow_mut();
            let fresh = slot.detached();
            std::mem::replace(&mut *slot, fresh)
        };
        let built = self.builder.build(chain)?;
        *self.chain.borrow_mut() = built;
        self.state.set(PartialState::Built);
        Ok(())
    }

    /// Build if needed, then append more links to the built chain.
    pub fn extend<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(Chain) -> Result<Chain>,
    {
        self.ensure_built()?;
        let chain = {
            let mut slot = self.chain.borrow_mut();
            let fresh = slot.detached();
            std::mem::replace(&mut *slot, fresh)
        };
        *self.chain.borrow_mut() = f(chain)?;
        Ok(())
    }

    /// Shorthand for extending with `clause(name).call(args)`.
    pub fn invoke(&self, name: &str, args: impl Into<Args>) -> Result<()> {
        let args = args.into();
        self.extend(|chain| chain.invoke(name, args))
    }

    /// Shorthand for extending with an operator.
    pub fn operator(&self, operator: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.extend(|chain| Ok(chain.operator(operator, value)))
    }

    /// Render against the partial's own store, then reset.
    ///
    /// The bindings of this render stay readable through
    /// [`rendered_params`](Self::rendered_params).
    pub fn render(&self) -> Result<String> {
        self.ensure_built()?;
        let result = {
            let chain = self.chain.borrow();
            let result = chain.render();
            *self.rendered.borrow_mut() = chain.bound_params();
            result
        };
        self.reset();
        result
    }

    /// Render as part of an outer chain: bindings move into `store`.
    pub fn render_within(&self, store: &SharedParams) -> Result<String> {
        self.ensure_built()?;
        let result = {
            let chain = self.chain.borrow();
            chain.reparent(store);
            chain.render()
        };
        self.reset();
        result
    }

    /// Render and capture the bindings before the reset discards them.
    pub fn to_query(&self) -> Result<CompiledQuery> {
        let script = self.render()?;
        Ok(CompiledQuery {
            script,
            params: self.rendered_params(),
        })
    }

    /// Bindings currently held by the partial's chain. Empty after every
    /// render, since rendering resets the chain.
    pub fn bound_params(&self) -> BoundParams {
        self.chain.borrow().bound_params()
    }

    /// Bindings produced by the last standalone [`render`](Self::render).
    pub fn rendered_params(&self) -> BoundParams {
        self.rendered.borrow().clone()
    }

    fn reset(&self) {
        self.chain.borrow_mut().reset();
        self.state.set(PartialState::Unbuilt);
        debug!("reset partial");
    }
}

/// `CASE subject WHEN c THEN v ... ELSE e END`
#[derive(Debug, Clone, Default)]
pub struct Case {
    subject: Value,
    whens: Vec<(Value, Value)>,
    otherwise: Option<Value>,
}

impl Case {
    pub fn new(subject: impl Into<Value>) -> Self {
        Self {
            subject: subject.into(),
            ..Self::default()
        }
    }

    pub fn when(mut self, condition: impl Into<Value>, then: impl Into<Value>) -> Self {
        self.whens.push((condition.into(), then.into()));
        self
    }

    pub fn otherwise(mut self, value: impl Into<Value>) -> Self {
        self.otherwise = Some(value.into());
        self
    }
}

impl Build for Case {
    fn build(&self, chain: Chain) -> Result<Chain> {
        let mut chain = chain.statement("CASE", Args::new().arg(self.subject.clone()));
        for (condition, then) in &self.whens {
            chain = chain
                .statement("WHEN", Args::new().arg(condition.clone()))
                .statement("THEN", Args::new().arg(then.clone()));
        }
        if let Some(otherwise) = &self.otherwise {
            chain = chain.statement("ELSE", Args::new().arg(otherwise.clone()));
        }
        Ok(chain.link("END"))
    }
}
