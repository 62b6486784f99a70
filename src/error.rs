//! Error taxonomy for chain construction and rendering.
//!
//! Every failure is deterministic and surfaced immediately; nothing here is
//! retried. Registry collisions come from the catalog or from client
//! extensions, argument errors from building an offending link, and
//! `NotImplemented` from a partial without a `build` step.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuilderError {
    #[error("The alias '{alias}' requested by '{requested}' is already used by '{existing}'")]
    AliasConflict {
        alias: String,
        existing: String,
        requested: String,
    },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Not implemented: {what}")]
    NotImplemented { what: String },
}

impl BuilderError {
    /// Shorthand for the most common construction-time failure.
    pub fn invalid(message: impl Into<String>) -> Self {
        BuilderError::InvalidArgument {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BuilderError>;
