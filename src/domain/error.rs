//! Error types for example-response synthesis

use crate::persistence::PersistenceError;
use thiserror::Error;

/// Errors raised while turning a route's annotations into an example response
#[derive(Debug, Error)]
pub enum ExampleError {
    /// A resource directive was given without a usable model directive
    #[error("Couldn't detect an API resource model from the doc block. Did you remember to specify a model using @apiResourceModel?")]
    MissingModelDirective,

    /// Directive text that cannot be parsed
    #[error("Malformed directive: {0}")]
    Directive(String),

    /// Leading status digits outside the HTTP range
    #[error("Invalid status code {0} in resource directive; expected 100-599")]
    InvalidStatusCode(u16),

    /// A model or transformer name that no registry knows
    #[error("Unresolved type: {0}")]
    UnresolvedType(String),

    /// No fixture factory is registered for the model
    #[error("No factory registered for {0}")]
    UnknownFactory(String),

    /// A factory variation that the factory does not define
    #[error("Factory for {model} has no state named '{state}'")]
    UnknownState { model: String, state: String },

    /// Factory failed to build an instance
    #[error("Factory error: {0}")]
    Factory(String),

    /// Transformer refused the arguments it was constructed with
    #[error("Cannot construct {class}: {reason}")]
    Construction { class: String, reason: String },

    /// Transformer failed while rendering its response
    #[error("Render error: {0}")]
    Render(String),

    /// Persistence lookup failed
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// JSON error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ExampleError {
    pub fn construction(class: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Construction {
            class: class.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for example synthesis
pub type ExampleResult<T> = Result<T, ExampleError>;
