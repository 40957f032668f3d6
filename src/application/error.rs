//! Application-level errors (wraps domain errors)

use thiserror::Error;
use uuid::Uuid;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("tree definition not found: {0}")]
    TreeNotFound(Uuid),

    #[error("no tree definitions available")]
    NoTrees,

    #[error("position not found: {0}")]
    PositionNotFound(i64),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    /// Wrap a store failure; these abort the whole operation.
    pub fn store(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::OperationFailed {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
