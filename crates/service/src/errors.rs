use thiserror::Error;

use common::CoreError;
use models::errors::ModelError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("remote error: {0}")]
    Remote(String),
}

impl ServiceError {
    /// Store or remote failure, as opposed to a rejected input.
    pub fn is_dependency_failure(&self) -> bool {
        matches!(self, Self::Db(_) | Self::Remote(_))
    }

    /// Underlying message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(m) | Self::Db(m) | Self::Remote(m) => m,
        }
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(m) => Self::Validation(m),
            ModelError::Db(m) => Self::Db(m),
        }
    }
}

impl From<CoreError> for ServiceError {
    fn from(e: CoreError) -> Self {
        Self::Remote(e.to_string())
    }
}
