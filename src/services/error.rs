use thiserror::Error;

use crate::database::manager::DatabaseError;
use crate::database::models::ValidationErrors;
use crate::identity::IdentityError;

/// Failure kinds surfaced by the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("validation failed: {0}")]
    ValidationFailed(ValidationErrors),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    /// Store or identity provider failure. The detail is for logs only.
    #[error("unavailable: {0}")]
    Unavailable(String),
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        ServiceError::ValidationFailed(errors)
    }
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        ServiceError::Unavailable(format!("document store: {}", err))
    }
}

impl From<IdentityError> for ServiceError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::NotFound(id) => ServiceError::NotFound(format!("user {}", id)),
            other => ServiceError::Unavailable(format!("identity provider: {}", other)),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
