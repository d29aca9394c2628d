use thiserror::Error;

use crate::domain::types::TypeConstraintError;
use crate::forms::FormError;
use crate::repository::errors::RepositoryError;

/// Errors surfaced by the service layer. The HTTP mapping lives in
/// [`crate::routes`].
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Caller is not authenticated. Answered with a bearer challenge.
    #[error("{0}")]
    InvalidCredentials(String),

    /// Caller is known but the request is rejected (e.g. unconfirmed email).
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Form(String),

    #[error("{0}")]
    TypeConstraint(String),

    #[error("Invalid token for email verification")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Standard rejection for a missing or unusable bearer token.
    pub fn credentials() -> Self {
        ServiceError::InvalidCredentials("Could not validate credentials".to_string())
    }
}

impl From<TypeConstraintError> for ServiceError {
    fn from(err: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(err.to_string())
    }
}

impl From<FormError> for ServiceError {
    fn from(err: FormError) -> Self {
        ServiceError::Form(err.to_string())
    }
}
