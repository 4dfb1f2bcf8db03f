//! Business rules, written as functions generic over the repository traits
//! (and the payment gateway where processor calls are involved) so they can
//! be exercised against mocks.

use thiserror::Error;

use crate::billing::GatewayError;
use crate::domain::TransitionNotAllowed;
use crate::domain::types::TypeConstraintError;
use crate::repository::errors::RepositoryError;

pub mod billing_items;
pub mod chats;
pub mod clients;
pub mod documents;
pub mod export;
pub mod invoices;
pub mod matters;
pub mod notifications;
pub mod reconciliation;
pub mod subscriptions;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("payment processor error: {0}")]
    Gateway(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound("entity"),
            RepositoryError::ValidationError(msg) => ServiceError::Validation(msg),
            RepositoryError::ConstraintViolation(msg) => ServiceError::Conflict(msg),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<TypeConstraintError> for ServiceError {
    fn from(err: TypeConstraintError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

impl From<TransitionNotAllowed> for ServiceError {
    fn from(err: TransitionNotAllowed) -> Self {
        ServiceError::Conflict(err.to_string())
    }
}

impl From<GatewayError> for ServiceError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::InvalidSignature => ServiceError::Unauthorized,
            other => ServiceError::Gateway(other.to_string()),
        }
    }
}
