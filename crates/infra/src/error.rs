use thiserror::Error;

use inkwell_auth::StoreError;
use inkwell_core::DomainError;

pub type InfraResult<T> = Result<T, InfraError>;

/// Failure of a store operation: either a domain rule or the store itself.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InfraError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
