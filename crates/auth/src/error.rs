//! Authentication/authorization error taxonomy.

use thiserror::Error;

/// Every way authenticating or authorizing a request can fail.
///
/// Messages are meant for logs. Callers map [`AuthError::class`] to a
/// transport status and keep the detail server-side.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("no credentials presented")]
    MissingCredentials,

    #[error("malformed token")]
    MalformedToken,

    #[error("unexpected signing algorithm")]
    UnexpectedAlgorithm,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("administrator capability required")]
    InsufficientRole,

    #[error("subject does not own the resource")]
    NotOwner,

    #[error("authorization source unavailable")]
    AuthorizationUnavailable,

    #[error("password hashing failed: {0}")]
    HashingFailure(String),

    #[error("token signing failed: {0}")]
    SigningFailure(String),
}

/// Coarse grouping used to pick a response status.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FailureClass {
    Authentication,
    Authorization,
    Internal,
}

impl AuthError {
    pub fn class(&self) -> FailureClass {
        match self {
            Self::MissingCredentials
            | Self::MalformedToken
            | Self::UnexpectedAlgorithm
            | Self::InvalidSignature
            | Self::Expired
            | Self::InvalidCredentials => FailureClass::Authentication,
            Self::InsufficientRole | Self::NotOwner | Self::AuthorizationUnavailable => {
                FailureClass::Authorization
            }
            Self::HashingFailure(_) | Self::SigningFailure(_) => FailureClass::Internal,
        }
    }
}

/// Failure reported by a credential or resource store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
