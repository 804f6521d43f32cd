//! `inkwell-auth` — pure authentication/authorization boundary.
//!
//! This crate is decoupled from HTTP and storage: stores are consumed through
//! the narrow read traits in [`credentials`] and [`resources`].

pub mod authorize;
pub mod capability;
pub mod claims;
pub mod credentials;
pub mod error;
pub mod identity;
pub mod password;
pub mod resources;
pub mod token;

pub use authorize::{AuthorizationDecision, AuthorizationGuard, DecisionReason};
pub use capability::Capability;
pub use claims::{TokenClaims, validate_claims};
pub use credentials::{Credential, CredentialStore};
pub use error::{AuthError, FailureClass, StoreError};
pub use identity::Identity;
pub use password::PasswordHasher;
pub use resources::{ResourceKind, ResourceOwnership, ResourceRef, ResourceStore};
pub use token::{SignedToken, SigningKey, TokenService, TokenVerifier};
