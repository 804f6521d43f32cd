//! Read interface onto whatever owns user credentials.

use async_trait::async_trait;
use std::sync::Arc;

use inkwell_core::SubjectId;

use crate::{Capability, StoreError};

/// Stored login material for one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub subject_id: SubjectId,
    pub username: String,
    pub password_hash: String,
    pub capability: Capability,
}

/// Narrow read view of the credential store.
///
/// The auth core reads the password hash at login and the capability at
/// authorization time; it never writes.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn credential_by_username(&self, username: &str) -> Result<Option<Credential>, StoreError>;

    /// Capability of a subject, or `None` if the subject is unknown.
    async fn capability(&self, subject_id: &SubjectId) -> Result<Option<Capability>, StoreError>;
}

#[async_trait]
impl<S> CredentialStore for Arc<S>
where
    S: CredentialStore + ?Sized,
{
    async fn credential_by_username(&self, username: &str) -> Result<Option<Credential>, StoreError> {
        (**self).credential_by_username(username).await
    }

    async fn capability(&self, subject_id: &SubjectId) -> Result<Option<Capability>, StoreError> {
        (**self).capability(subject_id).await
    }
}
