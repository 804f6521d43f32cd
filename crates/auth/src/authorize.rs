use std::sync::Arc;

use serde::Serialize;

use inkwell_core::SubjectId;

use crate::{AuthError, CredentialStore, Identity};

/// Why a decision came out the way it did.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    Owner,
    Administrator,
    NotOwner,
    InsufficientRole,
    AuthorizationUnavailable,
}

/// Outcome of a single policy check.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationDecision {
    pub allowed: bool,
    pub reason: DecisionReason,
}

impl AuthorizationDecision {
    fn allow(reason: DecisionReason) -> Self {
        Self { allowed: true, reason }
    }

    fn deny(reason: DecisionReason) -> Self {
        Self { allowed: false, reason }
    }

    /// Collapse into a `Result`, mapping denials to their [`AuthError`].
    pub fn into_result(self) -> Result<(), AuthError> {
        match (self.allowed, self.reason) {
            (true, _) => Ok(()),
            (false, DecisionReason::NotOwner) => Err(AuthError::NotOwner),
            (false, DecisionReason::AuthorizationUnavailable) => {
                Err(AuthError::AuthorizationUnavailable)
            }
            (false, _) => Err(AuthError::InsufficientRole),
        }
    }
}

/// The two authorization policies.
///
/// Each check is independent; combining them (e.g. "owner or admin") is the
/// caller's decision.
#[derive(Clone)]
pub struct AuthorizationGuard {
    credentials: Arc<dyn CredentialStore>,
}

impl core::fmt::Debug for AuthorizationGuard {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthorizationGuard").finish_non_exhaustive()
    }
}

impl AuthorizationGuard {
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        Self { credentials }
    }

    /// Allow only subjects whose stored capability is administrator.
    ///
    /// Fails closed: a store error denies with `AuthorizationUnavailable`.
    pub async fn require_admin(&self, identity: &Identity) -> AuthorizationDecision {
        match self.credentials.capability(identity.subject_id()).await {
            Ok(Some(capability)) if capability.is_admin() => {
                AuthorizationDecision::allow(DecisionReason::Administrator)
            }
            Ok(_) => AuthorizationDecision::deny(DecisionReason::InsufficientRole),
            Err(e) => {
                tracing::warn!(
                    subject_id = %identity.subject_id(),
                    error = %e,
                    "capability lookup failed; denying"
                );
                AuthorizationDecision::deny(DecisionReason::AuthorizationUnavailable)
            }
        }
    }

    /// Allow only the owner of a resource.
    ///
    /// - No IO
    /// - No panics
    pub fn require_owner(&self, identity: &Identity, owner_id: &SubjectId) -> AuthorizationDecision {
        if identity.subject_id() == owner_id {
            AuthorizationDecision::allow(DecisionReason::Owner)
        } else {
            AuthorizationDecision::deny(DecisionReason::NotOwner)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use chrono::{Duration, Utc};

    use super::*;
    use crate::{Capability, Credential, StoreError};

    struct StubCredentials {
        capabilities: HashMap<SubjectId, Capability>,
        down: bool,
    }

    impl StubCredentials {
        fn with(entries: &[(&str, Capability)]) -> Arc<Self> {
            Arc::new(Self {
                capabilities: entries.iter().map(|(id, c)| ((*id).into(), *c)).collect(),
                down: false,
            })
        }

        fn unavailable() -> Arc<Self> {
            Arc::new(Self { capabilities: HashMap::new(), down: true })
        }
    }

    #[async_trait]
    impl CredentialStore for StubCredentials {
        async fn credential_by_username(&self, _username: &str) -> Result<Option<Credential>, StoreError> {
            Ok(None)
        }

        async fn capability(&self, subject_id: &SubjectId) -> Result<Option<Capability>, StoreError> {
            if self.down {
                return Err(StoreError::unavailable("connection refused"));
            }
            Ok(self.capabilities.get(subject_id).copied())
        }
    }

    fn identity(sub: &str) -> Identity {
        let now = Utc::now();
        Identity::new(sub.into(), sub.to_string(), now, now + Duration::hours(1))
    }

    #[test]
    fn owner_is_allowed_and_others_are_not() {
        let guard = AuthorizationGuard::new(StubCredentials::with(&[]));
        let u1 = identity("u1");

        let own = guard.require_owner(&u1, &"u1".into());
        assert_eq!(own, AuthorizationDecision { allowed: true, reason: DecisionReason::Owner });

        let other = guard.require_owner(&u1, &"u2".into());
        assert!(!other.allowed);
        assert_eq!(other.into_result(), Err(AuthError::NotOwner));
    }

    #[tokio::test]
    async fn administrator_passes_require_admin() {
        let guard = AuthorizationGuard::new(StubCredentials::with(&[("root", Capability::Administrator)]));
        let root = identity("root");

        let decision = guard.require_admin(&root).await;
        assert!(decision.allowed);
        assert_eq!(decision.reason, DecisionReason::Administrator);

        // The ownership check stays independent of the capability.
        assert!(!guard.require_owner(&root, &"u2".into()).allowed);
    }

    #[tokio::test]
    async fn members_and_unknown_subjects_lack_the_role() {
        let guard = AuthorizationGuard::new(StubCredentials::with(&[("u1", Capability::Member)]));

        for sub in ["u1", "ghost"] {
            let decision = guard.require_admin(&identity(sub)).await;
            assert_eq!(decision.into_result(), Err(AuthError::InsufficientRole), "{sub}");
        }
    }

    #[tokio::test]
    async fn store_outage_fails_closed() {
        let guard = AuthorizationGuard::new(StubCredentials::unavailable());

        let decision = guard.require_admin(&identity("root")).await;
        assert!(!decision.allowed);
        assert_eq!(decision.reason, DecisionReason::AuthorizationUnavailable);
        assert_eq!(decision.into_result(), Err(AuthError::AuthorizationUnavailable));
    }
}
