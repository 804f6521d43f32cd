//! API-side authorization for mutating handlers.
//!
//! The guard's two policies stay independent; this module is the one place
//! that combines them as "owner, or else administrator".

use inkwell_auth::{
    AuthError, AuthorizationGuard, DecisionReason, Identity, ResourceOwnership, ResourceRef,
    ResourceStore,
};
use inkwell_core::{DomainError, SubjectId};

use crate::app::errors::ApiError;
use crate::context::AuthContext;

/// Allow the owner, or else an administrator.
///
/// The admin lookup only runs when the ownership check fails.
pub async fn authorize_owner_or_admin(
    guard: &AuthorizationGuard,
    identity: &Identity,
    owner: &SubjectId,
) -> Result<DecisionReason, AuthError> {
    let as_owner = guard.require_owner(identity, owner);
    if as_owner.allowed {
        return Ok(as_owner.reason);
    }

    let as_admin = guard.require_admin(identity).await;
    if as_admin.allowed {
        return Ok(as_admin.reason);
    }

    match as_admin.reason {
        DecisionReason::AuthorizationUnavailable => Err(AuthError::AuthorizationUnavailable),
        _ => Err(AuthError::NotOwner),
    }
}

/// Check that the caller may mutate `resource`.
///
/// This is intended to be called **before** the store is touched.
pub async fn authorize_mutation(
    guard: &AuthorizationGuard,
    resources: &dyn ResourceStore,
    ctx: &AuthContext,
    resource: ResourceRef,
) -> Result<ResourceOwnership, ApiError> {
    let ownership = match resources.owner_of(&resource).await {
        Ok(Some(ownership)) => ownership,
        Ok(None) => return Err(DomainError::not_found(resource.kind.as_str()).into()),
        Err(e) => {
            tracing::warn!(%resource, error = %e, "ownership lookup failed; denying");
            return Err(AuthError::AuthorizationUnavailable.into());
        }
    };

    match authorize_owner_or_admin(guard, ctx.identity(), &ownership.owner).await {
        Ok(reason) => {
            tracing::debug!(%resource, subject_id = %ctx.subject_id(), ?reason, "mutation allowed");
            Ok(ownership)
        }
        Err(e) => {
            tracing::info!(%resource, subject_id = %ctx.subject_id(), error = %e, "mutation denied");
            Err(e.into())
        }
    }
}

/// Admin-only gate for routes with no owner.
pub async fn require_admin(guard: &AuthorizationGuard, ctx: &AuthContext) -> Result<(), ApiError> {
    guard.require_admin(ctx.identity()).await.into_result().map_err(|e| {
        tracing::info!(subject_id = %ctx.subject_id(), error = %e, "admin route denied");
        ApiError::from(e)
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::http::{Extensions, StatusCode};
    use axum::response::IntoResponse;
    use chrono::Utc;
    use inkwell_auth::{
        Capability, Credential, CredentialStore, SigningKey, StoreError, TokenService, TokenVerifier,
    };
    use inkwell_infra::{InMemoryUserStore, NewUser};

    use super::*;

    /// Credential store whose capability lookups always fail.
    struct DownCredentials;

    #[async_trait]
    impl CredentialStore for DownCredentials {
        async fn credential_by_username(&self, _username: &str) -> Result<Option<Credential>, StoreError> {
            Err(StoreError::unavailable("connection refused"))
        }

        async fn capability(&self, _subject_id: &SubjectId) -> Result<Option<Capability>, StoreError> {
            Err(StoreError::unavailable("connection refused"))
        }
    }

    /// Resource store answering every lookup with a fixed result.
    enum StubResources {
        Owned(SubjectId),
        Missing,
        Down,
    }

    #[async_trait]
    impl ResourceStore for StubResources {
        async fn owner_of(&self, resource: &ResourceRef) -> Result<Option<ResourceOwnership>, StoreError> {
            match self {
                Self::Owned(owner) => Ok(Some(ResourceOwnership {
                    resource: resource.clone(),
                    owner: owner.clone(),
                })),
                Self::Missing => Ok(None),
                Self::Down => Err(StoreError::unavailable("timeout")),
            }
        }
    }

    fn context(identity: Identity) -> AuthContext {
        let mut ext = Extensions::new();
        AuthContext::bind(&mut ext, identity).unwrap();
        ext.get::<AuthContext>().cloned().unwrap()
    }

    struct Fixture {
        users: Arc<InMemoryUserStore>,
        guard: AuthorizationGuard,
        tokens: TokenService,
    }

    impl Fixture {
        fn new() -> Self {
            let users = Arc::new(InMemoryUserStore::new());
            Self {
                guard: AuthorizationGuard::new(users.clone()),
                users,
                tokens: TokenService::new(&SigningKey::from_secret("authz").unwrap()),
            }
        }

        fn user(&self, name: &str, capability: Capability) -> Identity {
            let record = self
                .users
                .register(
                    NewUser {
                        username: name.into(),
                        email: format!("{name}@example.com"),
                        password_hash: "x".into(),
                        capability,
                    },
                    Utc::now(),
                )
                .unwrap();
            let signed = self.tokens.issue(&record.subject_id, name).unwrap();
            self.tokens.verify(&signed.token).unwrap()
        }
    }

    #[tokio::test]
    async fn owner_passes_without_admin_lookup() {
        let fx = Fixture::new();
        let alice = fx.user("alice", Capability::Member);

        let reason = authorize_owner_or_admin(&fx.guard, &alice, alice.subject_id()).await;
        assert_eq!(reason, Ok(DecisionReason::Owner));
    }

    #[tokio::test]
    async fn admin_may_act_on_anothers_resource() {
        let fx = Fixture::new();
        let alice = fx.user("alice", Capability::Member);
        let root = fx.user("root", Capability::Administrator);

        let reason = authorize_owner_or_admin(&fx.guard, &root, alice.subject_id()).await;
        assert_eq!(reason, Ok(DecisionReason::Administrator));
    }

    #[tokio::test]
    async fn member_is_not_owner_of_anothers_resource() {
        let fx = Fixture::new();
        let alice = fx.user("alice", Capability::Member);
        let bob = fx.user("bob", Capability::Member);

        let err = authorize_owner_or_admin(&fx.guard, &bob, alice.subject_id()).await;
        assert_eq!(err, Err(AuthError::NotOwner));
    }

    #[tokio::test]
    async fn credential_outage_denies_non_owner_as_unavailable() {
        let fx = Fixture::new();
        let alice = fx.user("alice", Capability::Member);
        let bob = fx.user("bob", Capability::Member);
        let guard = AuthorizationGuard::new(Arc::new(DownCredentials));

        let err = authorize_owner_or_admin(&guard, &bob, alice.subject_id()).await;
        assert_eq!(err, Err(AuthError::AuthorizationUnavailable));

        // Owners never reach the capability lookup.
        let own = authorize_owner_or_admin(&guard, &alice, alice.subject_id()).await;
        assert_eq!(own, Ok(DecisionReason::Owner));
    }

    #[tokio::test]
    async fn ownership_lookup_failure_is_forbidden() {
        let fx = Fixture::new();
        let alice = context(fx.user("alice", Capability::Member));
        let root = context(fx.user("root", Capability::Administrator));

        for ctx in [&alice, &root] {
            let err = authorize_mutation(&fx.guard, &StubResources::Down, ctx, ResourceRef::post("p1"))
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::Auth(AuthError::AuthorizationUnavailable)));
            assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
        }
    }

    #[tokio::test]
    async fn missing_resource_is_not_found_before_any_decision() {
        let fx = Fixture::new();
        let bob = context(fx.user("bob", Capability::Member));
        // A down credential store would turn any decision into 403.
        let guard = AuthorizationGuard::new(Arc::new(DownCredentials));

        let err = authorize_mutation(&guard, &StubResources::Missing, &bob, ResourceRef::comment("c1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Domain(DomainError::NotFound("comment"))));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn non_owner_mutation_renders_forbidden() {
        let fx = Fixture::new();
        let alice = fx.user("alice", Capability::Member);
        let bob = context(fx.user("bob", Capability::Member));
        let resources = StubResources::Owned(alice.subject_id().clone());

        let err = authorize_mutation(&fx.guard, &resources, &bob, ResourceRef::post("p1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Auth(AuthError::NotOwner)));
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);

        let owned = authorize_mutation(&fx.guard, &resources, &context(alice), ResourceRef::post("p1"))
            .await
            .unwrap();
        assert_eq!(owned.resource, ResourceRef::post("p1"));
    }
}
