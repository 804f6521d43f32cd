use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::Utc;

use inkwell_auth::{
    AuthError, AuthorizationGuard, Capability, CredentialStore, PasswordHasher, SignedToken,
    TokenService,
};
use inkwell_core::{DomainError, SubjectId};
use inkwell_infra::{InMemoryContentStore, InMemoryUserStore, NewUser};

use crate::app::dto::RegisterRequest;
use crate::app::errors::ApiError;
use crate::config::BootstrapAdmin;

/// Name of the cookie carrying the access token.
pub const TOKEN_COOKIE: &str = "token";

pub const MIN_PASSWORD_LEN: usize = 6;

/// Shared handles for request handlers.
pub struct AppServices {
    pub tokens: Arc<TokenService>,
    pub hasher: PasswordHasher,
    pub users: Arc<InMemoryUserStore>,
    pub content: Arc<InMemoryContentStore>,
    pub guard: AuthorizationGuard,
    secure_cookies: bool,
    /// Verified against when the username is unknown, so both login
    /// failures pay for one Argon2 verification.
    decoy_hash: String,
}

impl AppServices {
    pub fn new(tokens: Arc<TokenService>, secure_cookies: bool) -> Result<Self, AuthError> {
        let hasher = PasswordHasher::new();
        let decoy_hash = hasher.hash(&SubjectId::generate().to_string())?;
        let users = Arc::new(InMemoryUserStore::new());
        Ok(Self {
            tokens,
            hasher,
            guard: AuthorizationGuard::new(users.clone()),
            users,
            content: Arc::new(InMemoryContentStore::new()),
            secure_cookies,
            decoy_hash,
        })
    }

    /// Create a member account and sign them in.
    pub async fn register(&self, req: RegisterRequest) -> Result<(SubjectId, SignedToken), ApiError> {
        let username = req.username.trim();
        if username.is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
            return Err(ApiError::bad_request("username, email and password are required"));
        }
        if req.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ApiError::bad_request(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        // Cheap pre-check so a taken name does not cost a hash; `register` re-checks.
        if self.users.find_by_username(username)?.is_some() {
            return Err(DomainError::conflict(format!("username '{username}' already exists")).into());
        }

        let password_hash = hash_blocking(self.hasher.clone(), req.password).await?;
        let record = self.users.register(
            NewUser {
                username: username.to_string(),
                email: req.email,
                password_hash,
                capability: Capability::Member,
            },
            Utc::now(),
        )?;

        let signed = self.tokens.issue(&record.subject_id, &record.username)?;
        Ok((record.subject_id, signed))
    }

    /// Check a username/password pair and issue a token.
    pub async fn login(&self, username: &str, password: &str) -> Result<SignedToken, ApiError> {
        let username = username.trim();
        let Some(credential) = self.users.credential_by_username(username).await? else {
            verify_blocking(self.hasher.clone(), password.to_string(), self.decoy_hash.clone()).await?;
            tracing::info!(username, "login for unknown user");
            return Err(AuthError::InvalidCredentials.into());
        };

        let matches = verify_blocking(
            self.hasher.clone(),
            password.to_string(),
            credential.password_hash,
        )
        .await?;
        if !matches {
            tracing::info!(subject_id = %credential.subject_id, "login with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        Ok(self.tokens.issue(&credential.subject_id, &credential.username)?)
    }

    /// Make sure the configured administrator exists and holds the capability.
    pub async fn ensure_admin(&self, admin: &BootstrapAdmin) -> Result<SubjectId, ApiError> {
        if let Some(existing) = self.users.find_by_username(&admin.username)? {
            self.users.grant_capability(&existing.subject_id, Capability::Administrator)?;
            return Ok(existing.subject_id);
        }

        let password_hash = hash_blocking(self.hasher.clone(), admin.password.clone()).await?;
        let record = self.users.register(
            NewUser {
                username: admin.username.clone(),
                email: admin.email.clone(),
                password_hash,
                capability: Capability::Administrator,
            },
            Utc::now(),
        )?;
        tracing::info!(subject_id = %record.subject_id, "bootstrap administrator created");
        Ok(record.subject_id)
    }

    /// `token` cookie for a freshly issued token.
    pub fn session_cookie(&self, signed: &SignedToken) -> Cookie<'static> {
        Cookie::build((TOKEN_COOKIE, signed.token.clone()))
            .http_only(true)
            .path("/")
            .same_site(SameSite::Strict)
            .secure(self.secure_cookies)
            .max_age(time::Duration::seconds(self.tokens.ttl().num_seconds()))
            .build()
    }
}

async fn hash_blocking(hasher: PasswordHasher, password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| AuthError::HashingFailure(e.to_string()))?
}

async fn verify_blocking(hasher: PasswordHasher, password: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
        .await
        .map_err(|e| AuthError::HashingFailure(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use inkwell_auth::{SigningKey, TokenVerifier};

    use super::*;

    fn services() -> AppServices {
        let tokens = TokenService::new(&SigningKey::from_secret("svc-secret").unwrap());
        AppServices::new(Arc::new(tokens), false).unwrap()
    }

    fn register_req(username: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: format!("{username}@example.com"),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn register_then_login_issues_tokens_for_the_same_subject() {
        let svc = services();
        let (subject, _) = svc.register(register_req("alice", "secret1")).await.unwrap();

        let signed = svc.login("alice", "secret1").await.unwrap();
        let identity = svc.tokens.verify(&signed.token).unwrap();
        assert_eq!(identity.subject_id(), &subject);
        assert_eq!(identity.display_name(), "alice");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let svc = services();
        svc.register(register_req("alice", "secret1")).await.unwrap();

        for (user, pass) in [("alice", "wrong"), ("mallory", "secret1")] {
            let err = svc.login(user, pass).await.unwrap_err();
            assert!(matches!(err, ApiError::Auth(AuthError::InvalidCredentials)), "{user}");
        }
    }

    #[tokio::test]
    async fn unknown_user_costs_a_full_verification() {
        let svc = services();
        svc.register(register_req("alice", "secret1")).await.unwrap();
        let real = svc.users.find_by_username("alice").unwrap().unwrap().password_hash;

        // Same algorithm and cost parameters as a stored hash.
        let params = |phc: &str| phc.rsplitn(3, '$').nth(2).map(str::to_string);
        assert_eq!(params(&svc.decoy_hash), params(&real));

        let started = std::time::Instant::now();
        let _ = svc.login("alice", "wrong").await;
        let wrong_password = started.elapsed();

        let started = std::time::Instant::now();
        let err = svc.login("mallory", "wrong").await.unwrap_err();
        let unknown_user = started.elapsed();

        assert!(matches!(err, ApiError::Auth(AuthError::InvalidCredentials)));
        assert!(
            unknown_user * 10 >= wrong_password,
            "unknown user {unknown_user:?} vs wrong password {wrong_password:?}"
        );
    }

    #[tokio::test]
    async fn login_trims_the_username_like_register() {
        let svc = services();
        let (subject, _) = svc.register(register_req(" alice ", "secret1")).await.unwrap();

        let signed = svc.login(" alice ", "secret1").await.unwrap();
        assert_eq!(svc.tokens.verify(&signed.token).unwrap().subject_id(), &subject);
    }

    #[tokio::test]
    async fn short_passwords_and_duplicates_are_rejected() {
        let svc = services();
        assert!(matches!(
            svc.register(register_req("bob", "12345")).await,
            Err(ApiError::BadRequest(_))
        ));

        svc.register(register_req("bob", "123456")).await.unwrap();
        assert!(matches!(
            svc.register(register_req("bob", "abcdef")).await,
            Err(ApiError::Domain(DomainError::Conflict(_)))
        ));
    }

    #[tokio::test]
    async fn ensure_admin_promotes_an_existing_member() {
        let svc = services();
        let (subject, _) = svc.register(register_req("root", "secret1")).await.unwrap();

        let admin = BootstrapAdmin {
            username: "root".into(),
            password: "ignored".into(),
            email: "root@localhost".into(),
        };
        assert_eq!(svc.ensure_admin(&admin).await.unwrap(), subject);
        assert_eq!(
            svc.users.capability(&subject).await.unwrap(),
            Some(Capability::Administrator)
        );
    }

    #[test]
    fn session_cookie_attributes() {
        let svc = services();
        let signed = svc.tokens.issue(&"u1".into(), "alice").unwrap();
        let cookie = svc.session_cookie(&signed);

        assert_eq!(cookie.name(), TOKEN_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::hours(1)));
        assert_eq!(cookie.secure(), Some(false));
    }
}
