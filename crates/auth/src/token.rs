//! Issuing and verifying HMAC-signed access tokens (JWS compact form).

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind,
};
use serde::Deserialize;

use inkwell_core::SubjectId;

use crate::{AuthError, Identity, TokenClaims, validate_claims};

/// Algorithm used for every token this service issues.
pub const ISSUE_ALGORITHM: Algorithm = Algorithm::HS256;

/// HMAC algorithms accepted on verification.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Default token lifetime, in seconds.
pub const DEFAULT_TTL_SECS: i64 = 60 * 60;

/// Process-wide HMAC secret. Never empty.
#[derive(Clone)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    pub fn from_secret(secret: impl AsRef<[u8]>) -> Result<Self, AuthError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(AuthError::SigningFailure("signing secret is empty".to_string()));
        }
        Ok(Self(secret.to_vec()))
    }
}

impl core::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

/// A freshly issued token plus the window it is valid for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedToken {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Token validation contract (consumed by the HTTP middleware).
pub trait TokenVerifier: Send + Sync {
    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, AuthError>;

    fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        self.verify_at(token, Utc::now())
    }
}

/// Issues and verifies access tokens with a single process-wide key.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl core::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &ISSUE_ALGORITHM)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenService {
    pub fn new(key: &SigningKey) -> Self {
        Self {
            encoding: EncodingKey::from_secret(&key.0),
            decoding: DecodingKey::from_secret(&key.0),
            ttl: Duration::seconds(DEFAULT_TTL_SECS),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, subject_id: &SubjectId, display_name: &str) -> Result<SignedToken, AuthError> {
        self.issue_at(subject_id, display_name, Utc::now())
    }

    /// Issue a token as of `now`.
    pub fn issue_at(
        &self,
        subject_id: &SubjectId,
        display_name: &str,
        now: DateTime<Utc>,
    ) -> Result<SignedToken, AuthError> {
        // Claims carry whole seconds; truncate so the returned window matches them.
        let issued_at = DateTime::from_timestamp(now.timestamp(), 0)
            .ok_or_else(|| AuthError::SigningFailure("issue time out of range".to_string()))?;
        let expires_at = issued_at + self.ttl;

        let claims = TokenClaims {
            sub: subject_id.as_str().to_string(),
            username: display_name.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = jsonwebtoken::encode(&Header::new(ISSUE_ALGORITHM), &claims, &self.encoding)
            .map_err(|e| AuthError::SigningFailure(e.to_string()))?;

        Ok(SignedToken {
            token,
            issued_at,
            expires_at,
        })
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(ISSUE_ALGORITHM);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        // Expiry is checked by `validate_claims` against the caller's clock.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }
}

impl TokenVerifier for TokenService {
    /// Verify a compact token as of `now`.
    ///
    /// Order: structure, algorithm family, signature, claims, expiry.
    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, AuthError> {
        let alg = header_algorithm(token)?;
        if !matches!(alg.as_str(), "HS256" | "HS384" | "HS512") {
            return Err(AuthError::UnexpectedAlgorithm);
        }

        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &Self::validation())
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                    AuthError::UnexpectedAlgorithm
                }
                _ => AuthError::MalformedToken,
            })?;

        let claims = data.claims;
        validate_claims(&claims, now)?;

        let issued_at = claims.issued_at().ok_or(AuthError::MalformedToken)?;
        let expires_at = claims.expires_at().ok_or(AuthError::MalformedToken)?;

        Ok(Identity::new(
            SubjectId::new(claims.sub),
            claims.username,
            issued_at,
            expires_at,
        ))
    }
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// Read the `alg` field of a compact token's header without trusting it.
///
/// Parsed by hand so that algorithms the JWT library cannot represent
/// (notably `none`) are reported as algorithm failures, not as garbage.
fn header_algorithm(token: &str) -> Result<String, AuthError> {
    let mut segments = token.split('.');
    let (Some(header), Some(_payload), Some(_signature), None) =
        (segments.next(), segments.next(), segments.next(), segments.next())
    else {
        return Err(AuthError::MalformedToken);
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| AuthError::MalformedToken)?;
    let raw: RawHeader = serde_json::from_slice(&bytes).map_err(|_| AuthError::MalformedToken)?;
    Ok(raw.alg)
}
