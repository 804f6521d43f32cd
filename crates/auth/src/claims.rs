use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AuthError;

/// Claims carried by an access token.
///
/// Timestamps are whole seconds since the Unix epoch, as registered JWT
/// claims expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject identifier.
    pub sub: String,

    /// Display name at issue time.
    #[serde(default)]
    pub username: String,

    /// Issued-at, seconds since epoch.
    pub iat: i64,

    /// Expiry, seconds since epoch.
    pub exp: i64,
}

impl TokenClaims {
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// Deterministically validate decoded claims against `now`.
///
/// This checks the *claims* only; signature and algorithm checks happen
/// before decoding in [`crate::TokenService`]. A lapsed `exp` reports
/// `Expired` even when the issue window is also inverted.
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), AuthError> {
    if claims.sub.is_empty() {
        return Err(AuthError::MalformedToken);
    }
    if now.timestamp() >= claims.exp {
        return Err(AuthError::Expired);
    }
    if claims.exp <= claims.iat {
        return Err(AuthError::MalformedToken);
    }
    Ok(())
}
