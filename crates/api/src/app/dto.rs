use serde::{Deserialize, Serialize};

use inkwell_auth::SignedToken;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub bio: Option<String>,
    #[serde(alias = "profilePicUrl")]
    pub profile_pic_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub content: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    pub limit: Option<usize>,
    pub skip: Option<usize>,
}

impl Pagination {
    pub const DEFAULT_LIMIT: usize = 10;
    pub const MAX_LIMIT: usize = 100;

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT).min(Self::MAX_LIMIT)
    }

    pub fn skip(&self) -> usize {
        self.skip.unwrap_or(0)
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    /// Expiry, seconds since epoch.
    pub expires_at: i64,
}

impl From<&SignedToken> for TokenResponse {
    fn from(signed: &SignedToken) -> Self {
        Self {
            token: signed.token.clone(),
            expires_at: signed.expires_at.timestamp(),
        }
    }
}
