use std::sync::Arc;

use axum::http::Extensions;
use thiserror::Error;

use inkwell_auth::Identity;
use inkwell_core::SubjectId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("request already carries an authenticated identity")]
    AlreadyBound,
}

/// Authenticated identity for a request.
///
/// Bound once by the auth middleware; handlers read it through
/// `Extension<AuthContext>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    identity: Arc<Identity>,
}

impl AuthContext {
    /// Attach `identity` to a request. Refuses to overwrite an existing one.
    pub fn bind(extensions: &mut Extensions, identity: Identity) -> Result<(), ContextError> {
        if extensions.get::<AuthContext>().is_some() {
            return Err(ContextError::AlreadyBound);
        }
        extensions.insert(AuthContext {
            identity: Arc::new(identity),
        });
        Ok(())
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn subject_id(&self) -> &SubjectId {
        self.identity.subject_id()
    }

    pub fn display_name(&self) -> &str {
        self.identity.display_name()
    }
}
