use chrono::{DateTime, Utc};
use serde::Serialize;

use inkwell_core::SubjectId;

/// An authenticated subject.
///
/// Only [`crate::TokenService`] can build one, and only after a token has
/// passed every verification step. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    subject_id: SubjectId,
    display_name: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Identity {
    pub(crate) fn new(
        subject_id: SubjectId,
        display_name: String,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            subject_id,
            display_name,
            issued_at,
            expires_at,
        }
    }

    pub fn subject_id(&self) -> &SubjectId {
        &self.subject_id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}
