use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use inkwell_auth::{Capability, Credential, CredentialStore, StoreError};
use inkwell_core::{DomainError, SubjectId};

use super::{read, write};
use crate::InfraResult;

/// Full user row, including the password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub subject_id: SubjectId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub capability: Capability,
    pub bio: Option<String>,
    pub profile_pic_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.subject_id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            bio: self.bio.clone(),
            profile_pic_url: self.profile_pic_url.clone(),
            is_admin: self.capability.is_admin(),
            created_at: self.created_at,
        }
    }

    fn credential(&self) -> Credential {
        Credential {
            subject_id: self.subject_id.clone(),
            username: self.username.clone(),
            password_hash: self.password_hash.clone(),
            capability: self.capability,
        }
    }
}

/// Public view of a user (never carries the hash).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: SubjectId,
    pub username: String,
    pub email: String,
    pub bio: Option<String>,
    pub profile_pic_url: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Registration input. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub capability: Capability,
}

/// Profile fields a user may change about themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub bio: Option<String>,
    pub profile_pic_url: Option<String>,
}

#[derive(Debug, Default)]
struct UserTable {
    by_id: HashMap<SubjectId, UserRecord>,
    by_username: HashMap<String, SubjectId>,
}

/// In-memory user store; also the credential store for login and admin checks.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<UserTable>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new user. Usernames are unique (exact match).
    pub fn register(&self, new: NewUser, now: DateTime<Utc>) -> InfraResult<UserRecord> {
        let username = new.username.trim().to_string();
        if username.is_empty() {
            return Err(DomainError::validation("username must not be blank").into());
        }
        if new.email.trim().is_empty() {
            return Err(DomainError::validation("email must not be blank").into());
        }

        let mut table = write(&self.inner, "user store")?;
        if table.by_username.contains_key(&username) {
            return Err(DomainError::conflict(format!("username '{username}' already exists")).into());
        }

        let record = UserRecord {
            subject_id: SubjectId::generate(),
            username: username.clone(),
            email: new.email.trim().to_string(),
            password_hash: new.password_hash,
            capability: new.capability,
            bio: None,
            profile_pic_url: None,
            created_at: now,
            updated_at: now,
        };

        table.by_username.insert(username, record.subject_id.clone());
        table.by_id.insert(record.subject_id.clone(), record.clone());

        tracing::info!(subject_id = %record.subject_id, capability = %record.capability, "user registered");
        Ok(record)
    }

    pub fn get(&self, subject_id: &SubjectId) -> InfraResult<UserRecord> {
        let table = read(&self.inner, "user store")?;
        table
            .by_id
            .get(subject_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("user").into())
    }

    pub fn find_by_username(&self, username: &str) -> InfraResult<Option<UserRecord>> {
        let table = read(&self.inner, "user store")?;
        Ok(table
            .by_username
            .get(username)
            .and_then(|id| table.by_id.get(id))
            .cloned())
    }

    /// All users, oldest first.
    pub fn list(&self) -> InfraResult<Vec<UserProfile>> {
        let table = read(&self.inner, "user store")?;
        let mut users: Vec<UserProfile> = table.by_id.values().map(UserRecord::profile).collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.username.cmp(&b.username)));
        Ok(users)
    }

    /// Overwrite the fields present in `update`.
    pub fn update_profile(
        &self,
        subject_id: &SubjectId,
        update: ProfileUpdate,
        now: DateTime<Utc>,
    ) -> InfraResult<UserRecord> {
        let mut table = write(&self.inner, "user store")?;
        let record = table
            .by_id
            .get_mut(subject_id)
            .ok_or_else(|| DomainError::not_found("user"))?;

        if let Some(bio) = update.bio {
            record.bio = Some(bio);
        }
        if let Some(url) = update.profile_pic_url {
            record.profile_pic_url = Some(url);
        }
        record.updated_at = now;
        Ok(record.clone())
    }

    pub fn grant_capability(&self, subject_id: &SubjectId, capability: Capability) -> InfraResult<()> {
        let mut table = write(&self.inner, "user store")?;
        let record = table
            .by_id
            .get_mut(subject_id)
            .ok_or_else(|| DomainError::not_found("user"))?;
        record.capability = capability;

        tracing::info!(%subject_id, %capability, "capability granted");
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for InMemoryUserStore {
    async fn credential_by_username(&self, username: &str) -> Result<Option<Credential>, StoreError> {
        let table = read(&self.inner, "user store")?;
        Ok(table
            .by_username
            .get(username)
            .and_then(|id| table.by_id.get(id))
            .map(UserRecord::credential))
    }

    async fn capability(&self, subject_id: &SubjectId) -> Result<Option<Capability>, StoreError> {
        let table = read(&self.inner, "user store")?;
        Ok(table.by_id.get(subject_id).map(|r| r.capability))
    }
}
