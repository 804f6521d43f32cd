//! Read interface onto whatever owns posts and comments.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use inkwell_core::SubjectId;

use crate::StoreError;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Post,
    Comment,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Comment => "comment",
        }
    }
}

/// Reference to a resource by kind and raw identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub id: String,
}

impl ResourceRef {
    pub fn post(id: impl Into<String>) -> Self {
        Self { kind: ResourceKind::Post, id: id.into() }
    }

    pub fn comment(id: impl Into<String>) -> Self {
        Self { kind: ResourceKind::Comment, id: id.into() }
    }
}

impl core::fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.kind.as_str(), self.id)
    }
}

/// Who owns a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceOwnership {
    pub resource: ResourceRef,
    pub owner: SubjectId,
}

/// Narrow read view of the resource store.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Owner of the resource, or `None` if it does not exist.
    async fn owner_of(&self, resource: &ResourceRef) -> Result<Option<ResourceOwnership>, StoreError>;
}

#[async_trait]
impl<S> ResourceStore for Arc<S>
where
    S: ResourceStore + ?Sized,
{
    async fn owner_of(&self, resource: &ResourceRef) -> Result<Option<ResourceOwnership>, StoreError> {
        (**self).owner_of(resource).await
    }
}
