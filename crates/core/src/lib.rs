//! `inkwell-core` — domain building blocks for the blog.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod content;
pub mod error;
pub mod id;

pub use content::{Comment, CommentDraft, Post, PostDraft, PostUpdate};
pub use error::{DomainError, DomainResult};
pub use id::{CommentId, PostId, SubjectId};
