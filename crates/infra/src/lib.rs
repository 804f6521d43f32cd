//! Infrastructure layer: in-memory stores backing the auth collaborators.

pub mod error;
pub mod store;

pub use error::{InfraError, InfraResult};
pub use store::{
    InMemoryContentStore, InMemoryUserStore, NewUser, ProfileUpdate, UserProfile, UserRecord,
};
