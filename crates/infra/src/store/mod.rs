//! In-memory stores for tests/dev.

pub mod content;
pub mod users;

pub use content::InMemoryContentStore;
pub use users::{InMemoryUserStore, NewUser, ProfileUpdate, UserProfile, UserRecord};

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use inkwell_auth::StoreError;

pub(crate) fn read<'a, T>(lock: &'a RwLock<T>, name: &str) -> Result<RwLockReadGuard<'a, T>, StoreError> {
    lock.read()
        .map_err(|_| StoreError::unavailable(format!("{name} lock poisoned")))
}

pub(crate) fn write<'a, T>(lock: &'a RwLock<T>, name: &str) -> Result<RwLockWriteGuard<'a, T>, StoreError> {
    lock.write()
        .map_err(|_| StoreError::unavailable(format!("{name} lock poisoned")))
}
