//! Port abstraction for registered-user storage adapters and their errors.
use async_trait::async_trait;

use crate::domain::UserRecord;

use super::define_port_error;

define_port_error! {
    /// Errors raised by user store adapters.
    pub enum UserStoreError {
        /// The backing store could not be reached.
        Connection { message: String } => "user store connection failed: {message}",
        /// The write was refused or did not complete.
        Write { message: String } => "user store write failed: {message}",
        /// Records could not be read back.
        Read { message: String } => "user store read failed: {message}",
    }
}

/// Storage collaborator for registered users.
///
/// Each `save` is independent and atomic from the caller's point of view.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a newly registered user.
    async fn save(&self, record: UserRecord) -> Result<(), UserStoreError>;

    /// Every stored record in insertion order.
    async fn list_all(&self) -> Result<Vec<UserRecord>, UserStoreError>;
}
