//! In-memory user store.
//!
//! Records live for the lifetime of the process. Nothing is written to disk,
//! so restarts lose every registration.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::UserRecord;
use crate::domain::ports::{UserStore, UserStoreError};

/// Process-local [`UserStore`] keeping records in insertion order.
///
/// # Examples
/// ```
/// use backend::domain::ports::UserStore;
/// use backend::outbound::memory::InMemoryUserStore;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let store = InMemoryUserStore::new();
/// assert!(store.list_all().await.unwrap().is_empty());
/// # });
/// ```
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    records: RwLock<Vec<UserRecord>>,
}

impl InMemoryUserStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether nothing has been stored yet.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn save(&self, record: UserRecord) -> Result<(), UserStoreError> {
        let mut records = self.records.write().await;
        records.push(record);
        debug!(stored = records.len(), "user record stored");
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<UserRecord>, UserStoreError> {
        Ok(self.records.read().await.clone())
    }
}
