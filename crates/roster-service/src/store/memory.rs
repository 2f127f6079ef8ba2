//! Process-local admin store.
//!
//! Used when no `DATABASE_URL` is configured. Grants survive for the process
//! lifetime only.

use super::AdminStore;
use crate::errors::RosterError;
use common::types::Handle;
use std::collections::BTreeSet;
use tokio::sync::RwLock;

/// Admin store held in memory.
#[derive(Debug, Default)]
pub struct InMemoryAdminStore {
    handles: RwLock<BTreeSet<Handle>>,
}

impl InMemoryAdminStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with handles.
    pub fn with_handles(handles: impl IntoIterator<Item = Handle>) -> Self {
        Self {
            handles: RwLock::new(handles.into_iter().collect()),
        }
    }
}

#[async_trait::async_trait]
impl AdminStore for InMemoryAdminStore {
    async fn load_all(&self) -> Result<Vec<Handle>, RosterError> {
        Ok(self.handles.read().await.iter().cloned().collect())
    }

    async fn upsert(&self, handle: &Handle) -> Result<(), RosterError> {
        self.handles.write().await.insert(handle.clone());
        Ok(())
    }

    async fn remove(&self, handle: &Handle) -> Result<(), RosterError> {
        self.handles.write().await.remove(handle);
        Ok(())
    }
}
