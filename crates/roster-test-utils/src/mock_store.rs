//! In-memory `AdminStore` mock.
//!
//! Records every call and can be switched into a failing mode at any time,
//! which is how store-outage tolerance is tested.
//!
//! # Example
//!
//! ```rust,ignore
//! use roster_test_utils::MockAdminStore;
//!
//! let store = MockAdminStore::with_admins(["coach"]);
//! store.set_failing(true);
//!
//! assert!(store.upsert(&handle("alice")).await.is_err());
//! assert_eq!(store.upsert_calls(), 1);
//! ```

use common::types::Handle;
use roster_service::errors::RosterError;
use roster_service::store::AdminStore;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock admin store for testing grant/revoke mirroring.
///
/// Clones share state, so a test can keep one copy while the manager owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct MockAdminStore {
    inner: Arc<MockAdminStoreInner>,
}

#[derive(Debug, Default)]
struct MockAdminStoreInner {
    handles: Mutex<BTreeSet<Handle>>,
    failing: AtomicBool,
    delay: Mutex<Option<Duration>>,
    load_calls: AtomicUsize,
    upsert_calls: AtomicUsize,
    remove_calls: AtomicUsize,
}

impl MockAdminStore {
    /// Create an empty, healthy store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with admin handles.
    ///
    /// # Panics
    ///
    /// Panics if any entry is not a valid handle.
    #[must_use]
    pub fn with_admins<'a>(handles: impl IntoIterator<Item = &'a str>) -> Self {
        let store = Self::new();
        {
            let mut stored = store.inner.handles.lock().unwrap();
            for raw in handles {
                stored.insert(Handle::parse(raw).expect("fixture handle must be valid"));
            }
        }
        store
    }

    /// Create a store where every call fails.
    #[must_use]
    pub fn failing() -> Self {
        let store = Self::new();
        store.set_failing(true);
        store
    }

    /// Make every subsequent call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }

    /// Delay every subsequent write by `delay`.
    #[must_use]
    pub fn with_write_delay(self, delay: Duration) -> Self {
        *self.inner.delay.lock().unwrap() = Some(delay);
        self
    }

    /// Change the write delay of an existing store (`None` removes it).
    pub fn set_write_delay(&self, delay: Option<Duration>) {
        *self.inner.delay.lock().unwrap() = delay;
    }

    /// Handles currently stored, sorted.
    #[must_use]
    pub fn stored(&self) -> Vec<Handle> {
        self.inner.handles.lock().unwrap().iter().cloned().collect()
    }

    /// Whether a raw handle is stored.
    ///
    /// # Panics
    ///
    /// Panics if `raw` is not a valid handle.
    #[must_use]
    pub fn contains(&self, raw: &str) -> bool {
        let handle = Handle::parse(raw).expect("handle must be valid");
        self.inner.handles.lock().unwrap().contains(&handle)
    }

    #[must_use]
    pub fn load_calls(&self) -> usize {
        self.inner.load_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn upsert_calls(&self) -> usize {
        self.inner.upsert_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn remove_calls(&self) -> usize {
        self.inner.remove_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self, op: &str) -> Result<(), RosterError> {
        if self.inner.failing.load(Ordering::SeqCst) {
            Err(RosterError::ExternalStoreUnavailable(format!(
                "mock store {op} failure"
            )))
        } else {
            Ok(())
        }
    }

    async fn write_delay(&self) {
        let delay = *self.inner.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait::async_trait]
impl AdminStore for MockAdminStore {
    async fn load_all(&self) -> Result<Vec<Handle>, RosterError> {
        self.inner.load_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available("load")?;
        Ok(self.stored())
    }

    async fn upsert(&self, handle: &Handle) -> Result<(), RosterError> {
        self.inner.upsert_calls.fetch_add(1, Ordering::SeqCst);
        self.write_delay().await;
        self.check_available("upsert")?;
        self.inner.handles.lock().unwrap().insert(handle.clone());
        Ok(())
    }

    async fn remove(&self, handle: &Handle) -> Result<(), RosterError> {
        self.inner.remove_calls.fetch_add(1, Ordering::SeqCst);
        self.write_delay().await;
        self.check_available("remove")?;
        self.inner.handles.lock().unwrap().remove(handle);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(raw: &str) -> Handle {
        Handle::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_mock_store_records_calls() {
        let store = MockAdminStore::with_admins(["coach"]);

        assert_eq!(store.load_all().await.unwrap(), vec![handle("coach")]);
        store.upsert(&handle("alice")).await.unwrap();
        store.remove(&handle("coach")).await.unwrap();

        assert_eq!(store.load_calls(), 1);
        assert_eq!(store.upsert_calls(), 1);
        assert_eq!(store.remove_calls(), 1);
        assert_eq!(store.stored(), vec![handle("alice")]);
    }

    #[tokio::test]
    async fn test_failing_mode_leaves_state_untouched() {
        let store = MockAdminStore::with_admins(["coach"]);
        store.set_failing(true);

        assert!(matches!(
            store.upsert(&handle("alice")).await,
            Err(RosterError::ExternalStoreUnavailable(_))
        ));
        assert!(store.load_all().await.is_err());
        assert!(!store.contains("alice"));

        store.set_failing(false);
        assert!(store.contains("coach"));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MockAdminStore::new();
        let clone = store.clone();
        clone.upsert(&handle("alice")).await.unwrap();
        assert!(store.contains("@Alice"));
    }
}
