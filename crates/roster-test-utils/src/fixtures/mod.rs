//! Pre-configured test data fixtures for roster testing.
//!
//! Provides:
//! - Callers with and without handles
//! - A manager + dispatcher harness wired to a `MockAdminStore`

use crate::mock_store::MockAdminStore;
use common::types::{Handle, UserId};
use roster_service::actors::{ManagerSettings, RosterManagerActor, RosterManagerHandle};
use roster_service::auth::SuperAdminSeed;
use roster_service::commands::{Caller, CommandDispatcher};
use roster_service::roster::EventConfig;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Test caller fixture.
#[derive(Debug, Clone)]
pub struct TestCaller {
    /// Platform user ID.
    pub id: i64,
    /// Handle without `@`, if any.
    pub handle: Option<String>,
    /// Display name.
    pub name: String,
}

impl TestCaller {
    /// Create a caller with a handle; the display name is derived from it.
    #[must_use]
    pub fn new(id: i64, handle: &str) -> Self {
        Self {
            id,
            handle: Some(handle.trim_start_matches('@').to_string()),
            name: format!("Player {id}"),
        }
    }

    /// Create a caller without a platform handle.
    #[must_use]
    pub fn anonymous(id: i64) -> Self {
        Self {
            id,
            handle: None,
            name: format!("Player {id}"),
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        UserId(self.id)
    }

    /// The parsed handle, if any.
    ///
    /// # Panics
    ///
    /// Panics if the fixture handle is not valid.
    #[must_use]
    pub fn parsed_handle(&self) -> Option<Handle> {
        self.handle
            .as_deref()
            .map(|h| Handle::parse(h).expect("fixture handle must be valid"))
    }

    /// Build the `Caller` the dispatcher expects.
    #[must_use]
    pub fn caller(&self) -> Caller {
        Caller {
            id: self.user_id(),
            display_name: self.name.clone(),
            handle: self.parsed_handle(),
        }
    }
}

/// A running roster manager with a dispatcher in front of it.
pub struct TestRoster {
    pub handle: RosterManagerHandle,
    pub dispatcher: Arc<CommandDispatcher>,
    pub store: MockAdminStore,
    pub task: JoinHandle<()>,
    pub cancel_token: CancellationToken,
}

impl TestRoster {
    #[must_use]
    pub fn builder() -> TestRosterBuilder {
        TestRosterBuilder::default()
    }

    /// Send one message as `caller` and return the reply.
    pub async fn send(&self, caller: &TestCaller, text: &str) -> String {
        self.dispatcher.handle(&caller.caller(), text).await
    }

    /// Cancel the manager and wait for the actor task to finish.
    ///
    /// # Panics
    ///
    /// Panics if the actor task panicked.
    pub async fn shutdown(self) {
        self.cancel_token.cancel();
        self.task.await.expect("actor task should exit cleanly");
    }
}

/// Builder for [`TestRoster`].
#[derive(Debug, Default)]
pub struct TestRosterBuilder {
    event: EventConfig,
    seed: SuperAdminSeed,
    store: Option<MockAdminStore>,
}

impl TestRosterBuilder {
    #[must_use]
    pub fn capacity(mut self, capacity: u32) -> Self {
        self.event.capacity = capacity;
        self
    }

    /// Add a seed super-admin handle.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is not valid.
    #[must_use]
    pub fn super_admin(mut self, handle: &str) -> Self {
        self.seed
            .handles
            .insert(Handle::parse(handle).expect("fixture handle must be valid"));
        self
    }

    /// Add a seed super-admin user id.
    #[must_use]
    pub fn super_admin_id(mut self, id: i64) -> Self {
        self.seed.ids.insert(UserId(id));
        self
    }

    /// Use a specific store (default: empty healthy `MockAdminStore`).
    #[must_use]
    pub fn store(mut self, store: MockAdminStore) -> Self {
        self.store = Some(store);
        self
    }

    pub async fn spawn(self) -> TestRoster {
        let store = self.store.unwrap_or_default();
        let cancel_token = CancellationToken::new();
        let settings = ManagerSettings {
            event: self.event,
            seed: self.seed,
        };

        let (handle, task) =
            RosterManagerActor::spawn(settings, Arc::new(store.clone()), cancel_token.clone())
                .await;

        TestRoster {
            dispatcher: Arc::new(CommandDispatcher::new(handle.clone())),
            handle,
            store,
            task,
            cancel_token,
        }
    }
}
