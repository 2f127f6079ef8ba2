//! External admin store.
//!
//! The store keeps the plain admin handles across restarts. It is a
//! best-effort durability aid: the manager loads it once at startup and
//! mirrors grants/revokes to it after the in-memory change, logging and
//! swallowing any failure.
//!
//! - [`postgres`] - `PgAdminStore` backed by the `admin_users` table
//! - [`memory`] - `InMemoryAdminStore` for runs without a database

pub mod memory;
pub mod postgres;

pub use memory::InMemoryAdminStore;
pub use postgres::PgAdminStore;

use crate::errors::RosterError;
use common::types::Handle;

/// Trait for admin store operations (enables mocking).
#[async_trait::async_trait]
pub trait AdminStore: Send + Sync {
    /// All stored admin handles.
    async fn load_all(&self) -> Result<Vec<Handle>, RosterError>;

    /// Insert a handle; inserting an existing handle is not an error.
    async fn upsert(&self, handle: &Handle) -> Result<(), RosterError>;

    /// Delete a handle; deleting a missing handle is not an error.
    async fn remove(&self, handle: &Handle) -> Result<(), RosterError>;
}
