//! Actor that owns the roster.
//!
//! ```text
//! RosterManagerActor (singleton per process)
//! ├── owns Roster (main list, waitlist, event config)
//! └── owns AdminRegistry (seed super-admins, super-admins, admins)
//! ```
//!
//! Every transport task holds a cloned `RosterManagerHandle` and talks to the
//! actor through a `tokio::sync::mpsc` mailbox with `oneshot` replies.
//!
//! # Modules
//!
//! - [`manager`] - `RosterManagerActor` and its handle
//! - [`messages`] - Message types for actor communication

pub mod manager;
pub mod messages;

pub use manager::{ManagerSettings, RosterManagerActor, RosterManagerHandle};
pub use messages::RosterMessage;
