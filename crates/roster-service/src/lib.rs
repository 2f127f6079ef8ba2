//! Roster Service Library
//!
//! Core of a chat-driven event roster: a capacity-bounded main list with a
//! FIFO waitlist, shared event details, and a two-tier admin model.
//!
//! # Architecture
//!
//! ```text
//! transport (console, chat bot)
//! └── CommandDispatcher (parses text, gates privileged commands)
//!     └── RosterManagerHandle
//!         └── RosterManagerActor (single owner of Roster + AdminRegistry)
//!
//! AdminStore (Postgres or in-memory) <- grant/revoke mirrored after the actor replies
//! ```
//!
//! # Modules
//!
//! - [`actors`] - Roster manager actor and its handle
//! - [`auth`] - Admin and super-admin registry
//! - [`commands`] - Chat command parsing and dispatch
//! - [`config`] - Service configuration from environment
//! - [`console`] - Line-oriented stdin/stdout transport
//! - [`errors`] - Error types
//! - [`roster`] - Main list / waitlist state machine
//! - [`store`] - Admin persistence

pub mod actors;
pub mod auth;
pub mod commands;
pub mod config;
pub mod console;
pub mod errors;
pub mod roster;
pub mod store;
