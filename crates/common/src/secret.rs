//! Secret types for protecting sensitive values from accidental logging.
//!
//! Re-exports the [`secrecy`] types used for connection strings and any other
//! credential the roster service reads from its environment. `SecretString`
//! implements `Debug` with redaction, so a config struct that derives `Debug`
//! never prints a database password into the logs.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct StoreSettings {
//!     max_connections: u32,
//!     database_url: SecretString,
//! }
//!
//! let settings = StoreSettings {
//!     max_connections: 5,
//!     database_url: SecretString::from("postgres://roster:pw@db/roster"),
//! };
//!
//! assert!(!format!("{settings:?}").contains("pw@db"));
//! let url: &str = settings.database_url.expose_secret();
//! assert!(url.starts_with("postgres://"));
//! ```

pub use secrecy::{ExposeSecret, SecretString};
