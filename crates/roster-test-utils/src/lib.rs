//! # Roster Test Utilities
//!
//! Mocks and fixtures for testing the roster service without a database.
//!
//! ## Modules
//!
//! - `mock_store` - `AdminStore` mock with call counters and failure injection
//! - `fixtures` - Callers, members and a ready-to-use manager harness
//!
//! ## Usage
//!
//! ```rust,ignore
//! use roster_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let store = MockAdminStore::failing();
//!     let harness = TestRoster::builder()
//!         .capacity(2)
//!         .super_admin("boss")
//!         .store(store.clone())
//!         .spawn()
//!         .await;
//!
//!     let alice = TestCaller::new(1, "alice");
//!     let reply = harness.send(&alice, "/join").await;
//!     assert_eq!(store.upsert_calls(), 0);
//! }
//! ```

pub mod fixtures;
pub mod mock_store;

// Re-export commonly used items
pub use fixtures::*;
pub use mock_store::*;
