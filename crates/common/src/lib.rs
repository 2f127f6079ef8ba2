//! Common types shared across the roster service crates.

#![warn(clippy::pedantic)]

/// Module for user identity types (ids and handles)
pub mod types;

/// Module for secret types that prevent accidental logging
pub mod secret;
