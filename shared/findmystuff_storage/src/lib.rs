//! Persistent stores for FindMyStuff
//!
//! This crate holds the Dynamo DB backed credential store (users) and item catalog
//! used by the backend, together with in-memory doubles for tests.

pub mod item;
pub mod user;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
