//! FindMyStuff Backend service

#![deny(clippy::all, clippy::pedantic, clippy::nursery, dead_code)]

/// Upload validation and object naming
pub mod item_upload;

/// Object storage for item images
pub mod media_storage;

/// HTML rendering of item pages
pub mod pages;

/// Password hashing
pub mod password;

/// HTTP handlers
pub mod routes;

/// Router assembly and server lifecycle
pub mod server;

/// Configuration, errors and extractors
pub mod types;
