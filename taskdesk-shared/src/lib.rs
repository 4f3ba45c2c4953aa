//! # TaskDesk Shared Library
//!
//! Types and state shared by the TaskDesk client crates.
//!
//! ## Module Organization
//!
//! - `models`: Tasks, users and the auth payloads exchanged with the task service
//! - `session`: Session Store and durable token storage

pub mod models;
pub mod session;

/// Current version of the TaskDesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
