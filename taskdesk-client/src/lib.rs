//! # TaskDesk Client Library
//!
//! Client-side data and session layer for the TaskDesk task service.
//!
//! ## Modules
//!
//! - `config`: Configuration management
//! - `error`: Error taxonomy and server error normalization
//! - `api`: HTTP client for the task service (bearer token injection)
//! - `auth`: Sign-in/sign-up/sign-out over the API client and Session Store
//! - `repository`: Typed task operations
//! - `view_model`: Task collection state, filtering and refetch-after-mutation
//! - `notification`: Transient user notifications
//! - `presentation`: Text rendering used by the `taskdesk` binary

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod notification;
pub mod presentation;
pub mod repository;
pub mod view_model;
