//! Taskboard server library.
//!
//! Exposes the task store, the REST router and its auth gate for use in
//! tests and embedding.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod store;
