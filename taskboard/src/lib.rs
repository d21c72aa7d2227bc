//! Taskboard: terminal Kanban board backed by the Taskboard REST server.

pub mod api;
pub mod app;
pub mod board;
pub mod config;
pub mod drag;
pub mod net;
pub mod prompt;
pub mod ui;
