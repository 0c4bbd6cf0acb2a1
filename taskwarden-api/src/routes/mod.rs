//! API route handlers
//!
//! Handlers are organized by resource:
//!
//! - `health`: liveness probe
//! - `auth`: registration, login, token refresh
//! - `tasks`: the shared, admin-managed task collection
//! - `my_tasks`: the per-owner task collection

pub mod auth;
pub mod health;
pub mod my_tasks;
pub mod tasks;
