//! Database models for TaskWarden
//!
//! This module contains all database models and their CRUD operations.
//!
//! # Models
//!
//! - `user`: User accounts and credential verification
//! - `role`: The role registry and role seeding
//! - `task`: Tasks, in both the shared and per-owner collections

pub mod role;
pub mod task;
pub mod user;
