//! The `taskflow` library crate.
//!
//! Server side: an actix-web REST API for user accounts and per-user task
//! CRUD, persisted in PostgreSQL through sqlx. Client side: a reqwest-based
//! session controller plus the pure list/view logic the browser UI consumes.
//! The binary in `main.rs` wires the server pieces together.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;

pub use crate::error::AppError;
