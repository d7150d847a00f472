//! Costura - marketplace backend connecting dressmakers with customers
//!
//! - Dressmaker and user accounts with JWT sessions and SMS phone verification
//! - Discovery by distance, by service keyword, or both, with pagination
//! - Reviews that regrade a dressmaker atomically
//! - Subscriptions paid through a hosted checkout and confirmed by webhook
//!
//! Storage is PostgreSQL/PostGIS, Google Cloud Firestore, or an in-process
//! memory store for tests, selected by `database.backend`.

#![forbid(unsafe_code)]

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod integrations;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use state::AppState;
