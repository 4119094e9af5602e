//! mlongo library
//!
//! Inspect and manage MongoDB index and collection metadata: list databases,
//! collections and indexes, create a single-field index, drop an index.

pub mod app;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod tools;

pub use config::Config;
pub use error::DbError;

/// Crate version reported by `-version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
