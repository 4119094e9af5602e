//! Database access layer.
//!
//! This module provides MongoDB access:
//! - Connection string building and bounded-timeout connection
//! - Scoped sessions that always shut the client down
//! - The `MongoAdmin` trait the dispatcher runs against

pub mod admin;
pub mod connection;

pub use admin::MongoAdmin;
pub use connection::{APP_NAME, MongoSession, with_session};
