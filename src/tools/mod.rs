//! Command implementations.
//!
//! This module contains:
//! - `dispatch`: runs one command against the server
//! - `format`: renders outcomes and errors for stdout

pub mod dispatch;
pub mod format;

pub use dispatch::{OperationDispatcher, Outcome};
pub use format::{format_error, format_outcome, write_error, write_outcome};
