//! Data models for mlongo.
//!
//! This module re-exports all model types used throughout the application.

pub mod command;
pub mod index;

pub use command::Command;
pub use index::{CollectionIndexes, IndexOrder, IndexSpec, IndexSummary, default_index_name};
