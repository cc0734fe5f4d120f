//! Raya Shared Types and Utilities
//!
//! This crate contains types and database helpers shared by the Raya API and worker.

pub mod db;
pub mod types;

pub use db::*;
pub use types::*;
