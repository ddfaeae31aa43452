//! Shared domain types for the Warehouse Stock Tracker
//!
//! This crate contains the pure ledger vocabulary (movement routes and
//! balance effect planning) used by the backend independently of any
//! storage or transport concern.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
