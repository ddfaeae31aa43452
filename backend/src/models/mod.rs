//! Domain models for the Warehouse Stock Tracker
//!
//! Re-exports the shared ledger vocabulary used by services and handlers

pub use shared::models::*;
