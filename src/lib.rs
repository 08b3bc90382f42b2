// ABOUTME: Library root for flotilla - release reconciliation with rollback.
// ABOUTME: The main binary is in main.rs.

pub mod backend;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod reconcile;
pub mod source;
pub mod store;
pub mod types;
