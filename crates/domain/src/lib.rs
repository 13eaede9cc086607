//! # Raito Domain
//!
//! Data model shared by the Raito client crates.
//!
//! This crate contains:
//! - The error taxonomy and Result alias
//! - Credential record and identity-provider exchange results
//! - Cursor pagination types (pages, edges, list items)
//! - Union result variants and entity models
//! - Client configuration and constants
//!
//! ## Architecture
//! - No dependencies on other Raito crates
//! - Only external dependencies allowed
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
