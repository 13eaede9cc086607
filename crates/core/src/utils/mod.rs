//! Shared helpers for the core engine

pub mod validation;

pub use validation::validate_domain;
