//! Common utilities for jadeite
//!
//! This crate provides the shared error type used across all jadeite crates.

pub mod error;

pub use error::{JadeiteError, Result};
