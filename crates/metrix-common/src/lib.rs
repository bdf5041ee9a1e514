//! Metrix Common - Shared types and utilities
//!
//! This crate provides the index record type, name validation, error
//! definitions and configuration used across all Metrix components.

pub mod config;
pub mod error;
pub mod types;

pub use config::{IndexStoreConfig, LoadPolicy};
pub use error::{Error, Result};
pub use types::*;
