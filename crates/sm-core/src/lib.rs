//! # sm-core
//!
//! Core types, traits, and utilities for Sew4Mi.
//!
//! This crate provides the foundational building blocks used across all other crates:
//! - Common error types
//! - Result type aliases and the service result pattern
//! - Core traits (Entity, Identifiable, Timestamped, Contract)
//! - Money and currency types
//! - Configuration types

pub mod error;
pub mod result;
pub mod traits;
pub mod types;
pub mod config;

pub use error::*;
pub use result::*;
pub use traits::*;
pub use types::*;
