//! Core types and trait definitions for the Probelog detection store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod detection;
pub mod domain;
pub mod error;
pub mod store;

pub use error::{Error, Result};
