//! In-process backend for the Probelog detection store.
//!
//! Volatile by design: nothing survives a restart. Intended for demos and
//! tests, and as the reference implementation of the
//! [`DetectionStore`](probelog_core::store::DetectionStore) contract.

mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::MemoryStore;
