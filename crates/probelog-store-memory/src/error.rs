//! Error type for `probelog-store-memory`.
//!
//! The backend itself cannot fail — every error originates from input
//! validation in `probelog-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] probelog_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
