//! Error types for `probelog-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A required field was absent or empty.
  #[error("missing required field: {0}")]
  MissingField(&'static str),

  #[error("field {field} exceeds {max} characters")]
  FieldTooLong { field: &'static str, max: usize },

  /// The page URL could not be parsed, or parsed without a host.
  #[error("invalid url: {0}")]
  InvalidUrl(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
