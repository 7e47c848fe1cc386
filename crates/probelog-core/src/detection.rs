//! Detection — one recorded instance of a script attempting a fingerprinting
//! technique.
//!
//! Detections are immutable once recorded: the store exposes insert, bulk
//! list, bulk delete, and aggregate statistics, but no update and no
//! per-record delete.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Maximum length of `url` and `script_url`.
pub const MAX_URL_LEN: usize = 2048;
/// Maximum length of the derived `domain`.
pub const MAX_DOMAIN_LEN: usize = 255;
/// Maximum length of `method` and `detection_method`.
pub const MAX_METHOD_LEN: usize = 50;

// ─── Stored record ───────────────────────────────────────────────────────────

/// A persisted fingerprinting detection, as returned by every read path.
///
/// `id` is assigned by the store on insert and is unique and monotonic for
/// the life of the store. `domain` is always derived from `url`; it is never
/// supplied by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
  pub id:               i64,
  pub url:              String,
  pub domain:           String,
  pub timestamp:        DateTime<Utc>,
  pub method:           String,
  pub script_url:       Option<String>,
  pub detection_method: Option<String>,
}

// ─── Insert input ────────────────────────────────────────────────────────────

/// Input for [`DetectionStore::record_detection`](crate::store::DetectionStore).
///
/// `domain` is intentionally absent — stores derive it from `url` via
/// [`crate::domain::extract_domain`]. A `None` timestamp means "now, as seen
/// by the store".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDetection {
  pub url:              String,
  pub method:           String,
  pub script_url:       Option<String>,
  pub detection_method: Option<String>,
  pub timestamp:        Option<DateTime<Utc>>,
}

impl NewDetection {
  pub fn new(url: impl Into<String>, method: impl Into<String>) -> Self {
    Self {
      url:              url.into(),
      method:           method.into(),
      script_url:       None,
      detection_method: None,
      timestamp:        None,
    }
  }

  /// Check required fields and length caps.
  ///
  /// Stores call this before insert, so malformed input is rejected rather
  /// than silently degraded.
  pub fn validate(&self) -> Result<()> {
    if self.url.trim().is_empty() {
      return Err(Error::MissingField("url"));
    }
    if self.method.trim().is_empty() {
      return Err(Error::MissingField("method"));
    }

    check_len("url", &self.url, MAX_URL_LEN)?;
    check_len("method", &self.method, MAX_METHOD_LEN)?;
    if let Some(s) = &self.script_url {
      check_len("script_url", s, MAX_URL_LEN)?;
    }
    if let Some(s) = &self.detection_method {
      check_len("detection_method", s, MAX_METHOD_LEN)?;
    }
    Ok(())
  }
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<()> {
  if value.chars().count() > max {
    return Err(Error::FieldTooLong { field, max });
  }
  Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
