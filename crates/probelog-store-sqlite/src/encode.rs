//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, which sort lexicographically in
//! timestamp order for a fixed (UTC) offset — `ORDER BY timestamp` on the
//! column is chronological.

use chrono::{DateTime, Utc};
use probelog_core::detection::Detection;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Raw values read directly from a `fingerprinting_detections` row.
pub struct RawDetection {
  pub id:               i64,
  pub url:              String,
  pub domain:           String,
  pub timestamp:        String,
  pub method:           String,
  pub script_url:       Option<String>,
  pub detection_method: Option<String>,
}

impl RawDetection {
  pub fn into_detection(self) -> Result<Detection> {
    Ok(Detection {
      id:               self.id,
      url:              self.url,
      domain:           self.domain,
      timestamp:        decode_dt(&self.timestamp)?,
      method:           self.method,
      script_url:       self.script_url,
      detection_method: self.detection_method,
    })
  }
}
