//! SQL schema for the Probelog SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// `AUTOINCREMENT` keeps rowids strictly increasing across deletes, so a
/// record inserted after a full clear never reuses an old id.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS fingerprinting_detections (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    url              TEXT NOT NULL,
    domain           TEXT NOT NULL,   -- host[:port] derived from url
    timestamp        TEXT NOT NULL,   -- ISO 8601 UTC
    method           TEXT NOT NULL,
    script_url       TEXT,
    detection_method TEXT
);

CREATE INDEX IF NOT EXISTS detections_timestamp_idx
  ON fingerprinting_detections(timestamp);
CREATE INDEX IF NOT EXISTS detections_domain_idx
  ON fingerprinting_detections(domain);

PRAGMA user_version = 1;
";
