//! [`SqliteStore`] — the SQLite implementation of [`DetectionStore`].

use std::path::Path;

use chrono::Utc;

use probelog_core::{
  detection::{Detection, NewDetection},
  domain::extract_domain,
  store::{DetectionQuery, DetectionStats, DetectionStore},
};

use crate::{
  Error, Result,
  encode::{RawDetection, encode_dt},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Probelog detection store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a SELECT over the detections table and decode the rows.
  async fn select_detections(
    &self,
    needle: String,
    limit: i64,
  ) -> Result<Vec<Detection>> {
    let raws: Vec<RawDetection> = self
      .conn
      .call(move |conn| Ok(query_detections(conn, &needle, limit)?))
      .await?;

    raws.into_iter().map(RawDetection::into_detection).collect()
  }
}

/// Shared SELECT over the detections table.
///
/// `needle` of `""` matches every row; `limit` of `-1` is SQLite's
/// "no limit".
fn query_detections(
  conn: &rusqlite::Connection,
  needle: &str,
  limit: i64,
) -> rusqlite::Result<Vec<RawDetection>> {
  let mut stmt = conn.prepare(
    "SELECT id, url, domain, timestamp, method,
            script_url, detection_method
     FROM fingerprinting_detections
     WHERE (?1 = '' OR instr(domain, ?1) > 0)
     ORDER BY timestamp DESC, id DESC
     LIMIT ?2",
  )?;

  stmt
    .query_map(rusqlite::params![needle, limit], |row| {
      Ok(RawDetection {
        id:               row.get(0)?,
        url:              row.get(1)?,
        domain:           row.get(2)?,
        timestamp:        row.get(3)?,
        method:           row.get(4)?,
        script_url:       row.get(5)?,
        detection_method: row.get(6)?,
      })
    })?
    .collect()
}

// ─── DetectionStore impl ─────────────────────────────────────────────────────

impl DetectionStore for SqliteStore {
  type Error = Error;

  async fn record_detection(&self, input: NewDetection) -> Result<Detection> {
    input.validate()?;
    let domain = extract_domain(&input.url)?;
    let timestamp = input.timestamp.unwrap_or_else(Utc::now);

    let detection = Detection {
      // Placeholder; replaced with the rowid below.
      id: 0,
      url: input.url,
      domain,
      timestamp,
      method: input.method,
      script_url: input.script_url,
      detection_method: input.detection_method,
    };

    let url_str = detection.url.clone();
    let domain_str = detection.domain.clone();
    let ts_str = encode_dt(detection.timestamp);
    let method_str = detection.method.clone();
    let script_url = detection.script_url.clone();
    let detection_method = detection.detection_method.clone();

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO fingerprinting_detections (
             url, domain, timestamp, method, script_url, detection_method
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            url_str,
            domain_str,
            ts_str,
            method_str,
            script_url,
            detection_method,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Detection { id, ..detection })
  }

  async fn list_detections(
    &self,
    query: &DetectionQuery,
  ) -> Result<Vec<Detection>> {
    let needle = query.domain_contains.clone().unwrap_or_default();
    let limit = query.limit.map_or(-1, |n| n as i64);
    self.select_detections(needle, limit).await
  }

  async fn clear_detections(&self) -> Result<u64> {
    let deleted = self
      .conn
      .call(|conn| {
        let n = conn.execute("DELETE FROM fingerprinting_detections", [])?;
        Ok(n)
      })
      .await?;
    Ok(deleted as u64)
  }

  async fn stats(&self) -> Result<DetectionStats> {
    // Counts, distinct domains, and the recent rows are read in one call;
    // calls run serially on the connection thread, so a concurrent write
    // cannot land between them and skew the snapshot.
    let (total, unique, domains, raws): (u64, u64, Vec<String>, Vec<RawDetection>) =
      self
        .conn
        .call(|conn| {
          let (total, unique): (u64, u64) = conn.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT domain)
             FROM fingerprinting_detections",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
          )?;

          let mut stmt = conn.prepare(
            "SELECT DISTINCT domain FROM fingerprinting_detections
             ORDER BY domain",
          )?;
          let domains = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;

          let raws = query_detections(conn, "", 5)?;

          Ok((total, unique, domains, raws))
        })
        .await?;

    let recent = raws
      .into_iter()
      .map(RawDetection::into_detection)
      .collect::<Result<_>>()?;

    Ok(DetectionStats {
      total_detections:  total,
      unique_domains:    unique,
      recent_detections: recent,
      domains,
    })
  }
}
