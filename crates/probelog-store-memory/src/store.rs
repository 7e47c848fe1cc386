//! [`MemoryStore`] — the in-process implementation of [`DetectionStore`].

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use probelog_core::{
  detection::{Detection, NewDetection},
  domain::extract_domain,
  store::{DetectionQuery, DetectionStats, DetectionStore},
};

use crate::Result;

// ─── Store ───────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Inner {
  rows:    Vec<Detection>,
  /// Last id handed out. Incremented under the write lock, so concurrent
  /// writers can never observe the same value; never reset by a clear.
  next_id: i64,
}

/// A detection store held entirely in process memory.
///
/// Cloning is cheap — clones share the same collection.
#[derive(Clone, Default)]
pub struct MemoryStore {
  inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }
}

// ─── DetectionStore impl ─────────────────────────────────────────────────────

impl DetectionStore for MemoryStore {
  type Error = crate::Error;

  async fn record_detection(&self, input: NewDetection) -> Result<Detection> {
    input.validate()?;
    let domain = extract_domain(&input.url)?;
    let timestamp = input.timestamp.unwrap_or_else(Utc::now);

    let mut inner = self.inner.write().await;
    inner.next_id += 1;

    let detection = Detection {
      id: inner.next_id,
      url: input.url,
      domain,
      timestamp,
      method: input.method,
      script_url: input.script_url,
      detection_method: input.detection_method,
    };
    inner.rows.push(detection.clone());

    Ok(detection)
  }

  async fn list_detections(
    &self,
    query: &DetectionQuery,
  ) -> Result<Vec<Detection>> {
    let inner = self.inner.read().await;

    let mut rows: Vec<Detection> = inner
      .rows
      .iter()
      .filter(|d| match &query.domain_contains {
        Some(needle) => d.domain.contains(needle.as_str()),
        None => true,
      })
      .cloned()
      .collect();

    sort_newest_first(&mut rows);
    if let Some(limit) = query.limit {
      rows.truncate(limit);
    }

    Ok(rows)
  }

  async fn clear_detections(&self) -> Result<u64> {
    let mut inner = self.inner.write().await;
    let deleted = inner.rows.len() as u64;
    inner.rows.clear();
    Ok(deleted)
  }

  async fn stats(&self) -> Result<DetectionStats> {
    let inner = self.inner.read().await;

    let mut recent = inner.rows.clone();
    sort_newest_first(&mut recent);
    recent.truncate(5);

    let mut domains: Vec<String> =
      inner.rows.iter().map(|d| d.domain.clone()).collect();
    domains.sort();
    domains.dedup();

    Ok(DetectionStats {
      total_detections:  inner.rows.len() as u64,
      unique_domains:    domains.len() as u64,
      recent_detections: recent,
      domains,
    })
  }
}

/// `(timestamp, id)` descending — the same order the SQL backend produces.
fn sort_newest_first(rows: &mut [Detection]) {
  rows.sort_by(|a, b| (b.timestamp, b.id).cmp(&(a.timestamp, a.id)));
}
