//! The `DetectionStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (`probelog-store-sqlite`,
//! `probelog-store-memory`). Higher layers (`probelog-api`, the server
//! binary) depend on this abstraction, not on any concrete backend.

use std::future::Future;

use serde::Serialize;

use crate::detection::{Detection, NewDetection};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`DetectionStore::list_detections`].
#[derive(Debug, Clone, Default)]
pub struct DetectionQuery {
  /// Substring containment match against each record's `domain`.
  pub domain_contains: Option<String>,
  /// Cap on the number of returned records. `None` means unbounded.
  pub limit:           Option<usize>,
}

// ─── Aggregates ──────────────────────────────────────────────────────────────

/// Aggregate statistics over the full current collection.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionStats {
  pub total_detections:  u64,
  /// Count of distinct `domain` values.
  pub unique_domains:    u64,
  /// The `min(N, 5)` most recent records, newest first.
  pub recent_detections: Vec<Detection>,
  /// The distinct `domain` values themselves, sorted.
  pub domains:           Vec<String>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Probelog detection store backend.
///
/// Records are immutable after insert: the only mutation besides insert is a
/// full-collection clear. Every read path orders by `(timestamp, id)`
/// descending, so listings and `recent_detections` are newest-first with a
/// deterministic tie-break.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait DetectionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Validate `input`, derive `domain` from its URL, assign an id and (if
  /// none was supplied) a timestamp, and persist the record.
  fn record_detection(
    &self,
    input: NewDetection,
  ) -> impl Future<Output = Result<Detection, Self::Error>> + Send + '_;

  /// Return detections matching `query`, newest first.
  fn list_detections<'a>(
    &'a self,
    query: &'a DetectionQuery,
  ) -> impl Future<Output = Result<Vec<Detection>, Self::Error>> + Send + 'a;

  /// Delete every record. Returns the number of rows removed. Ids are not
  /// reset — a record inserted after a clear never reuses an old id.
  fn clear_detections(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Compute [`DetectionStats`] over the full collection.
  fn stats(
    &self,
  ) -> impl Future<Output = Result<DetectionStats, Self::Error>> + Send + '_;
}
