//! Handler for `GET /stats`.

use std::sync::Arc;

use axum::{Json, extract::State};
use probelog_core::store::{DetectionStats, DetectionStore};

use crate::error::ApiError;

/// `GET /stats` — aggregate statistics over the full collection:
/// `{total_detections, unique_domains, recent_detections, domains}`.
pub async fn handler<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<DetectionStats>, ApiError>
where
  S: DetectionStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let stats = store
    .stats()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(stats))
}
