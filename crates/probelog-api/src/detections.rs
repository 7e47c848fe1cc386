//! Handlers for `/detections` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/detections` | Optional `?domain=<substring>`, `?limit=<n>` (capped at 1000) |
//! | `POST`   | `/detections` | Body: [`NewDetectionBody`]; returns 201 + stored detection |
//! | `DELETE` | `/detections` | Removes every record |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use probelog_core::{
  detection::{Detection, NewDetection},
  domain::extract_domain,
  store::{DetectionQuery, DetectionStore},
};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;

/// Hard cap on list results, matching the largest collection a single
/// extension popup is expected to render.
pub const MAX_LIST_LIMIT: usize = 1000;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Substring containment match against each record's `domain`.
  pub domain: Option<String>,
  pub limit:  Option<usize>,
}

/// `GET /detections[?domain=<substring>][&limit=<n>]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Detection>>, ApiError>
where
  S: DetectionStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let query = DetectionQuery {
    domain_contains: params.domain,
    limit:           Some(
      params.limit.unwrap_or(MAX_LIST_LIMIT).min(MAX_LIST_LIMIT),
    ),
  };

  let detections = store
    .list_detections(&query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(detections))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// Nested detail object posted by older extension builds.
#[derive(Debug, Deserialize, Default)]
pub struct DetectionDetails {
  #[serde(rename = "scriptUrl")]
  pub script_url:       Option<String>,
  #[serde(rename = "detectionMethod")]
  pub detection_method: Option<String>,
}

/// JSON body accepted by `POST /detections`.
///
/// Detail fields are accepted both flat (`script_url`, `detection_method`)
/// and nested under `details` (`scriptUrl`, `detectionMethod`); flat fields
/// win when both are present.
#[derive(Debug, Deserialize)]
pub struct NewDetectionBody {
  pub url:    String,
  pub method: String,
  #[serde(default)]
  pub details:          Option<DetectionDetails>,
  #[serde(default)]
  pub script_url:       Option<String>,
  #[serde(default)]
  pub detection_method: Option<String>,
  #[serde(default)]
  pub timestamp:        Option<DateTime<Utc>>,
}

impl From<NewDetectionBody> for NewDetection {
  fn from(b: NewDetectionBody) -> Self {
    let details = b.details.unwrap_or_default();
    NewDetection {
      url:              b.url,
      method:           b.method,
      script_url:       b.script_url.or(details.script_url),
      detection_method: b.detection_method.or(details.detection_method),
      timestamp:        b.timestamp,
    }
  }
}

/// `POST /detections` — returns 201 + the stored [`Detection`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewDetectionBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DetectionStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let input = NewDetection::from(body);

  // Surface validation problems as 400s; anything that gets past this is a
  // genuine store failure.
  input
    .validate()
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
  extract_domain(&input.url)
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let detection = store
    .record_detection(input)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(detection)))
}

// ─── Clear ────────────────────────────────────────────────────────────────────

/// `DELETE /detections` — unconditionally removes every record.
pub async fn clear<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: DetectionStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let deleted = store
    .clear_detections()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(json!({ "status": "success", "deleted": deleted })))
}
