//! Diagnostic handlers — synthetic inserts and deliberate error responses.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/test/add-detection` | `?domain=&method=`, both optional |
//! | `GET`  | `/test-error` | `?type=server\|auth\|notfound\|other` |
//!
//! These exist so the extension's error paths and the operator's dashboards
//! can be exercised without real traffic.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use probelog_core::{detection::NewDetection, store::DetectionStore};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;

// ─── Synthetic insert ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AddDetectionParams {
  pub domain: Option<String>,
  pub method: Option<String>,
}

/// `GET /test/add-detection[?domain=<host>][&method=<name>]`
///
/// Inserts a synthetic record for `https://<domain>/` so the listing and
/// stats endpoints have something to show.
pub async fn add_detection<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<AddDetectionParams>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: DetectionStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let domain = params.domain.unwrap_or_else(|| "test.example.com".into());
  let method = params.method.unwrap_or_else(|| "canvas".into());

  let mut input = NewDetection::new(format!("https://{domain}/"), method);
  input.detection_method = Some("synthetic".into());

  input
    .validate()
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let detection = store
    .record_detection(input)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(json!({
    "status":  "success",
    "message": format!(
      "added synthetic detection {} for {}",
      detection.id, detection.domain
    ),
  })))
}

// ─── Deliberate errors ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TestErrorParams {
  #[serde(rename = "type")]
  pub kind: Option<String>,
}

/// `GET /test-error?type=server|auth|notfound|other`
///
/// Always fails, with the status code selected by `type`. Unknown or missing
/// types behave as `other`.
pub async fn test_error(
  Query(params): Query<TestErrorParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
  Err(match params.kind.as_deref() {
    Some("server") => ApiError::Internal("deliberate server error".into()),
    Some("auth") => ApiError::Unauthorized("deliberate auth error".into()),
    Some("notfound") => ApiError::NotFound("deliberate not-found".into()),
    _ => ApiError::BadRequest("deliberate bad request".into()),
  })
}
