//! JSON REST API for Probelog.
//!
//! Exposes an axum [`Router`] backed by any
//! [`probelog_core::store::DetectionStore`]. CORS, static assets, and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", probelog_api::api_router(store.clone()))
//! ```

pub mod detections;
pub mod error;
pub mod stats;
pub mod testing;

use std::sync::Arc;

use axum::{Router, routing::get};
use probelog_core::store::DetectionStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: DetectionStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Detections
    .route(
      "/detections",
      get(detections::list::<S>)
        .post(detections::create::<S>)
        .delete(detections::clear::<S>),
    )
    // Aggregates
    .route("/stats", get(stats::handler::<S>))
    // Diagnostics
    .route("/test/add-detection", get(testing::add_detection::<S>))
    .route("/test-error", get(testing::test_error))
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use probelog_core::{
    detection::{Detection, NewDetection},
    store::{DetectionQuery, DetectionStats},
  };
  use probelog_store_memory::MemoryStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  fn router() -> (Router, MemoryStore) {
    let store = MemoryStore::new();
    (api_router(Arc::new(store.clone())), store)
  }

  async fn send(
    router: Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let req = builder.body(body).unwrap();
    router.oneshot(req).await.unwrap()
  }

  async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  // ── POST /detections ────────────────────────────────────────────────────────

  #[tokio::test]
  async fn post_creates_detection_with_derived_domain() {
    let (router, _) = router();
    let resp = send(
      router,
      "POST",
      "/detections",
      Some(json!({
        "url":    "https://tracker.example.com/fp.js",
        "method": "canvas",
      })),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["domain"], "tracker.example.com");
    assert_eq!(body["url"], "https://tracker.example.com/fp.js");
    assert_eq!(body["method"], "canvas");
    assert!(body["id"].as_i64().unwrap() > 0);
    assert!(body["timestamp"].is_string());
  }

  #[tokio::test]
  async fn post_accepts_nested_details() {
    let (router, _) = router();
    let resp = send(
      router,
      "POST",
      "/detections",
      Some(json!({
        "url":    "https://example.com/",
        "method": "audio",
        "details": {
          "scriptUrl":       "https://cdn.example.com/fp.js",
          "detectionMethod": "api-hook",
        },
      })),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["script_url"], "https://cdn.example.com/fp.js");
    assert_eq!(body["detection_method"], "api-hook");
  }

  #[tokio::test]
  async fn post_flat_detail_fields_win_over_nested() {
    let (router, _) = router();
    let resp = send(
      router,
      "POST",
      "/detections",
      Some(json!({
        "url":        "https://example.com/",
        "method":     "audio",
        "script_url": "https://flat.example.com/fp.js",
        "details":    { "scriptUrl": "https://nested.example.com/fp.js" },
      })),
    )
    .await;

    let body = body_json(resp).await;
    assert_eq!(body["script_url"], "https://flat.example.com/fp.js");
  }

  #[tokio::test]
  async fn post_without_method_is_rejected() {
    let (router, _) = router();
    let resp = send(
      router,
      "POST",
      "/detections",
      Some(json!({ "url": "https://example.com/" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
  }

  #[tokio::test]
  async fn post_with_schemeless_url_returns_400() {
    let (router, store) = router();
    let resp = send(
      router,
      "POST",
      "/detections",
      Some(json!({ "url": "example.com/page", "method": "canvas" })),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("invalid url"));

    // Nothing was persisted.
    assert!(
      store
        .list_detections(&DetectionQuery::default())
        .await
        .unwrap()
        .is_empty()
    );
  }

  // ── GET /detections ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn get_returns_newest_first() {
    let (router, _) = router();

    for host in ["first", "second", "third"] {
      let resp = send(
        router.clone(),
        "POST",
        "/detections",
        Some(json!({
          "url":    format!("https://{host}.example.com/"),
          "method": "canvas",
        })),
      )
      .await;
      assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = send(router, "GET", "/detections", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let domains: Vec<_> = body
      .as_array()
      .unwrap()
      .iter()
      .map(|d| d["domain"].as_str().unwrap())
      .collect();
    // Equal-timestamp inserts fall back to id order, newest insert first.
    assert_eq!(domains[0], "third.example.com");
    assert_eq!(domains[2], "first.example.com");
  }

  #[tokio::test]
  async fn get_filters_by_domain_substring() {
    let (router, _) = router();

    for url in [
      "https://tracker.example.com/a",
      "https://ads.example.com/b",
      "https://unrelated.net/c",
    ] {
      send(
        router.clone(),
        "POST",
        "/detections",
        Some(json!({ "url": url, "method": "canvas" })),
      )
      .await;
    }

    let resp =
      send(router, "GET", "/detections?domain=example.com", None).await;
    let body = body_json(resp).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(
      rows
        .iter()
        .all(|d| d["domain"].as_str().unwrap().contains("example.com"))
    );
  }

  #[tokio::test]
  async fn get_limit_is_clamped_to_1000() {
    let (router, store) = router();

    // Seed through the store directly; 1005 POSTs would tell us nothing
    // more about the handler.
    for i in 0..1005 {
      store
        .record_detection(NewDetection::new(
          format!("https://h{i}.example.com/"),
          "canvas",
        ))
        .await
        .unwrap();
    }

    let over = body_json(
      send(router.clone(), "GET", "/detections?limit=5000", None).await,
    )
    .await;
    assert_eq!(over.as_array().unwrap().len(), 1000);

    let unlimited =
      body_json(send(router, "GET", "/detections", None).await).await;
    assert_eq!(unlimited.as_array().unwrap().len(), 1000);
  }

  #[tokio::test]
  async fn get_round_trips_posted_record() {
    let (router, _) = router();

    let posted = body_json(
      send(
        router.clone(),
        "POST",
        "/detections",
        Some(json!({
          "url":        "https://example.com/page",
          "method":     "webgl",
          "script_url": "https://example.com/fp.js",
        })),
      )
      .await,
    )
    .await;

    let listed = body_json(send(router, "GET", "/detections", None).await).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0], posted);
  }

  // ── DELETE /detections ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn delete_clears_collection() {
    let (router, _) = router();

    for i in 0..3 {
      send(
        router.clone(),
        "POST",
        "/detections",
        Some(json!({
          "url":    format!("https://h{i}.example.com/"),
          "method": "canvas",
        })),
      )
      .await;
    }

    let resp = send(router.clone(), "DELETE", "/detections", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["deleted"], 3);

    let listed =
      body_json(send(router.clone(), "GET", "/detections", None).await).await;
    assert!(listed.as_array().unwrap().is_empty());

    let stats = body_json(send(router, "GET", "/stats", None).await).await;
    assert_eq!(stats["total_detections"], 0);
  }

  // ── GET /stats ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn stats_reports_counts_recent_and_domains() {
    let (router, _) = router();

    for i in 0..7 {
      let host = if i % 2 == 0 { "even" } else { "odd" };
      send(
        router.clone(),
        "POST",
        "/detections",
        Some(json!({
          "url":    format!("https://{host}.example.com/{i}"),
          "method": "canvas",
        })),
      )
      .await;
    }

    let stats = body_json(send(router, "GET", "/stats", None).await).await;
    assert_eq!(stats["total_detections"], 7);
    assert_eq!(stats["unique_domains"], 2);
    assert_eq!(stats["recent_detections"].as_array().unwrap().len(), 5);
    assert_eq!(
      stats["domains"],
      json!(["even.example.com", "odd.example.com"])
    );
  }

  // ── Diagnostics ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn add_detection_inserts_synthetic_record() {
    let (router, _) = router();

    let resp = send(
      router.clone(),
      "GET",
      "/test/add-detection?domain=probe.example.com&method=webgl",
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "success");
    assert!(
      body["message"]
        .as_str()
        .unwrap()
        .contains("probe.example.com")
    );

    let listed = body_json(send(router, "GET", "/detections", None).await).await;
    assert_eq!(listed[0]["domain"], "probe.example.com");
    assert_eq!(listed[0]["method"], "webgl");
    assert_eq!(listed[0]["detection_method"], "synthetic");
  }

  /// A store whose every operation fails, for exercising 500 paths.
  #[derive(Clone, Default)]
  struct FailingStore;

  impl DetectionStore for FailingStore {
    type Error = std::io::Error;

    async fn record_detection(
      &self,
      _input: NewDetection,
    ) -> Result<Detection, Self::Error> {
      Err(std::io::Error::other("backing store unavailable"))
    }

    async fn list_detections(
      &self,
      _query: &DetectionQuery,
    ) -> Result<Vec<Detection>, Self::Error> {
      Err(std::io::Error::other("backing store unavailable"))
    }

    async fn clear_detections(&self) -> Result<u64, Self::Error> {
      Err(std::io::Error::other("backing store unavailable"))
    }

    async fn stats(&self) -> Result<DetectionStats, Self::Error> {
      Err(std::io::Error::other("backing store unavailable"))
    }
  }

  #[tokio::test]
  async fn add_detection_store_failure_returns_500() {
    let router = api_router(Arc::new(FailingStore));

    let resp = send(router, "GET", "/test/add-detection", None).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(resp).await;
    assert!(
      body["error"]
        .as_str()
        .unwrap()
        .contains("backing store unavailable")
    );
  }

  #[tokio::test]
  async fn test_error_statuses() {
    for (kind, expected) in [
      ("server", StatusCode::INTERNAL_SERVER_ERROR),
      ("auth", StatusCode::UNAUTHORIZED),
      ("notfound", StatusCode::NOT_FOUND),
      ("other", StatusCode::BAD_REQUEST),
    ] {
      let (router, _) = router();
      let resp =
        send(router, "GET", &format!("/test-error?type={kind}"), None).await;
      assert_eq!(resp.status(), expected, "type={kind}");
      let body = body_json(resp).await;
      assert!(body["error"].is_string());
    }
  }
}
