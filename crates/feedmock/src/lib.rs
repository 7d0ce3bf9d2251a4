//! Mock XML product-feed servers.
//!
//! The HUB backend fetches supplier feeds over HTTP; these endpoints stand
//! in for a real supplier during the suite. Two flavours:
//!
//! - [`FeedMode::Static`]: the same one-item document on every request,
//!   for the "save a feed with an http link" scenario.
//! - [`FeedMode::TwoVersion`]: the first request returns a one-item
//!   document, every later request a two-item document. A single endpoint
//!   thereby simulates "feed content changed between two fetches": the
//!   second item must not be ingested once feed loading has been disabled.
//!
//! The request counter lives for the whole process. Unlike the endpoints
//! the HUB backend sees, the counter is inspectable and resettable through
//! `/admin/requests` and `/admin/reset`, so consecutive runs against one
//! server process can start from a known state.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// One-item document served by the static feed.
pub const FEED_STATIC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<items>
  <item>
    <title>Test Product</title>
    <id>test-1</id>
    <price>100</price>
  </item>
</items>"#;

/// First response of the two-version feed.
pub const FEED_ONE_ITEM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<items>
  <item>
    <title>Item for disabled-feed test</title>
    <id>blocked-test-1</id>
    <price>100</price>
  </item>
</items>"#;

/// Second and all later responses of the two-version feed.
pub const FEED_TWO_ITEMS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<items>
  <item>
    <title>Item for disabled-feed test</title>
    <id>blocked-test-1</id>
    <price>100</price>
  </item>
  <item>
    <title>New item that must not be loaded when checkbox is off</title>
    <id>blocked-test-2</id>
    <price>200</price>
  </item>
</items>"#;

/// Which document sequence an endpoint serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedMode {
    /// Same document on every request.
    Static,
    /// One item on the first request, two items afterwards.
    TwoVersion,
}

/// Shared endpoint state: the mode and the process-wide request counter.
#[derive(Clone)]
struct FeedState {
    mode: FeedMode,
    requests: Arc<AtomicU64>,
}

/// Build the router for one feed endpoint.
pub fn router(mode: FeedMode) -> Router {
    let state = FeedState {
        mode,
        requests: Arc::new(AtomicU64::new(0)),
    };

    Router::new()
        .route("/", get(serve_feed))
        .route("/feed.xml", get(serve_feed))
        .route("/admin/requests", get(request_count))
        .route("/admin/reset", post(reset_counter))
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn serve_feed(State(state): State<FeedState>) -> impl IntoResponse {
    let count = state.requests.fetch_add(1, Ordering::SeqCst) + 1;
    let body = match state.mode {
        FeedMode::Static => FEED_STATIC,
        FeedMode::TwoVersion => {
            if count == 1 {
                FEED_ONE_ITEM
            } else {
                FEED_TWO_ITEMS
            }
        }
    };
    ([(header::CONTENT_TYPE, "application/xml")], body)
}

async fn request_count(State(state): State<FeedState>) -> impl IntoResponse {
    let count = state.requests.load(Ordering::SeqCst);
    Json(serde_json::json!({ "requests": count }))
}

async fn reset_counter(State(state): State<FeedState>) -> impl IntoResponse {
    state.requests.store(0, Ordering::SeqCst);
    StatusCode::OK
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}

/// Serve one feed endpoint until the process exits.
pub async fn serve(addr: SocketAddr, mode: FeedMode) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Feed {:?}: http://{}/feed.xml", mode, listener.local_addr()?);
    axum::serve(listener, router(mode)).await?;
    Ok(())
}
