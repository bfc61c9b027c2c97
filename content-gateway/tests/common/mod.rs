//! Test helpers for the content-gateway integration tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use content_gateway::config::{GatewayConfig, RateLimitConfig, UpstreamConfig};
use content_gateway::models::SessionStore;
use content_gateway::ratelimit::SessionGate;
use content_gateway::services::providers::mock::{MockOriginalitySearcher, MockTextGenerator};
use content_gateway::services::providers::SearchMatch;
use content_gateway::startup::{build_router, AppState};
use http_body_util::BodyExt;
use std::sync::Arc;

pub fn test_config() -> GatewayConfig {
    GatewayConfig {
        common: gateway_core::config::Config { port: 0 },
        upstream: UpstreamConfig {
            generation_url: "http://localhost:5000/generate".to_string(),
            search_url: "http://localhost:5000/search".to_string(),
            api_key: None,
            timeout_secs: 30,
        },
        rate_limit: RateLimitConfig {
            threshold: 5,
            cooldown_secs: 900,
        },
        gate_regeneration: false,
    }
}

pub fn app(
    config: GatewayConfig,
    generator: Arc<MockTextGenerator>,
    searcher: Arc<MockOriginalitySearcher>,
) -> Router {
    let gate = SessionGate::from_secs(
        config.rate_limit.threshold,
        config.rate_limit.cooldown_secs,
    );
    build_router(AppState {
        config,
        sessions: SessionStore::new(),
        gate,
        generator,
        searcher,
    })
}

pub fn match_fixture(count: usize) -> Vec<SearchMatch> {
    (0..count)
        .map(|i| SearchMatch {
            title: format!("Match {}", i),
            link: format!("https://example.com/{}", i),
            snippet: format!("snippet {}", i),
        })
        .collect()
}

pub fn post_json(uri: &str, session_id: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(id) = session_id {
        builder = builder.header("X-Session-Id", id);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn response_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
