mod common;

use axum::http::StatusCode;
use common::{app, post_json, response_json, test_config};
use content_gateway::services::providers::mock::{MockOriginalitySearcher, MockTextGenerator};
use serde_json::json;
use std::sync::Arc;
use tower::util::ServiceExt;

#[tokio::test]
async fn test_sixth_generation_denied_with_cooldown() {
    let generator = Arc::new(MockTextGenerator::succeeding());
    let searcher = Arc::new(MockOriginalitySearcher::empty());
    let app = app(test_config(), generator.clone(), searcher);

    // The fifth generation still succeeds; it arms the block for the sixth.
    for i in 1..=5 {
        let response = app
            .clone()
            .oneshot(post_json(
                "/generate",
                Some("sess-1"),
                json!({ "prompt": "hello" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["requests_used"], i);
    }

    let response = app
        .oneshot(post_json(
            "/generate",
            Some("sess-1"),
            json!({ "prompt": "hello" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let retry_after: u64 = response
        .headers()
        .get("retry-after")
        .expect("429 must carry Retry-After")
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((899..=900).contains(&retry_after));

    let body = response_json(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Generation limit reached"));

    // Only the five successful generations reached the upstream.
    assert_eq!(generator.calls(), 5);
}

#[tokio::test]
async fn test_sessions_are_limited_independently() {
    let mut config = test_config();
    config.rate_limit.threshold = 1;
    let generator = Arc::new(MockTextGenerator::succeeding());
    let searcher = Arc::new(MockOriginalitySearcher::empty());
    let app = app(config, generator, searcher);

    let response = app
        .clone()
        .oneshot(post_json(
            "/generate",
            Some("sess-a"),
            json!({ "prompt": "hello" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(post_json(
            "/generate",
            Some("sess-a"),
            json!({ "prompt": "hello" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // A different session is untouched by sess-a's block.
    let response = app
        .oneshot(post_json(
            "/generate",
            Some("sess-b"),
            json!({ "prompt": "hello" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_minted_session_id_is_returned_and_reusable() {
    let generator = Arc::new(MockTextGenerator::succeeding());
    let searcher = Arc::new(MockOriginalitySearcher::empty());
    let app = app(test_config(), generator, searcher);

    let response = app
        .clone()
        .oneshot(post_json("/generate", None, json!({ "prompt": "hello" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let session_id = body["session_id"].as_str().unwrap().to_string();
    assert!(!session_id.is_empty());
    assert_eq!(body["requests_used"], 1);

    let response = app
        .oneshot(post_json(
            "/generate",
            Some(&session_id),
            json!({ "prompt": "hello" }),
        ))
        .await
        .unwrap();
    let body = response_json(response).await;
    assert_eq!(body["requests_used"], 2);
}
