//! HTTP provider implementations backed by reqwest.
//!
//! Both upstreams speak the same small JSON dialect: a single-field POST
//! body in, a JSON object (or list) back. Requests are single attempts; a
//! failure is surfaced to the caller, never retried.

use super::{
    GeneratedContent, OriginalitySearcher, ProviderError, SearchMatch, TextGenerator,
};
use crate::config::UpstreamConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn build_client(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .expect("Failed to create HTTP client")
}

/// Send `body` to `url`, attaching the static Authorization key when
/// configured, and return the raw JSON payload of a 2xx response.
async fn post_json<T: Serialize>(
    client: &Client,
    url: &str,
    api_key: Option<&str>,
    body: &T,
) -> Result<serde_json::Value, ProviderError> {
    let mut request = client.post(url).json(body);
    if let Some(key) = api_key {
        request = request.header(reqwest::header::AUTHORIZATION, key);
    }

    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::Network(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::UpstreamStatus { status, body });
    }

    response
        .json()
        .await
        .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
}

/// Client for the content-generation endpoint.
pub struct HttpTextGenerator {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpTextGenerator {
    pub fn new(config: &UpstreamConfig) -> Self {
        Self {
            client: build_client(config.timeout_secs),
            endpoint: config.generation_url.clone(),
            api_key: config.api_key.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    generated_text: String,
}

#[async_trait]
impl TextGenerator for HttpTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<GeneratedContent, ProviderError> {
        tracing::debug!(
            prompt_len = prompt.len(),
            "Sending request to generation endpoint"
        );

        let raw = post_json(
            &self.client,
            &self.endpoint,
            self.api_key.as_deref(),
            &GenerateRequest { prompt },
        )
        .await?;

        let parsed: GenerateResponse = serde_json::from_value(raw.clone())
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(GeneratedContent {
            text: parsed.generated_text,
            raw,
        })
    }
}

/// Client for the originality-check search endpoint.
pub struct HttpOriginalitySearcher {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpOriginalitySearcher {
    pub fn new(config: &UpstreamConfig) -> Self {
        Self {
            client: build_client(config.timeout_secs),
            endpoint: config.search_url.clone(),
            api_key: config.api_key.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
}

/// The search endpoint answers either with a bare list of matches or with a
/// wrapper object, depending on the deployment.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    Bare(Vec<SearchMatch>),
    Wrapped { search_results: Vec<SearchMatch> },
}

impl SearchResponse {
    fn into_matches(self) -> Vec<SearchMatch> {
        match self {
            SearchResponse::Bare(matches) => matches,
            SearchResponse::Wrapped { search_results } => search_results,
        }
    }
}

#[async_trait]
impl OriginalitySearcher for HttpOriginalitySearcher {
    async fn search(&self, query: &str) -> Result<Vec<SearchMatch>, ProviderError> {
        tracing::debug!(query_len = query.len(), "Sending request to search endpoint");

        let raw = post_json(
            &self.client,
            &self.endpoint,
            self.api_key.as_deref(),
            &SearchRequest { query },
        )
        .await?;

        let parsed: SearchResponse = serde_json::from_value(raw)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(parsed.into_matches())
    }
}
