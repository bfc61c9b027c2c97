//! Mock provider implementations for testing.

use super::{
    GeneratedContent, OriginalitySearcher, ProviderError, SearchMatch, TextGenerator,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Scripted outcome for a mock upstream call.
pub enum MockOutcome {
    Success,
    Status(u16, &'static str),
    Network(&'static str),
}

/// Mock text generator that records the prompts it receives.
pub struct MockTextGenerator {
    outcome: MockOutcome,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockTextGenerator {
    pub fn new(outcome: MockOutcome) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(MockOutcome::Success)
    }

    /// Number of generate calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent prompt sent upstream, if any.
    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<GeneratedContent, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());

        match &self.outcome {
            MockOutcome::Success => {
                let text = format!("Mock response for: {}", prompt);
                let raw = serde_json::json!({ "generated_text": text.clone() });
                Ok(GeneratedContent { text, raw })
            }
            MockOutcome::Status(status, body) => Err(ProviderError::UpstreamStatus {
                status: *status,
                body: body.to_string(),
            }),
            MockOutcome::Network(msg) => Err(ProviderError::Network(msg.to_string())),
        }
    }
}

/// Mock searcher returning a fixed list of matches, or a scripted failure.
pub struct MockOriginalitySearcher {
    outcome: MockOutcome,
    matches: Vec<SearchMatch>,
    calls: AtomicUsize,
}

impl MockOriginalitySearcher {
    pub fn new(matches: Vec<SearchMatch>) -> Self {
        Self {
            outcome: MockOutcome::Success,
            matches,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn failing(outcome: MockOutcome) -> Self {
        Self {
            outcome,
            matches: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of search calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OriginalitySearcher for MockOriginalitySearcher {
    async fn search(&self, _query: &str) -> Result<Vec<SearchMatch>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.outcome {
            MockOutcome::Success => Ok(self.matches.clone()),
            MockOutcome::Status(status, body) => Err(ProviderError::UpstreamStatus {
                status: *status,
                body: body.to_string(),
            }),
            MockOutcome::Network(msg) => Err(ProviderError::Network(msg.to_string())),
        }
    }
}
