//! Scripted mock LLM client.
//!
//! Returns a pre-programmed sequence of outcomes, one per call, repeating
//! the last outcome once the script runs out. Used by generator and
//! pipeline tests to exercise the retry rules, and by offline development
//! through the provider factory.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use sumika_core::{AppError, AppResult};

/// One scripted call outcome.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Successful completion with this content
    Ok(String),
    /// Credential rejection
    Auth,
    /// Provider rate limit
    RateLimited,
    /// Provider timeout
    Timeout,
    /// Empty/malformed output
    Invalid,
}

/// Mock LLM client with a scripted outcome sequence.
pub struct MockLlmClient {
    outcomes: Vec<MockOutcome>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl MockLlmClient {
    /// Create a client that plays `outcomes` in order.
    pub fn new(outcomes: Vec<MockOutcome>) -> Self {
        Self {
            outcomes,
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Convenience: always answer with `content`.
    pub fn answering(content: impl Into<String>) -> Self {
        Self::new(vec![MockOutcome::Ok(content.into())])
    }

    /// Sleep this long before every call, for deadline tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `complete` calls observed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl LlmClient for MockLlmClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let outcome = self
            .outcomes
            .get(call)
            .or_else(|| self.outcomes.last())
            .cloned()
            .unwrap_or(MockOutcome::Invalid);

        match outcome {
            MockOutcome::Ok(content) => Ok(LlmResponse {
                content,
                model: request.model.clone(),
                usage: LlmUsage::default(),
            }),
            MockOutcome::Auth => Err(AppError::Auth("mock credential rejection".to_string())),
            MockOutcome::RateLimited => {
                Err(AppError::RateLimited("mock rate limit".to_string()))
            }
            MockOutcome::Timeout => Err(AppError::Timeout("mock timeout".to_string())),
            MockOutcome::Invalid => Err(AppError::InvalidResponse(
                "mock empty output".to_string(),
            )),
        }
    }
}
