//! Response generator: the answering pipeline's view of the generation
//! capability.
//!
//! Wraps an [`LlmClient`] with the per-failure retry rules:
//! - `Auth`: fatal, surfaced immediately, never retried
//! - `RateLimited`: exponential backoff up to the policy budget, then
//!   `GenerationUnavailable`
//! - `Timeout`: exactly one retry, then `GenerationUnavailable`
//! - `InvalidResponse`: no retry, `GenerationUnavailable`
//!
//! A partially generated or malformed answer is never returned as if it
//! were complete.

use crate::client::{LlmClient, LlmRequest};
use crate::retry::{RetryPolicy, TIMEOUT_MAX_ATTEMPTS};
use std::sync::Arc;
use sumika_core::{AppError, AppResult};
use sumika_prompt::PromptPayload;

/// Generation settings carried alongside the retry policy.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    /// Model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: u32,
}

/// Bounded-retry wrapper around the generation capability.
pub struct ResponseGenerator {
    client: Arc<dyn LlmClient>,
    settings: GenerationSettings,
    policy: RetryPolicy,
}

impl ResponseGenerator {
    pub fn new(client: Arc<dyn LlmClient>, settings: GenerationSettings, policy: RetryPolicy) -> Self {
        Self {
            client,
            settings,
            policy,
        }
    }

    /// Generate the answer text for a built prompt payload.
    pub async fn generate(&self, payload: &PromptPayload) -> AppResult<String> {
        let request = LlmRequest::new(payload.user.clone(), self.settings.model.clone())
            .with_system(payload.system.clone())
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens);

        let mut attempts = 0u32;

        loop {
            attempts += 1;

            match self.client.complete(&request).await {
                Ok(response) => {
                    let content = response.content.trim();
                    if content.is_empty() {
                        return Err(AppError::GenerationUnavailable(
                            "Generation service returned empty content".to_string(),
                        ));
                    }
                    tracing::info!(
                        provider = self.client.provider_name(),
                        attempts,
                        "Generation succeeded"
                    );
                    return Ok(content.to_string());
                }
                Err(AppError::Auth(msg)) => {
                    tracing::error!("Generation credential failure: {}", msg);
                    return Err(AppError::Auth(msg));
                }
                Err(AppError::InvalidResponse(msg)) => {
                    tracing::error!("Generation returned invalid output: {}", msg);
                    return Err(AppError::GenerationUnavailable(msg));
                }
                Err(AppError::RateLimited(msg)) => {
                    if !self.policy.allows_another(attempts) {
                        tracing::warn!(
                            attempts,
                            "Generation rate limited, retry budget exhausted"
                        );
                        return Err(AppError::GenerationUnavailable(msg));
                    }
                    let delay = self.policy.delay_after(attempts);
                    tracing::warn!(attempts, ?delay, "Generation rate limited, backing off");
                    tokio::time::sleep(delay).await;
                }
                Err(AppError::Timeout(msg)) => {
                    if attempts >= TIMEOUT_MAX_ATTEMPTS {
                        tracing::warn!(attempts, "Generation timed out twice, giving up");
                        return Err(AppError::GenerationUnavailable(msg));
                    }
                    tracing::warn!(attempts, "Generation timed out, retrying once");
                }
                Err(other) => {
                    tracing::error!("Generation failed: {}", other);
                    return Err(other);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{MockLlmClient, MockOutcome};
    use std::time::Duration;

    fn generator(client: Arc<MockLlmClient>, max_attempts: u32) -> ResponseGenerator {
        ResponseGenerator::new(
            client,
            GenerationSettings {
                model: "test-model".to_string(),
                temperature: 0.7,
                max_tokens: 500,
            },
            RetryPolicy::new(max_attempts, Duration::from_millis(1)),
        )
    }

    fn payload() -> PromptPayload {
        PromptPayload {
            system: "案内役".to_string(),
            user: "質問".to_string(),
        }
    }

    #[tokio::test]
    async fn test_success_first_attempt() {
        let client = Arc::new(MockLlmClient::answering("回答です"));
        let result = generator(client.clone(), 3).generate(&payload()).await;

        assert_eq!(result.unwrap(), "回答です");
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_rate_limited_twice_then_success_within_budget() {
        let client = Arc::new(MockLlmClient::new(vec![
            MockOutcome::RateLimited,
            MockOutcome::RateLimited,
            MockOutcome::Ok("三度目の正直".to_string()),
        ]));
        let result = generator(client.clone(), 3).generate(&payload()).await;

        assert_eq!(result.unwrap(), "三度目の正直");
        assert_eq!(client.calls(), 3);
    }

    #[tokio::test]
    async fn test_rate_limit_budget_exhausted() {
        let client = Arc::new(MockLlmClient::new(vec![MockOutcome::RateLimited]));
        let result = generator(client.clone(), 3).generate(&payload()).await;

        assert!(matches!(result, Err(AppError::GenerationUnavailable(_))));
        assert_eq!(client.calls(), 3);
    }

    #[tokio::test]
    async fn test_auth_error_never_retried() {
        let client = Arc::new(MockLlmClient::new(vec![MockOutcome::Auth]));
        let result = generator(client.clone(), 3).generate(&payload()).await;

        assert!(matches!(result, Err(AppError::Auth(_))));
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_timeout_retried_exactly_once() {
        let client = Arc::new(MockLlmClient::new(vec![MockOutcome::Timeout]));
        let result = generator(client.clone(), 5).generate(&payload()).await;

        assert!(matches!(result, Err(AppError::GenerationUnavailable(_))));
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn test_timeout_then_success() {
        let client = Arc::new(MockLlmClient::new(vec![
            MockOutcome::Timeout,
            MockOutcome::Ok("遅れてすみません".to_string()),
        ]));
        let result = generator(client.clone(), 3).generate(&payload()).await;

        assert_eq!(result.unwrap(), "遅れてすみません");
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn test_invalid_response_not_retried() {
        let client = Arc::new(MockLlmClient::new(vec![MockOutcome::Invalid]));
        let result = generator(client.clone(), 3).generate(&payload()).await;

        assert!(matches!(result, Err(AppError::GenerationUnavailable(_))));
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_whitespace_only_content_rejected() {
        let client = Arc::new(MockLlmClient::new(vec![MockOutcome::Ok("   \n".to_string())]));
        let result = generator(client.clone(), 3).generate(&payload()).await;

        assert!(matches!(result, Err(AppError::GenerationUnavailable(_))));
        assert_eq!(client.calls(), 1);
    }
}
