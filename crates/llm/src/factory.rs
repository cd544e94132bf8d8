//! LLM provider factory.

use crate::client::LlmClient;
use crate::providers::{MockLlmClient, OpenAiClient};
use std::sync::Arc;
use std::time::Duration;
use sumika_core::{AppError, AppResult};

/// Create an LLM client for the named provider.
///
/// # Arguments
/// * `provider` - "openai" or "mock"
/// * `endpoint` - optional custom endpoint URL
/// * `api_key` - API key (required for "openai")
/// * `timeout` - per-request timeout
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Duration,
) -> AppResult<Arc<dyn LlmClient>> {
    match provider.to_lowercase().as_str() {
        "openai" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Auth("OpenAI provider requires an API key (OPENAI_API_KEY)".to_string())
            })?;
            let client = match endpoint {
                Some(url) => OpenAiClient::with_base_url(url, api_key, timeout),
                None => OpenAiClient::new(api_key, timeout),
            };
            Ok(Arc::new(client))
        }
        "mock" => Ok(Arc::new(MockLlmClient::answering(
            "これはオフライン動作用の固定応答です。",
        ))),
        _ => Err(AppError::Config(format!(
            "Unknown generation provider: {}",
            provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_openai_client() {
        let client = create_client("openai", None, Some("key"), Duration::from_secs(30));
        assert_eq!(client.unwrap().provider_name(), "openai");
    }

    #[test]
    fn test_openai_requires_api_key() {
        let result = create_client("openai", None, None, Duration::from_secs(30));
        assert!(matches!(result, Err(AppError::Auth(_))));
    }

    #[test]
    fn test_create_mock_client() {
        let client = create_client("mock", None, None, Duration::from_secs(30));
        assert_eq!(client.unwrap().provider_name(), "mock");
    }

    #[test]
    fn test_unknown_provider() {
        let result = create_client("gemini", None, None, Duration::from_secs(30));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
