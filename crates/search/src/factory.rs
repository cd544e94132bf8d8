//! Document-search backend factory.

use crate::client::DocumentSearch;
use crate::providers::{MemoryIndex, PineconeClient};
use std::sync::Arc;
use std::time::Duration;
use sumika_core::config::SearchConfig;
use sumika_core::{AppError, AppResult};

/// Create a search client for the configured backend.
///
/// "pinecone" needs an endpoint and an API key; "memory" starts empty and
/// is meant for tests and offline development.
pub fn create_search_client(
    config: &SearchConfig,
    api_key: Option<&str>,
    timeout: Duration,
) -> AppResult<Arc<dyn DocumentSearch>> {
    match config.backend.to_lowercase().as_str() {
        "pinecone" => {
            let endpoint = config.endpoint.as_deref().ok_or_else(|| {
                AppError::Config(
                    "Pinecone backend requires an endpoint (PINECONE_INDEX_HOST)".to_string(),
                )
            })?;
            let api_key = api_key.ok_or_else(|| {
                AppError::Auth(format!(
                    "Pinecone backend requires an API key ({})",
                    config.api_key_env
                ))
            })?;
            Ok(Arc::new(PineconeClient::new(
                endpoint,
                api_key,
                config.namespace.clone(),
                config.property_namespace.clone(),
                timeout,
            )))
        }
        "memory" => Ok(Arc::new(MemoryIndex::new())),
        other => Err(AppError::Config(format!(
            "Unknown search backend: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pinecone_requires_endpoint() {
        let config = SearchConfig::default();
        let result = create_search_client(&config, Some("key"), Duration::from_secs(10));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_pinecone_requires_key() {
        let mut config = SearchConfig::default();
        config.endpoint = Some("https://idx.example.net".to_string());
        let result = create_search_client(&config, None, Duration::from_secs(10));
        assert!(matches!(result, Err(AppError::Auth(_))));
    }

    #[test]
    fn test_memory_backend() {
        let mut config = SearchConfig::default();
        config.backend = "memory".to_string();
        let client = create_search_client(&config, None, Duration::from_secs(10)).unwrap();
        assert_eq!(client.backend_name(), "memory");
    }

    #[test]
    fn test_unknown_backend() {
        let mut config = SearchConfig::default();
        config.backend = "solr".to_string();
        let result = create_search_client(&config, None, Duration::from_secs(10));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
