//! Context retrieval with bounded retry.
//!
//! Wraps the document-search capability for the pipeline: applies the
//! intent's category filter and top-k bias, retries transient backend
//! failures with backoff, and drops passages below the similarity
//! threshold. When the retry budget runs out the caller gets
//! `RetrievalUnavailable`, and the pipeline degrades to answering without
//! document context rather than failing the turn.

use crate::classifier::Intent;
use std::sync::Arc;
use std::time::Duration;
use sumika_core::config::RetrievalConfig;
use sumika_core::{AppError, AppResult};
use sumika_search::{DocumentSearch, SearchFilter, SearchMatch};

/// Retrieval wrapper owned by the pipeline.
pub struct ContextRetriever {
    search: Arc<dyn DocumentSearch>,
    config: RetrievalConfig,
}

impl ContextRetriever {
    pub fn new(search: Arc<dyn DocumentSearch>, config: RetrievalConfig) -> Self {
        Self { search, config }
    }

    /// Retrieve passages relevant to `query`, biased by `intent`.
    pub async fn retrieve(&self, query: &str, intent: Intent) -> AppResult<Vec<SearchMatch>> {
        let mut predicate = SearchFilter::new();
        if let Some(category) = intent.category() {
            predicate = predicate.with_category(category);
        }
        if let Some(ref municipality) = self.config.municipality {
            predicate = predicate.with_municipality(municipality.clone());
        }
        let filter = (!predicate.is_empty()).then_some(predicate);
        let top_k = intent.retrieval_top_k(self.config.top_k);

        let max_attempts = self.config.max_retries.max(1);
        let mut attempts = 0u32;

        let matches = loop {
            attempts += 1;

            match self.search.search(query, top_k, filter.as_ref()).await {
                Ok(matches) => break matches,
                Err(e) if e.is_transient() && attempts < max_attempts => {
                    let delay =
                        Duration::from_millis(self.config.backoff_ms << (attempts - 1).min(10));
                    tracing::warn!(attempts, ?delay, "Search failed transiently, backing off: {}", e);
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::warn!(attempts, "Search unavailable: {}", e);
                    return Err(AppError::RetrievalUnavailable(e.to_string()));
                }
            }
        };

        let total = matches.len();
        let threshold = self.config.similarity_threshold;
        let relevant: Vec<SearchMatch> = matches
            .into_iter()
            .filter(|m| m.score >= threshold)
            .collect();

        tracing::info!(
            intent = intent.as_str(),
            retrieved = total,
            relevant = relevant.len(),
            threshold,
            "Retrieved context passages"
        );

        Ok(relevant)
    }
}
