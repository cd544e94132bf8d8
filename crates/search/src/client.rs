//! The document-search capability trait.

use crate::types::{IndexStats, PropertySnapshot, PropertySummary, SearchFilter, SearchMatch};
use sumika_core::AppResult;

/// External document-search capability.
///
/// Implementations classify failures: transient pressure surfaces as
/// `AppError::Timeout` / `AppError::RateLimited` (the retriever retries
/// those), credential problems as `AppError::Auth`, anything else as
/// `AppError::Search`.
#[async_trait::async_trait]
pub trait DocumentSearch: Send + Sync {
    /// Backend name (e.g. "pinecone", "memory").
    fn backend_name(&self) -> &str;

    /// Rank passages for a text query. `top_k` must be > 0.
    async fn search(
        &self,
        query: &str,
        top_k: usize,
        filter: Option<&SearchFilter>,
    ) -> AppResult<Vec<SearchMatch>>;

    /// Index-wide record statistics.
    async fn describe(&self) -> AppResult<IndexStats>;

    /// List records in the property namespace.
    async fn list_properties(&self) -> AppResult<Vec<PropertySummary>>;

    /// Fetch one property record; `None` when the id is unknown.
    async fn fetch_property(&self, id: &str) -> AppResult<Option<PropertySnapshot>>;
}
