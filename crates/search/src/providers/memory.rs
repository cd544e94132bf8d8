//! In-memory index for tests and offline development.
//!
//! Records carry fixed relevance scores assigned at insertion, so searches
//! are fully deterministic: filter, sort by score, cut to `top_k`. A
//! scriptable failure mode lets retry behavior be exercised without a
//! network.

use crate::client::DocumentSearch;
use crate::types::{
    summarize_record, IndexStats, PropertySnapshot, PropertySummary, SearchFilter, SearchMatch,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use sumika_core::{AppError, AppResult};

/// Deterministic in-memory document index.
#[derive(Default)]
pub struct MemoryIndex {
    documents: Vec<SearchMatch>,
    properties: Vec<PropertySnapshot>,
    /// Searches left to fail before the index starts answering
    failures_remaining: AtomicU32,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document passage with its fixed relevance score.
    pub fn with_document(mut self, m: SearchMatch) -> Self {
        self.documents.push(m);
        self
    }

    /// Add a property record.
    pub fn with_property(mut self, p: PropertySnapshot) -> Self {
        self.properties.push(p);
        self
    }

    /// Fail the next `count` searches with a timeout.
    pub fn failing_first(self, count: u32) -> Self {
        self.failures_remaining.store(count, Ordering::SeqCst);
        self
    }
}

#[async_trait::async_trait]
impl DocumentSearch for MemoryIndex {
    fn backend_name(&self) -> &str {
        "memory"
    }

    async fn search(
        &self,
        _query: &str,
        top_k: usize,
        filter: Option<&SearchFilter>,
    ) -> AppResult<Vec<SearchMatch>> {
        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
            return Err(AppError::Timeout("memory index scripted failure".to_string()));
        }

        let mut matches: Vec<SearchMatch> = self
            .documents
            .iter()
            .filter(|m| filter.map_or(true, |f| f.matches(&m.meta)))
            .cloned()
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        matches.truncate(top_k);
        Ok(matches)
    }

    async fn describe(&self) -> AppResult<IndexStats> {
        let mut namespaces = BTreeMap::new();
        namespaces.insert("region".to_string(), self.documents.len() as u64);
        namespaces.insert("property".to_string(), self.properties.len() as u64);
        Ok(IndexStats {
            total_records: (self.documents.len() + self.properties.len()) as u64,
            namespaces,
        })
    }

    async fn list_properties(&self) -> AppResult<Vec<PropertySummary>> {
        Ok(self
            .properties
            .iter()
            .map(|p| summarize_record(&p.id, &p.text))
            .collect())
    }

    async fn fetch_property(&self, id: &str) -> AppResult<Option<PropertySnapshot>> {
        Ok(self.properties.iter().find(|p| p.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PassageMeta;

    fn doc(id: &str, score: f32, category: &str) -> SearchMatch {
        SearchMatch {
            id: id.to_string(),
            text: format!("passage {}", id),
            score,
            meta: PassageMeta {
                document_id: id.to_string(),
                category: Some(category.to_string()),
                municipality: None,
                created_at: None,
            },
        }
    }

    #[tokio::test]
    async fn test_search_sorted_and_truncated() {
        let index = MemoryIndex::new()
            .with_document(doc("a", 0.4, "教育・子育て"))
            .with_document(doc("b", 0.9, "教育・子育て"))
            .with_document(doc("c", 0.7, "教育・子育て"));

        let matches = index.search("小学校", 2, None).await.unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "b");
        assert_eq!(matches[1].id, "c");
    }

    #[tokio::test]
    async fn test_search_applies_filter() {
        let index = MemoryIndex::new()
            .with_document(doc("a", 0.9, "教育・子育て"))
            .with_document(doc("b", 0.8, "交通・アクセス"));

        let filter = SearchFilter::new().with_category("交通・アクセス");
        let matches = index.search("駅", 10, Some(&filter)).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "b");
    }

    #[tokio::test]
    async fn test_scripted_failures_then_recovery() {
        let index = MemoryIndex::new()
            .with_document(doc("a", 0.9, "教育・子育て"))
            .failing_first(2);

        assert!(index.search("q", 5, None).await.is_err());
        assert!(index.search("q", 5, None).await.is_err());
        assert_eq!(index.search("q", 5, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_property_fetch() {
        let index = MemoryIndex::new().with_property(PropertySnapshot {
            id: "p-1".to_string(),
            name: "サンライズ川越".to_string(),
            text: "サンライズ川越\n川越市新富町1-1\n3LDK".to_string(),
            truncated: false,
        });

        let found = index.fetch_property("p-1").await.unwrap();
        assert_eq!(found.unwrap().name, "サンライズ川越");
        assert!(index.fetch_property("p-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_describe_counts() {
        let index = MemoryIndex::new().with_document(doc("a", 0.5, "c"));
        let stats = index.describe().await.unwrap();
        assert_eq!(stats.total_records, 1);
        assert_eq!(stats.namespaces["region"], 1);
    }
}
