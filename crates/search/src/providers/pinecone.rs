//! Pinecone-style HTTP index backend.
//!
//! Talks to a serverless index host with integrated text search: the query
//! endpoint accepts raw text and returns scored hits with metadata fields,
//! so no embedding happens on this side of the boundary. Authentication is
//! an `Api-Key` header; the key comes from the environment, never from
//! config files.

use crate::client::DocumentSearch;
use crate::types::{
    summarize_record, IndexStats, PassageMeta, PropertySnapshot, PropertySummary, SearchFilter,
    SearchMatch,
};
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use sumika_core::{AppError, AppResult};

/// HTTP client for a Pinecone-style index.
pub struct PineconeClient {
    host: String,
    api_key: String,
    namespace: String,
    property_namespace: String,
    timeout: Duration,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: SearchResult,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_score", default)]
    score: f32,
    #[serde(default)]
    fields: HitFields,
}

#[derive(Debug, Default, Deserialize)]
struct HitFields {
    #[serde(default)]
    text: String,
    #[serde(default)]
    document_id: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    municipality: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct StatsResponse {
    #[serde(rename = "totalVectorCount", default)]
    total_vector_count: u64,
    #[serde(default)]
    namespaces: BTreeMap<String, NamespaceStats>,
}

#[derive(Debug, Deserialize)]
struct NamespaceStats {
    #[serde(rename = "vectorCount", default)]
    vector_count: u64,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    vectors: Vec<ListedVector>,
}

#[derive(Debug, Deserialize)]
struct ListedVector {
    id: String,
}

#[derive(Debug, Deserialize)]
struct FetchResponse {
    #[serde(default)]
    vectors: BTreeMap<String, FetchedVector>,
}

#[derive(Debug, Deserialize)]
struct FetchedVector {
    #[serde(default)]
    metadata: FetchedMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct FetchedMetadata {
    #[serde(default)]
    text: String,
}

impl PineconeClient {
    pub fn new(
        host: impl Into<String>,
        api_key: impl Into<String>,
        namespace: impl Into<String>,
        property_namespace: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            host: host.into(),
            api_key: api_key.into(),
            namespace: namespace.into(),
            property_namespace: property_namespace.into(),
            timeout,
            client: reqwest::Client::new(),
        }
    }

    fn classify_send_error(e: reqwest::Error) -> AppError {
        if e.is_timeout() {
            AppError::Timeout(format!("Search request timed out: {}", e))
        } else {
            AppError::Search(format!("Failed to reach search index: {}", e))
        }
    }

    fn classify_status(status: StatusCode, body: &str) -> AppError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                AppError::Auth(format!("Search index rejected credentials ({}): {}", status, body))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                AppError::RateLimited(format!("Search index rate limit ({}): {}", status, body))
            }
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                AppError::Timeout(format!("Search index timeout ({}): {}", status, body))
            }
            _ => AppError::Search(format!("Search index error ({}): {}", status, body)),
        }
    }

    async fn post_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        body: serde_json::Value,
    ) -> AppResult<T> {
        let response = self
            .client
            .post(url)
            .header("Api-Key", &self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(Self::classify_send_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Self::classify_status(status, &body));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Malformed search response: {}", e)))
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> AppResult<T> {
        let response = self
            .client
            .get(url)
            .header("Api-Key", &self.api_key)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(Self::classify_send_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Self::classify_status(status, &body));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Malformed search response: {}", e)))
    }

    /// Fetch raw record text by ids from a namespace.
    async fn fetch_records(
        &self,
        namespace: &str,
        ids: &[String],
    ) -> AppResult<BTreeMap<String, String>> {
        if ids.is_empty() {
            return Ok(BTreeMap::new());
        }
        let id_params: Vec<String> = ids.iter().map(|id| format!("ids={}", id)).collect();
        let url = format!(
            "{}/vectors/fetch?namespace={}&{}",
            self.host,
            namespace,
            id_params.join("&")
        );
        let response: FetchResponse = self.get_json(&url).await?;
        Ok(response
            .vectors
            .into_iter()
            .map(|(id, v)| (id, v.metadata.text))
            .collect())
    }
}

#[async_trait::async_trait]
impl DocumentSearch for PineconeClient {
    fn backend_name(&self) -> &str {
        "pinecone"
    }

    async fn search(
        &self,
        query: &str,
        top_k: usize,
        filter: Option<&SearchFilter>,
    ) -> AppResult<Vec<SearchMatch>> {
        tracing::debug!(top_k, namespace = %self.namespace, "Searching index");

        let mut query_body = serde_json::json!({
            "inputs": { "text": query },
            "top_k": top_k,
        });
        if let Some(expr) = filter.and_then(|f| f.to_filter_expr()) {
            query_body["filter"] = expr;
        }
        let body = serde_json::json!({
            "query": query_body,
            "fields": ["text", "document_id", "category", "municipality", "created_at"],
        });

        let url = format!(
            "{}/records/namespaces/{}/search",
            self.host, self.namespace
        );
        let response: SearchResponse = self.post_json(&url, body).await?;

        let matches = response
            .result
            .hits
            .into_iter()
            .map(|hit| {
                let document_id = hit.fields.document_id.unwrap_or_else(|| hit.id.clone());
                SearchMatch {
                    id: hit.id,
                    text: hit.fields.text,
                    score: hit.score,
                    meta: PassageMeta {
                        document_id,
                        category: hit.fields.category,
                        municipality: hit.fields.municipality,
                        created_at: hit.fields.created_at,
                    },
                }
            })
            .collect();

        Ok(matches)
    }

    async fn describe(&self) -> AppResult<IndexStats> {
        let url = format!("{}/describe_index_stats", self.host);
        let response: StatsResponse = self.post_json(&url, serde_json::json!({})).await?;

        Ok(IndexStats {
            total_records: response.total_vector_count,
            namespaces: response
                .namespaces
                .into_iter()
                .map(|(name, ns)| (name, ns.vector_count))
                .collect(),
        })
    }

    async fn list_properties(&self) -> AppResult<Vec<PropertySummary>> {
        let url = format!(
            "{}/vectors/list?namespace={}",
            self.host, self.property_namespace
        );
        let listed: ListResponse = self.get_json(&url).await?;
        let ids: Vec<String> = listed.vectors.into_iter().map(|v| v.id).collect();

        let records = self.fetch_records(&self.property_namespace, &ids).await?;

        Ok(records
            .iter()
            .map(|(id, text)| summarize_record(id, text))
            .collect())
    }

    async fn fetch_property(&self, id: &str) -> AppResult<Option<PropertySnapshot>> {
        let records = self
            .fetch_records(&self.property_namespace, &[id.to_string()])
            .await?;

        Ok(records.get(id).map(|text| {
            let summary = summarize_record(id, text);
            PropertySnapshot {
                id: id.to_string(),
                name: summary.name,
                text: text.clone(),
                truncated: false,
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_response_parsing() {
        let json = r#"{
            "result": {
                "hits": [
                    {
                        "_id": "rec-1",
                        "_score": 0.87,
                        "fields": {
                            "text": "川越駅から徒歩10分です。",
                            "document_id": "doc-9",
                            "category": "交通・アクセス",
                            "municipality": "川越市"
                        }
                    }
                ]
            }
        }"#;

        let parsed: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.result.hits.len(), 1);
        let hit = &parsed.result.hits[0];
        assert_eq!(hit.id, "rec-1");
        assert!((hit.score - 0.87).abs() < f32::EPSILON);
        assert_eq!(hit.fields.category.as_deref(), Some("交通・アクセス"));
    }

    #[test]
    fn test_stats_response_parsing() {
        let json = r#"{
            "totalVectorCount": 1200,
            "namespaces": {
                "region": {"vectorCount": 1100},
                "property": {"vectorCount": 100}
            }
        }"#;

        let parsed: StatsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.total_vector_count, 1200);
        assert_eq!(parsed.namespaces["property"].vector_count, 100);
    }

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            PineconeClient::classify_status(StatusCode::UNAUTHORIZED, ""),
            AppError::Auth(_)
        ));
        assert!(matches!(
            PineconeClient::classify_status(StatusCode::TOO_MANY_REQUESTS, ""),
            AppError::RateLimited(_)
        ));
        assert!(matches!(
            PineconeClient::classify_status(StatusCode::BAD_REQUEST, ""),
            AppError::Search(_)
        ));
    }
}
