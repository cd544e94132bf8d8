//! Search boundary type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Source metadata attached to a retrieved passage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PassageMeta {
    /// Originating document identifier
    pub document_id: String,

    /// Regional metadata category (e.g. "教育・子育て")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Municipality the passage is about (e.g. "川越市")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub municipality: Option<String>,

    /// When the source document was ingested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// One ranked passage returned from the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchMatch {
    /// Record id in the index
    pub id: String,

    /// Passage text
    pub text: String,

    /// Similarity score, 0..1, higher is more relevant
    pub score: f32,

    /// Source metadata
    pub meta: PassageMeta,
}

/// Metadata predicate for a search call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilter {
    /// Restrict to this metadata category
    pub category: Option<String>,

    /// Restrict to this municipality
    pub municipality: Option<String>,
}

impl SearchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_municipality(mut self, municipality: impl Into<String>) -> Self {
        self.municipality = Some(municipality.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.municipality.is_none()
    }

    /// Check a passage's metadata against this filter.
    pub fn matches(&self, meta: &PassageMeta) -> bool {
        if let Some(ref category) = self.category {
            if meta.category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }
        if let Some(ref municipality) = self.municipality {
            if meta.municipality.as_deref() != Some(municipality.as_str()) {
                return false;
            }
        }
        true
    }

    /// Render as the index's `$eq` filter expression.
    pub fn to_filter_expr(&self) -> Option<serde_json::Value> {
        if self.is_empty() {
            return None;
        }
        let mut expr = serde_json::Map::new();
        if let Some(ref category) = self.category {
            expr.insert(
                "category".to_string(),
                serde_json::json!({ "$eq": category }),
            );
        }
        if let Some(ref municipality) = self.municipality {
            expr.insert(
                "municipality".to_string(),
                serde_json::json!({ "$eq": municipality }),
            );
        }
        Some(serde_json::Value::Object(expr))
    }
}

/// Index-wide statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Total records across all namespaces
    pub total_records: u64,

    /// Record counts per namespace
    pub namespaces: BTreeMap<String, u64>,
}

/// A property record as listed for selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertySummary {
    /// Record id in the property namespace
    pub id: String,

    /// Property name (first line of the record)
    pub name: String,

    /// Location (second line of the record)
    pub location: String,
}

/// The full property record a user has focused on.
///
/// `truncated` is false as fetched; the context assembler sets it when the
/// snapshot had to be cut to fit the context budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertySnapshot {
    /// Record id
    pub id: String,

    /// Property name
    pub name: String,

    /// Full record text (layout, price, facilities, ...)
    pub text: String,

    /// Whether the text was cut to fit a context budget
    #[serde(default)]
    pub truncated: bool,
}

/// Split a property record's text into (name, location) for listings.
pub fn summarize_record(id: &str, text: &str) -> PropertySummary {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    PropertySummary {
        id: id.to_string(),
        name: lines.next().unwrap_or("不明").to_string(),
        location: lines.next().unwrap_or("不明").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(category: &str, municipality: &str) -> PassageMeta {
        PassageMeta {
            document_id: "doc-1".to_string(),
            category: Some(category.to_string()),
            municipality: Some(municipality.to_string()),
            created_at: None,
        }
    }

    #[test]
    fn test_filter_matches_category() {
        let filter = SearchFilter::new().with_category("教育・子育て");
        assert!(filter.matches(&meta("教育・子育て", "川越市")));
        assert!(!filter.matches(&meta("交通・アクセス", "川越市")));
    }

    #[test]
    fn test_filter_matches_combined() {
        let filter = SearchFilter::new()
            .with_category("安全・防災")
            .with_municipality("横浜市");
        assert!(filter.matches(&meta("安全・防災", "横浜市")));
        assert!(!filter.matches(&meta("安全・防災", "川崎市")));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = SearchFilter::new();
        assert!(filter.is_empty());
        assert!(filter.matches(&PassageMeta::default()));
        assert!(filter.to_filter_expr().is_none());
    }

    #[test]
    fn test_filter_expr_shape() {
        let filter = SearchFilter::new().with_category("物件概要");
        let expr = filter.to_filter_expr().unwrap();
        assert_eq!(expr["category"]["$eq"], "物件概要");
    }

    #[test]
    fn test_summarize_record() {
        let summary = summarize_record("p-1", "サンライズ川越\n川越市新富町1-1\n3LDK 4,200万円\n");
        assert_eq!(summary.name, "サンライズ川越");
        assert_eq!(summary.location, "川越市新富町1-1");
    }

    #[test]
    fn test_summarize_record_short_text() {
        let summary = summarize_record("p-2", "名前だけ");
        assert_eq!(summary.name, "名前だけ");
        assert_eq!(summary.location, "不明");
    }
}
