//! Context assembly under a character budget.
//!
//! Dedup, rank, and greedily pack retrieved passages into a bounded
//! context block. A selected property record always makes it in, consuming
//! budget first; when even the property alone is over budget its text is
//! cut on a char boundary and flagged. The budget counts passage and
//! property text characters.

use crate::types::{ContextRef, PassageRef};
use std::collections::HashMap;
use sumika_search::{PropertySnapshot, SearchMatch};

/// The bounded context block for one turn.
#[derive(Debug, Clone)]
pub struct AssembledContext {
    /// Pinned property record, possibly truncated
    pub property: Option<PropertySnapshot>,

    /// Included passages, descending score
    pub passages: Vec<SearchMatch>,

    /// Configured budget in characters
    pub budget_chars: usize,

    /// Characters of text actually included
    pub used_chars: usize,
}

impl AssembledContext {
    /// Render the context block for the `{{context}}` template slot.
    pub fn render(&self) -> String {
        let mut parts = Vec::new();
        if let Some(ref property) = self.property {
            parts.push(format!("【物件情報】\n{}", property.text));
        }
        for passage in &self.passages {
            parts.push(passage.text.clone());
        }
        parts.join("\n\n---\n\n")
    }

    /// No property and no passages.
    pub fn is_empty(&self) -> bool {
        self.property.is_none() && self.passages.is_empty()
    }

    /// The audit reference recorded with the turn.
    pub fn to_context_ref(&self, degraded: bool) -> ContextRef {
        ContextRef {
            passages: self
                .passages
                .iter()
                .map(|p| PassageRef {
                    document_id: p.meta.document_id.clone(),
                    score: p.score,
                })
                .collect(),
            property_id: self.property.as_ref().map(|p| p.id.clone()),
            property_truncated: self.property.as_ref().map(|p| p.truncated).unwrap_or(false),
            degraded,
        }
    }
}

/// Assemble a context block from retrieved passages.
///
/// Stable: identical inputs give identical membership and order. Steps:
/// dedup by document id keeping the best-scoring instance, sort by
/// descending score (equal scores newest first), include the property
/// first, then add passages until the next one would exceed the budget.
pub fn assemble(
    passages: Vec<SearchMatch>,
    selected_property: Option<PropertySnapshot>,
    budget_chars: usize,
) -> AssembledContext {
    let mut best: HashMap<String, SearchMatch> = HashMap::new();
    for passage in passages {
        let keep = match best.get(&passage.meta.document_id) {
            Some(existing) => replaces(&passage, existing),
            None => true,
        };
        if keep {
            best.insert(passage.meta.document_id.clone(), passage);
        }
    }

    let mut ranked: Vec<SearchMatch> = best.into_values().collect();
    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.meta.created_at.cmp(&a.meta.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut used_chars = 0usize;

    let property = selected_property.map(|mut property| {
        let chars = property.text.chars().count();
        if chars > budget_chars {
            property.text = property.text.chars().take(budget_chars).collect();
            property.truncated = true;
            used_chars = budget_chars;
        } else {
            used_chars = chars;
        }
        property
    });

    let mut included = Vec::new();
    for passage in ranked {
        let chars = passage.text.chars().count();
        if used_chars + chars > budget_chars {
            break;
        }
        used_chars += chars;
        included.push(passage);
    }

    AssembledContext {
        property,
        passages: included,
        budget_chars,
        used_chars,
    }
}

/// Whether `candidate` should replace `existing` for the same document id:
/// higher score wins, equal scores keep the newer passage.
fn replaces(candidate: &SearchMatch, existing: &SearchMatch) -> bool {
    if candidate.score != existing.score {
        return candidate.score > existing.score;
    }
    candidate.meta.created_at > existing.meta.created_at
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sumika_search::PassageMeta;

    fn passage(id: &str, document_id: &str, score: f32, text: &str) -> SearchMatch {
        SearchMatch {
            id: id.to_string(),
            text: text.to_string(),
            score,
            meta: PassageMeta {
                document_id: document_id.to_string(),
                category: None,
                municipality: None,
                created_at: None,
            },
        }
    }

    fn property(text: &str) -> PropertySnapshot {
        PropertySnapshot {
            id: "p-1".to_string(),
            name: "サンライズ川越".to_string(),
            text: text.to_string(),
            truncated: false,
        }
    }

    #[test]
    fn test_budget_fits_top_two_of_three() {
        // Budget fits only the top two by score
        let passages = vec![
            passage("a", "d1", 0.9, "あいうえおかきくけこ"), // 10 chars
            passage("b", "d2", 0.7, "さしすせそたちつてと"), // 10 chars
            passage("c", "d3", 0.4, "なにぬねのはひふへほ"), // 10 chars
        ];

        let context = assemble(passages, None, 20);

        assert_eq!(context.passages.len(), 2);
        assert_eq!(context.passages[0].meta.document_id, "d1");
        assert_eq!(context.passages[1].meta.document_id, "d2");
        assert_eq!(context.used_chars, 20);
    }

    #[test]
    fn test_never_over_budget() {
        let passages = vec![
            passage("a", "d1", 0.9, &"x".repeat(30)),
            passage("b", "d2", 0.8, &"y".repeat(30)),
        ];

        for budget in [1, 29, 30, 45, 60, 100] {
            let context = assemble(passages.clone(), None, budget);
            assert!(context.used_chars <= budget, "over budget at {}", budget);
        }
    }

    #[test]
    fn test_dedup_keeps_highest_score() {
        let passages = vec![
            passage("a", "d1", 0.6, "古い重複"),
            passage("b", "d1", 0.9, "良い方"),
            passage("c", "d2", 0.7, "別文書"),
        ];

        let context = assemble(passages, None, 1000);

        assert_eq!(context.passages.len(), 2);
        assert_eq!(context.passages[0].text, "良い方");
        assert_eq!(context.passages[1].meta.document_id, "d2");
    }

    #[test]
    fn test_dedup_idempotent_under_duplicate_injection() {
        let base = vec![
            passage("a", "d1", 0.9, "text a"),
            passage("b", "d2", 0.7, "text b"),
        ];
        let mut with_dupes = base.clone();
        with_dupes.push(passage("a2", "d1", 0.9, "text a"));
        with_dupes.push(passage("b2", "d2", 0.5, "worse b"));

        let clean = assemble(base, None, 1000);
        let deduped = assemble(with_dupes, None, 1000);

        assert_eq!(clean.passages.len(), deduped.passages.len());
        for (x, y) in clean.passages.iter().zip(deduped.passages.iter()) {
            assert_eq!(x.meta.document_id, y.meta.document_id);
            assert_eq!(x.text, y.text);
        }
    }

    #[test]
    fn test_equal_scores_ordered_newest_first() {
        let old = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let new = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();

        let mut older = passage("a", "d1", 0.8, "older");
        older.meta.created_at = Some(old);
        let mut newer = passage("b", "d2", 0.8, "newer");
        newer.meta.created_at = Some(new);

        let context = assemble(vec![older, newer], None, 1000);

        assert_eq!(context.passages[0].text, "newer");
        assert_eq!(context.passages[1].text, "older");
    }

    #[test]
    fn test_property_included_before_passages() {
        let passages = vec![passage("a", "d1", 0.9, &"あ".repeat(15))];

        // Property (10 chars) leaves no room for the 15-char passage
        let context = assemble(passages, Some(property(&"p".repeat(10))), 20);

        assert!(context.property.is_some());
        assert!(!context.property.as_ref().unwrap().truncated);
        assert!(context.passages.is_empty());
        assert_eq!(context.used_chars, 10);
    }

    #[test]
    fn test_oversized_property_truncated_and_flagged() {
        let context = assemble(Vec::new(), Some(property(&"長".repeat(50))), 20);

        let prop = context.property.unwrap();
        assert!(prop.truncated);
        assert_eq!(prop.text.chars().count(), 20);
        assert_eq!(context.used_chars, 20);
    }

    #[test]
    fn test_stable_output() {
        let passages = vec![
            passage("a", "d1", 0.9, "あ"),
            passage("b", "d2", 0.9, "い"),
            passage("c", "d3", 0.5, "う"),
        ];

        let first = assemble(passages.clone(), None, 100);
        let second = assemble(passages, None, 100);

        let ids = |c: &AssembledContext| {
            c.passages
                .iter()
                .map(|p| p.id.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn test_render_and_context_ref() {
        let context = assemble(
            vec![passage("a", "d1", 0.9, "駅から徒歩5分です。")],
            Some(property("サンライズ川越\n3LDK")),
            1000,
        );

        let rendered = context.render();
        assert!(rendered.starts_with("【物件情報】"));
        assert!(rendered.contains("駅から徒歩5分です。"));

        let context_ref = context.to_context_ref(false);
        assert_eq!(context_ref.passages.len(), 1);
        assert_eq!(context_ref.passages[0].document_id, "d1");
        assert_eq!(context_ref.property_id.as_deref(), Some("p-1"));
        assert!(!context_ref.degraded);
    }

    #[test]
    fn test_empty_input_is_empty_context() {
        let context = assemble(Vec::new(), None, 100);
        assert!(context.is_empty());
        assert_eq!(context.render(), "");
        assert_eq!(context.used_chars, 0);
    }
}
