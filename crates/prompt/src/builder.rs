//! Prompt builder: renders a template layout into a [`PromptPayload`].
//!
//! Rendering runs handlebars in strict mode against a map holding exactly
//! the four template slots, so a layout referencing an unknown name fails
//! with a template error instead of silently substituting a blank.

use crate::types::{HistoryEntry, PromptPayload, TemplateDefinition, TEMPLATE_SLOTS};
use handlebars::Handlebars;
use std::collections::BTreeMap;
use sumika_core::{AppError, AppResult};

/// Build the generation request payload.
///
/// `context` is the already-rendered context block. History is truncated to
/// the most recent `max_history` entries and rendered oldest first. Missing
/// slots (empty context, empty history) render as empty strings.
pub fn build_prompt(
    definition: &TemplateDefinition,
    context: &str,
    history: &[HistoryEntry],
    question: &str,
    max_history: usize,
) -> AppResult<PromptPayload> {
    tracing::debug!("Building prompt from template '{}'", definition.name);

    let history_block = render_history(history, max_history);

    let mut slots = BTreeMap::new();
    slots.insert("system", definition.system.as_str());
    slots.insert("context", context);
    slots.insert("history", history_block.as_str());
    slots.insert("question", question);

    let user = render_layout(&definition.layout, &slots)?;

    Ok(PromptPayload {
        system: definition.system.clone(),
        user,
    })
}

/// Render conversation history for the `{{history}}` slot.
///
/// Keeps the newest `max_history` entries, emitted oldest first so the
/// model reads the conversation in order.
pub fn render_history(history: &[HistoryEntry], max_history: usize) -> String {
    let start = history.len().saturating_sub(max_history);
    history[start..]
        .iter()
        .map(|entry| format!("ユーザー: {}\nアシスタント: {}", entry.question, entry.answer))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Validate that a layout references only known slots.
///
/// Runs a strict-mode render against fully populated probe values; any
/// reference outside [`TEMPLATE_SLOTS`] surfaces as `AppError::Template`.
pub fn validate_layout(layout: &str) -> AppResult<()> {
    let mut probe = BTreeMap::new();
    for slot in TEMPLATE_SLOTS {
        probe.insert(slot, "");
    }
    render_layout(layout, &probe).map(|_| ())
}

fn render_layout(layout: &str, slots: &BTreeMap<&str, &str>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Unknown slot names must fail, not render blank
    handlebars.set_strict_mode(true);

    // Plain text prompts, no HTML escaping
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("layout", layout)
        .map_err(|e| AppError::Template(format!("Failed to parse template layout: {}", e)))?;

    handlebars.render("layout", slots).map_err(|e| {
        AppError::Template(format!(
            "Template layout references an unknown slot (allowed: {}): {}",
            TEMPLATE_SLOTS.join(", "),
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(layout: &str) -> TemplateDefinition {
        TemplateDefinition {
            name: "test".to_string(),
            description: None,
            system: "案内役です。".to_string(),
            layout: layout.to_string(),
        }
    }

    fn history(pairs: &[(&str, &str)]) -> Vec<HistoryEntry> {
        pairs
            .iter()
            .map(|(q, a)| HistoryEntry {
                question: q.to_string(),
                answer: a.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_build_prompt_fills_slots() {
        let def = definition("文脈:{{context}}\n会話:{{history}}\n質問:{{question}}");
        let turns = history(&[("駅は近い？", "徒歩5分です。")]);

        let payload = build_prompt(&def, "北口に商店街があります。", &turns, "買い物は便利？", 5).unwrap();

        assert_eq!(payload.system, "案内役です。");
        assert!(payload.user.contains("文脈:北口に商店街があります。"));
        assert!(payload.user.contains("ユーザー: 駅は近い？"));
        assert!(payload.user.contains("アシスタント: 徒歩5分です。"));
        assert!(payload.user.contains("質問:買い物は便利？"));
    }

    #[test]
    fn test_build_prompt_is_deterministic() {
        let def = definition("{{system}}/{{context}}/{{history}}/{{question}}");
        let turns = history(&[("a", "b"), ("c", "d")]);

        let first = build_prompt(&def, "ctx", &turns, "q", 5).unwrap();
        let second = build_prompt(&def, "ctx", &turns, "q", 5).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.user.as_bytes(), second.user.as_bytes());
    }

    #[test]
    fn test_unknown_slot_is_template_error() {
        let def = definition("質問:{{question}} 気分:{{mood}}");

        let result = build_prompt(&def, "", &[], "q", 5);
        match result {
            Err(AppError::Template(msg)) => assert!(msg.contains("unknown slot")),
            other => panic!("Expected Template error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_slots_render_empty() {
        let def = definition("[{{context}}][{{history}}]{{question}}");

        let payload = build_prompt(&def, "", &[], "q", 5).unwrap();
        assert_eq!(payload.user, "[][]q");
    }

    #[test]
    fn test_history_truncated_to_newest_oldest_first() {
        let turns = history(&[("q1", "a1"), ("q2", "a2"), ("q3", "a3")]);

        let block = render_history(&turns, 2);

        assert!(!block.contains("q1"));
        let q2 = block.find("q2").unwrap();
        let q3 = block.find("q3").unwrap();
        assert!(q2 < q3);
    }

    #[test]
    fn test_render_history_empty() {
        assert_eq!(render_history(&[], 5), "");
    }

    #[test]
    fn test_validate_layout_accepts_all_slots() {
        validate_layout("{{system}}{{context}}{{history}}{{question}}").unwrap();
    }

    #[test]
    fn test_validate_layout_rejects_unknown() {
        assert!(validate_layout("{{answer}}").is_err());
    }
}
