//! Prompt template types.

use serde::{Deserialize, Serialize};

/// The complete slot vocabulary a template layout may reference.
pub const TEMPLATE_SLOTS: [&str; 4] = ["system", "context", "history", "question"];

/// A user-editable prompt template.
///
/// `system` is the instruction text sent as the system message. `layout`
/// arranges the user message and may reference any of [`TEMPLATE_SLOTS`]
/// as `{{slot}}`; referencing anything else fails template validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateDefinition {
    /// Template name (file stem under templates/)
    pub name: String,

    /// Optional editor-facing description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// System instruction text
    pub system: String,

    /// User-message layout with `{{slot}}` references
    pub layout: String,
}

impl TemplateDefinition {
    /// The built-in template used when no user template exists yet.
    pub fn builtin_default() -> Self {
        Self {
            name: "default".to_string(),
            description: Some("地域情報アシスタントの標準テンプレート".to_string()),
            system: "あなたは地域の暮らしに関する情報を案内するアシスタントです。\
                     参照文脈と物件情報だけを根拠に、丁寧な日本語で回答してください。\
                     文脈に情報がない場合は、その旨を正直に伝えてください。\
                     補足情報は「[詳細:ラベル]」という行で区切って続けてください。"
                .to_string(),
            layout: "参照文脈:\n{{context}}\n\nこれまでの会話:\n{{history}}\n\n質問:\n{{question}}\n"
                .to_string(),
        }
    }
}

/// A conversation turn as seen by prompt construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// What the user asked
    pub question: String,

    /// What the assistant answered
    pub answer: String,
}

/// The fully rendered request for the generation service.
///
/// Deterministic: identical (template, context, history, question) inputs
/// produce byte-identical payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptPayload {
    /// System message
    pub system: String,

    /// User message
    pub user: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_default_is_valid_yaml_roundtrip() {
        let def = TemplateDefinition::builtin_default();
        let yaml = serde_yaml::to_string(&def).unwrap();
        let parsed: TemplateDefinition = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.name, "default");
        assert_eq!(parsed.layout, def.layout);
    }

    #[test]
    fn test_builtin_default_references_known_slots_only() {
        let def = TemplateDefinition::builtin_default();
        crate::builder::validate_layout(&def.layout).unwrap();
    }
}
