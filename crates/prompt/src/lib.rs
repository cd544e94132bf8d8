//! Prompt system for sumika.
//!
//! Turns a user-editable template plus the per-turn inputs (assembled
//! context, conversation history, question) into the exact request payload
//! for the generation service. Templates are validated against a fixed slot
//! vocabulary so a typo in a template is a loud configuration error, not a
//! silent blank in the prompt.

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::{build_prompt, render_history, validate_layout};
pub use loader::{list_templates, load_template};
pub use types::{HistoryEntry, PromptPayload, TemplateDefinition, TEMPLATE_SLOTS};
