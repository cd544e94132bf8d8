//! The per-turn answering pipeline.
//!
//! Sequential per turn: load session → classify → retrieve → assemble →
//! build prompt → generate → format → append. Retrieval failure degrades
//! the turn (answering continues from history and general knowledge);
//! every other failure aborts it. The whole turn runs under one deadline,
//! and nothing is appended to the store unless generation completed: a
//! half-built turn is never persisted.

use crate::assembler::assemble;
use crate::classifier::classify;
use crate::formatter::format_answer;
use crate::retriever::ContextRetriever;
use crate::store::ConversationStore;
use crate::types::{ChatAnswer, Turn, Utterance};
use std::sync::Arc;
use std::time::Duration;
use sumika_core::{AppError, AppResult};
use sumika_llm::ResponseGenerator;
use sumika_prompt::{build_prompt, HistoryEntry, TemplateDefinition};
use sumika_search::PropertySnapshot;

/// Pipeline-level knobs.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Context budget in characters
    pub budget_chars: usize,

    /// Newest turns included in the prompt
    pub max_history_turns: usize,

    /// End-to-end deadline per turn
    pub deadline: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            budget_chars: 4000,
            max_history_turns: 5,
            deadline: Duration::from_secs(60),
        }
    }
}

/// The query-answering pipeline for one deployment.
///
/// Stateless across turns except through the conversation store; safe to
/// share behind an `Arc` and call concurrently for different sessions.
pub struct QueryPipeline {
    store: Arc<ConversationStore>,
    retriever: ContextRetriever,
    generator: ResponseGenerator,
    template: TemplateDefinition,
    settings: PipelineSettings,
}

impl QueryPipeline {
    pub fn new(
        store: Arc<ConversationStore>,
        retriever: ContextRetriever,
        generator: ResponseGenerator,
        template: TemplateDefinition,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            store,
            retriever,
            generator,
            template,
            settings,
        }
    }

    /// Answer one utterance under the end-to-end deadline.
    ///
    /// On deadline expiry the turn fails with `PipelineTimeout` and the
    /// store is untouched; in-flight retrieval/generation futures are
    /// dropped with the turn.
    pub async fn answer(
        &self,
        utterance: Utterance,
        selected_property: Option<PropertySnapshot>,
    ) -> AppResult<ChatAnswer> {
        let deadline = self.settings.deadline;
        match tokio::time::timeout(deadline, self.run_turn(utterance, selected_property)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(?deadline, "Turn exceeded end-to-end deadline");
                Err(AppError::PipelineTimeout(deadline.as_millis() as u64))
            }
        }
    }

    async fn run_turn(
        &self,
        utterance: Utterance,
        selected_property: Option<PropertySnapshot>,
    ) -> AppResult<ChatAnswer> {
        let session = self.store.load(&utterance.session_id)?;
        let intent = classify(&utterance.text);

        tracing::info!(
            session_id = %utterance.session_id,
            intent = intent.as_str(),
            history_turns = session.len(),
            "Processing turn"
        );

        let (passages, degraded) = match self.retriever.retrieve(&utterance.text, intent).await {
            Ok(passages) => (passages, false),
            Err(AppError::RetrievalUnavailable(msg)) => {
                tracing::warn!("Answering without document context: {}", msg);
                (Vec::new(), true)
            }
            Err(e) => return Err(e),
        };

        let context = assemble(passages, selected_property, self.settings.budget_chars);

        let history: Vec<HistoryEntry> = session
            .recent(self.settings.max_history_turns)
            .iter()
            .map(|t| HistoryEntry {
                question: t.question.clone(),
                answer: t.answer.clone(),
            })
            .collect();

        let payload = build_prompt(
            &self.template,
            &context.render(),
            &history,
            &utterance.text,
            self.settings.max_history_turns,
        )?;

        let raw_answer = self.generator.generate(&payload).await?;
        let formatted = format_answer(&raw_answer);
        let context_ref = context.to_context_ref(degraded);

        // Persist only after a complete, successful generation
        let turn = Turn {
            session_id: utterance.session_id.clone(),
            asked_at: utterance.received_at,
            question: utterance.text,
            answer: raw_answer,
            context: context_ref.clone(),
        };
        self.store.append(&turn)?;

        Ok(ChatAnswer {
            main: formatted.main,
            details: formatted.details,
            context: context_ref,
        })
    }
}
