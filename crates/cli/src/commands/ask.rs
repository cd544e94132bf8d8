//! Ask command handler.
//!
//! Runs one turn of the answering pipeline: builds the search and
//! generation clients from configuration, optionally pins a selected
//! property, and prints the formatted answer.

use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use sumika_chat::{ContextRetriever, ConversationStore, PipelineSettings, QueryPipeline, Utterance};
use sumika_core::{config::AppConfig, AppError, AppResult};
use sumika_llm::{create_client, GenerationSettings, ResponseGenerator, RetryPolicy};
use sumika_prompt::load_template;
use sumika_search::{create_search_client, DocumentSearch, PropertySnapshot};

/// Ask a question about the area
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Conversation session id
    #[arg(short, long, default_value = "default")]
    pub session: String,

    /// Property record id to pin into the context
    #[arg(long)]
    pub property: Option<String>,

    /// Restrict retrieval to one municipality (e.g. 川越市)
    #[arg(long)]
    pub municipality: Option<String>,

    /// Prompt template name
    #[arg(short, long, default_value = "default")]
    pub template: String,

    /// Output the full answer structure as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!(session = %self.session, "Executing ask command");

        let search = self.build_search_client(config)?;
        let selected_property = self.fetch_selected_property(&search).await?;

        let template = load_template(&config.data_dir, &self.template)?;

        let llm_key = AppConfig::resolve_key(&config.generation.api_key_env);
        let llm = create_client(
            &config.generation.provider,
            None,
            llm_key.as_deref(),
            Duration::from_secs(config.generation.timeout_secs),
        )?;

        let generator = ResponseGenerator::new(
            llm,
            GenerationSettings {
                model: config.generation.model.clone(),
                temperature: config.generation.temperature,
                max_tokens: config.generation.max_tokens,
            },
            RetryPolicy::new(
                config.generation.max_attempts,
                Duration::from_millis(config.generation.backoff_ms),
            ),
        );

        let store = Arc::new(ConversationStore::new(&config.data_dir));
        let mut retrieval = config.retrieval.clone();
        if self.municipality.is_some() {
            retrieval.municipality = self.municipality.clone();
        }
        let retriever = ContextRetriever::new(search, retrieval);

        let pipeline = QueryPipeline::new(
            store,
            retriever,
            generator,
            template,
            PipelineSettings {
                budget_chars: config.context.budget_chars,
                max_history_turns: config.history.max_turns,
                deadline: Duration::from_secs(config.pipeline.deadline_secs),
            },
        );

        let utterance = Utterance::new(self.session.clone(), self.question.clone());
        let answer = pipeline.answer(utterance, selected_property).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&answer)?);
        } else {
            println!("{}", answer.main);
            for detail in &answer.details {
                println!("\n【{}】\n{}", detail.label, detail.text);
            }
            if answer.context.degraded {
                println!("\n（注：資料検索が利用できなかったため、一般的な情報に基づく回答です）");
            }
        }

        Ok(())
    }

    fn build_search_client(&self, config: &AppConfig) -> AppResult<Arc<dyn DocumentSearch>> {
        let search_key = AppConfig::resolve_key(&config.search.api_key_env);
        create_search_client(
            &config.search,
            search_key.as_deref(),
            Duration::from_secs(config.retrieval.timeout_secs),
        )
    }

    async fn fetch_selected_property(
        &self,
        search: &Arc<dyn DocumentSearch>,
    ) -> AppResult<Option<PropertySnapshot>> {
        let Some(ref property_id) = self.property else {
            return Ok(None);
        };

        match search.fetch_property(property_id).await? {
            Some(snapshot) => {
                tracing::debug!(property = %snapshot.name, "Pinned property into context");
                Ok(Some(snapshot))
            }
            None => Err(AppError::Search(format!(
                "Property record not found: {}",
                property_id
            ))),
        }
    }
}
