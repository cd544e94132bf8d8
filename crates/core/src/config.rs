//! Configuration management.
//!
//! Configuration is layered, later layers winning:
//! defaults < `.sumika/config.yaml` < environment variables < CLI flags.
//!
//! Credentials are environment-only (`OPENAI_API_KEY`, `PINECONE_API_KEY`);
//! the config file never holds secrets, only the names of the variables
//! they live in.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding templates/, history/ and config.yaml
    pub data_dir: PathBuf,

    /// Optional explicit config file path
    pub config_file: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (implies debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Document-search backend settings
    pub search: SearchConfig,

    /// Retrieval behavior
    pub retrieval: RetrievalConfig,

    /// Context assembly budget
    pub context: ContextConfig,

    /// Conversation history settings
    pub history: HistoryConfig,

    /// Generation provider settings
    pub generation: GenerationConfig,

    /// Per-turn pipeline settings
    pub pipeline: PipelineConfig,
}

/// Document-search backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Backend identifier: "pinecone" or "memory"
    pub backend: String,

    /// Index endpoint (e.g. the Pinecone index host URL)
    pub endpoint: Option<String>,

    /// Namespace holding regional documents
    pub namespace: String,

    /// Namespace holding property records
    pub property_namespace: String,

    /// Deployment-specific assistant identity, when the backend needs one
    pub assistant_name: Option<String>,

    /// Environment variable holding the search API key
    pub api_key_env: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            backend: "pinecone".to_string(),
            endpoint: None,
            namespace: "region".to_string(),
            property_namespace: "property".to_string(),
            assistant_name: None,
            api_key_env: "PINECONE_API_KEY".to_string(),
        }
    }
}

/// Retrieval behavior at the search boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Baseline number of passages to request
    pub top_k: usize,

    /// Similarity cutoff; passages scoring below this are discarded
    pub similarity_threshold: f32,

    /// Total attempts against the search backend before degrading
    pub max_retries: u32,

    /// Base backoff delay between attempts, doubled per attempt
    pub backoff_ms: u64,

    /// Per-request timeout toward the search backend
    pub timeout_secs: u64,

    /// Restrict every search to this municipality
    pub municipality: Option<String>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            similarity_threshold: 0.7,
            max_retries: 3,
            backoff_ms: 250,
            timeout_secs: 10,
            municipality: None,
        }
    }
}

/// Context assembly budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Maximum characters of passage/property text in one context block
    pub budget_chars: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self { budget_chars: 4000 }
    }
}

/// Conversation history settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Newest turns included in prompt construction
    pub max_turns: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_turns: 5 }
    }
}

/// Generation provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Provider identifier: "openai" or "mock"
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Total attempts for rate-limited requests
    pub max_attempts: u32,

    /// Base backoff delay between attempts, doubled per attempt
    pub backoff_ms: u64,

    /// Per-request timeout toward the generation service
    pub timeout_secs: u64,

    /// Environment variable holding the provider API key
    pub api_key_env: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            max_attempts: 3,
            backoff_ms: 500,
            timeout_secs: 30,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

/// Per-turn pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// End-to-end deadline for one turn, in seconds
    pub deadline_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { deadline_secs: 60 }
    }
}

/// Config file structure (.sumika/config.yaml).
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    search: Option<SearchConfig>,
    retrieval: Option<RetrievalConfig>,
    context: Option<ContextConfig>,
    history: Option<HistoryConfig>,
    generation: Option<GenerationConfig>,
    pipeline: Option<PipelineConfig>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".sumika"),
            config_file: None,
            log_level: None,
            verbose: false,
            no_color: false,
            search: SearchConfig::default(),
            retrieval: RetrievalConfig::default(),
            context: ContextConfig::default(),
            history: HistoryConfig::default(),
            generation: GenerationConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file and environment.
    ///
    /// Environment variables:
    /// - `SUMIKA_DATA_DIR`: data directory (default `.sumika`)
    /// - `SUMIKA_CONFIG`: explicit config file path
    /// - `SUMIKA_MODEL`: generation model identifier
    /// - `SUMIKA_PROVIDER`: generation provider
    /// - `SUMIKA_SEARCH_BACKEND`: document-search backend
    /// - `PINECONE_INDEX_HOST`: search index endpoint
    /// - `PINECONE_NAMESPACE`: document namespace
    /// - `PINECONE_ASSISTANT_NAME`: deployment assistant identity
    /// - `RUST_LOG`: log level
    /// - `NO_COLOR`: disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("SUMIKA_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(path) = std::env::var("SUMIKA_CONFIG") {
            config.config_file = Some(PathBuf::from(path));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.data_dir.join("config.yaml"));
        if config_path.exists() {
            config.merge_yaml(&config_path)?;
        }

        // Environment overrides YAML
        if let Ok(provider) = std::env::var("SUMIKA_PROVIDER") {
            config.generation.provider = provider;
        }
        if let Ok(model) = std::env::var("SUMIKA_MODEL") {
            config.generation.model = model;
        }
        if let Ok(backend) = std::env::var("SUMIKA_SEARCH_BACKEND") {
            config.search.backend = backend;
        }
        if let Ok(host) = std::env::var("PINECONE_INDEX_HOST") {
            config.search.endpoint = Some(host);
        }
        if let Ok(ns) = std::env::var("PINECONE_NAMESPACE") {
            config.search.namespace = ns;
        }
        if let Ok(name) = std::env::var("PINECONE_ASSISTANT_NAME") {
            config.search.assistant_name = Some(name);
        }
        config.log_level = std::env::var("RUST_LOG").ok();
        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML config file into this config, section by section.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<()> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        if let Some(search) = file.search {
            self.search = search;
        }
        if let Some(retrieval) = file.retrieval {
            self.retrieval = retrieval;
        }
        if let Some(context) = file.context {
            self.context = context;
        }
        if let Some(history) = file.history {
            self.history = history;
        }
        if let Some(generation) = file.generation {
            self.generation = generation;
        }
        if let Some(pipeline) = file.pipeline {
            self.pipeline = pipeline;
        }
        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(())
    }

    /// Apply CLI overrides; flags win over environment and file.
    pub fn with_overrides(
        mut self,
        data_dir: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(data_dir) = data_dir {
            self.data_dir = data_dir;
        }
        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }
        if let Some(provider) = provider {
            self.generation.provider = provider;
        }
        if let Some(model) = model {
            self.generation.model = model;
        }
        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }
        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }
        if no_color {
            self.no_color = true;
        }
        self
    }

    /// Ensure the data directory exists.
    pub fn ensure_data_dir(&self) -> AppResult<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir).map_err(|e| {
                AppError::Config(format!(
                    "Failed to create data directory {:?}: {}",
                    self.data_dir, e
                ))
            })?;
        }
        Ok(())
    }

    /// Resolve an API key from the named environment variable.
    pub fn resolve_key(env_var: &str) -> Option<String> {
        std::env::var(env_var).ok().filter(|v| !v.is_empty())
    }

    /// Validate backend and provider identifiers.
    pub fn validate(&self) -> AppResult<()> {
        let known_backends = ["pinecone", "memory"];
        if !known_backends.contains(&self.search.backend.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown search backend: {}. Supported: {}",
                self.search.backend,
                known_backends.join(", ")
            )));
        }

        let known_providers = ["openai", "mock"];
        if !known_providers.contains(&self.generation.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown generation provider: {}. Supported: {}",
                self.generation.provider,
                known_providers.join(", ")
            )));
        }

        if self.retrieval.top_k == 0 {
            return Err(AppError::Config("retrieval.top_k must be > 0".to_string()));
        }
        if self.context.budget_chars == 0 {
            return Err(AppError::Config(
                "context.budget_chars must be > 0".to_string(),
            ));
        }
        if self.generation.max_attempts == 0 {
            return Err(AppError::Config(
                "generation.max_attempts must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.search.backend, "pinecone");
        assert_eq!(config.generation.provider, "openai");
        assert_eq!(config.retrieval.top_k, 10);
        assert!((config.retrieval.similarity_threshold - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.history.max_turns, 5);
        assert_eq!(config.pipeline.deadline_secs, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default().with_overrides(
            Some(PathBuf::from("/tmp/sumika-test")),
            None,
            Some("mock".to_string()),
            Some("test-model".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(config.data_dir, PathBuf::from("/tmp/sumika-test"));
        assert_eq!(config.generation.provider, "mock");
        assert_eq!(config.generation.model, "test-model");
        assert!(config.verbose);
        assert_eq!(config.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_merge_yaml_section_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "retrieval:\n  top_k: 3\n  similarity_threshold: 0.5\nhistory:\n  max_turns: 2\nlogging:\n  level: warn\n",
        )
        .unwrap();

        let mut config = AppConfig::default();
        config.merge_yaml(&path).unwrap();

        assert_eq!(config.retrieval.top_k, 3);
        assert!((config.retrieval.similarity_threshold - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.history.max_turns, 2);
        assert_eq!(config.log_level, Some("warn".to_string()));
        // Untouched sections keep defaults
        assert_eq!(config.context.budget_chars, 4000);
    }

    #[test]
    fn test_merge_yaml_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "retrieval: [not, a, mapping]").unwrap();

        let mut config = AppConfig::default();
        assert!(config.merge_yaml(&path).is_err());
    }

    #[test]
    fn test_validate_unknown_backend() {
        let mut config = AppConfig::default();
        config.search.backend = "elasticsearch".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_top_k() {
        let mut config = AppConfig::default();
        config.retrieval.top_k = 0;
        assert!(config.validate().is_err());
    }
}
