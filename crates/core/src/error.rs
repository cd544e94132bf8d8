//! Error types for the sumika answering pipeline.
//!
//! One unified enum covers configuration and I/O faults as well as the
//! typed turn-level conditions the pipeline reports: retrieval degradation,
//! template misconfiguration, authentication failures, transient provider
//! pressure, and the end-to-end deadline.
//!
//! Callers that talk to end users must go through [`AppError::user_message`]
//! instead of `Display`: the `Display` form carries operator detail
//! (provider error strings, paths) that is never shown in a chat answer.

use thiserror::Error;

/// Unified error type for sumika.
///
/// All fallible functions return `Result<T, AppError>`. We never panic;
/// errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A prompt template references an unknown slot or is otherwise invalid.
    /// Fatal to the turn; visible to whoever edits templates.
    #[error("Template error: {0}")]
    Template(String),

    /// Document-search backend fault that is not transient (bad request,
    /// unknown namespace, malformed response).
    #[error("Search error: {0}")]
    Search(String),

    /// Document search could not be reached within the retry budget.
    /// The pipeline degrades to answering without retrieved context.
    #[error("Retrieval unavailable: {0}")]
    RetrievalUnavailable(String),

    /// Bad or missing credential for an external service. Never retried.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Provider rate limit. Transient; retried with backoff.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// A network or provider call exceeded its own timeout. Transient.
    #[error("Timed out: {0}")]
    Timeout(String),

    /// The generation service returned empty or malformed output.
    /// Never retried, never presented as an answer.
    #[error("Invalid response from generation service: {0}")]
    InvalidResponse(String),

    /// Generation gave up after its bounded retries.
    #[error("Generation unavailable: {0}")]
    GenerationUnavailable(String),

    /// The end-to-end per-turn deadline expired. Nothing was persisted.
    #[error("Pipeline deadline exceeded after {0} ms")]
    PipelineTimeout(u64),

    /// Conversation history persistence errors
    #[error("Store error: {0}")]
    Store(String),

    /// Unclassified LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),
}

impl AppError {
    /// Whether retrying the same operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::RateLimited(_) | AppError::Timeout(_))
    }

    /// A user-safe message for chat display.
    ///
    /// Raw provider error strings never cross this boundary; operators get
    /// the full detail through logs and `Display`.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Template(_) => {
                "申し訳ありませんが、回答テンプレートの設定に問題があります。管理者にお問い合わせください。"
            }
            AppError::RetrievalUnavailable(_) => {
                "申し訳ありませんが、資料の検索が一時的に利用できません。しばらくしてからもう一度お試しください。"
            }
            AppError::Auth(_) => {
                "申し訳ありませんが、外部サービスの認証に失敗しました。管理者にお問い合わせください。"
            }
            AppError::RateLimited(_)
            | AppError::Timeout(_)
            | AppError::GenerationUnavailable(_) => {
                "申し訳ありませんが、回答の生成が混み合っています。しばらくしてからもう一度お試しください。"
            }
            AppError::InvalidResponse(_) => {
                "申し訳ありませんが、回答の生成中にエラーが発生しました。もう一度お試しください。"
            }
            AppError::PipelineTimeout(_) => {
                "申し訳ありませんが、応答に時間がかかりすぎたため処理を中断しました。もう一度お試しください。"
            }
            _ => "申し訳ありませんが、システムエラーが発生しました。時間をおいて再度お試しください。",
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
