//! LLM provider implementations.

pub mod mock;
pub mod openai;

pub use mock::{MockLlmClient, MockOutcome};
pub use openai::OpenAiClient;
