//! LLM integration crate for sumika.
//!
//! Provides a provider-agnostic abstraction over the external language
//! generation capability, a classified failure model (auth, rate limit,
//! timeout, invalid output), and the bounded-retry response generator the
//! answering pipeline calls.
//!
//! # Providers
//! - **OpenAI**: chat completions (default)
//! - **Mock**: scripted outcomes for tests and offline development

pub mod client;
pub mod factory;
pub mod generator;
pub mod providers;
pub mod retry;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use generator::{GenerationSettings, ResponseGenerator};
pub use providers::{MockLlmClient, MockOutcome, OpenAiClient};
pub use retry::RetryPolicy;
