//! The sumika answering pipeline.
//!
//! One user utterance plus prior conversation state in, one grounded
//! conversational answer out. The flow per turn: classify the question,
//! retrieve passages for its intent, assemble a budgeted context block,
//! build the prompt, call generation with bounded retries, split the raw
//! answer into main text and detail sections, and append the completed turn
//! to the session history. The conversation store is the only stateful
//! component; everything else is pure in its inputs.

pub mod assembler;
pub mod classifier;
pub mod formatter;
pub mod pipeline;
pub mod retriever;
pub mod store;
pub mod types;

// Re-export main types
pub use assembler::{assemble, AssembledContext};
pub use classifier::{classify, Intent};
pub use formatter::{format_answer, DetailSection, FormattedAnswer};
pub use pipeline::{PipelineSettings, QueryPipeline};
pub use retriever::ContextRetriever;
pub use store::ConversationStore;
pub use types::{ChatAnswer, ContextRef, ConversationSession, PassageRef, Turn, Utterance};
