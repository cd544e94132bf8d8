//! Document-search boundary for sumika.
//!
//! The answering pipeline never talks to a vector store directly; it goes
//! through the [`DocumentSearch`] trait defined here. Any backend that can
//! rank passages for a text query and expose the property namespace can sit
//! behind it. The shipped implementations are a Pinecone-style HTTP index
//! and a deterministic in-memory index for tests and offline development.

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::DocumentSearch;
pub use factory::create_search_client;
pub use providers::{MemoryIndex, PineconeClient};
pub use types::{
    IndexStats, PassageMeta, PropertySnapshot, PropertySummary, SearchFilter, SearchMatch,
};
