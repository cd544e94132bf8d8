//! Document-search backend implementations.

pub mod memory;
pub mod pinecone;

pub use memory::MemoryIndex;
pub use pinecone::PineconeClient;
