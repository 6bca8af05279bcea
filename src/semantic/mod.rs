//! Local implementations of the search collaborators.
//!
//! # Architecture
//!
//! - `embeddings`: Wraps fastembed for embedding generation
//! - `index`: In-memory vector index with cosine similarity search
//! - `preprocess`: Text preprocessing for embedding input

pub mod embeddings;
mod index;
mod preprocess;

pub use embeddings::EmbeddingModel;
pub use index::MemoryIndex;
pub use preprocess::preprocess_product;
