// Retrieval: embed the catalog once, rank records against each query by cosine similarity.

pub mod embedding;
pub mod index;
#[cfg(test)]
pub mod mock;

pub use embedding::{Embedder, EmbeddingClient};
pub use index::{CatalogIndex, ScoredCandidate};
