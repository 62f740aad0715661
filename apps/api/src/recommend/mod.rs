// Recommendation: the query → retrieve → rerank pipeline and its HTTP handlers.
// Retrieval goes through retrieval::CatalogIndex; reranking through the Reranker trait.

pub mod handlers;
pub mod pipeline;

pub use pipeline::Recommender;
