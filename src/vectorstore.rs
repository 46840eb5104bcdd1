//! Vector store trait: one store is one searchable index.

use async_trait::async_trait;

use crate::document::{Chunk, SearchResult};
use crate::error::Result;

/// A storage backend holding the (chunk, vector) pairs of one index.
///
/// A store is exclusively owned by the session that built it and is
/// rebuilt wholesale when a new document is processed; there is no
/// incremental update or cross-session sharing.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Append chunks to the index. Chunks must have embeddings set.
    async fn insert(&self, chunks: &[Chunk]) -> Result<()>;

    /// Search for the `top_k` chunks most similar to the given embedding.
    ///
    /// Returns results ordered by descending similarity score; equal
    /// scores keep insertion order.
    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>>;

    /// Number of chunks currently held by the index.
    async fn len(&self) -> usize;
}
