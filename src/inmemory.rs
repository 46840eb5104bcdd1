//! In-memory vector store using cosine similarity.
//!
//! [`InMemoryVectorStore`] keeps chunks in insertion order inside a
//! `tokio::sync::RwLock`. It is the default index backend: the index lives
//! for one processed document and is rebuilt wholesale on the next upload,
//! so nothing ever needs to touch disk.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{Chunk, SearchResult};
use crate::error::Result;
use crate::vectorstore::VectorStore;

/// An in-memory vector store using cosine similarity for search.
///
/// Chunks are kept in a `Vec` in insertion order; search scores every
/// chunk and stable-sorts descending, so ties between equal scores resolve
/// to the earlier-inserted chunk.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    chunks: RwLock<Vec<Chunk>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn insert(&self, chunks: &[Chunk]) -> Result<()> {
        let mut store = self.chunks.write().await;
        store.extend_from_slice(chunks);
        Ok(())
    }

    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        let store = self.chunks.read().await;

        let mut scored: Vec<SearchResult> = store
            .iter()
            .map(|chunk| {
                let score = cosine_similarity(&chunk.embedding, embedding);
                SearchResult { chunk: chunk.clone(), score }
            })
            .collect();

        // sort_by is stable, so equal scores keep insertion order.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn len(&self) -> usize {
        self.chunks.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn chunk(id: &str, embedding: Vec<f32>) -> Chunk {
        Chunk {
            id: id.to_string(),
            text: format!("text of {id}"),
            embedding,
            metadata: HashMap::new(),
            document_id: "doc".to_string(),
        }
    }

    #[tokio::test]
    async fn search_returns_most_similar_first() {
        let store = InMemoryVectorStore::new();
        store
            .insert(&[
                chunk("a", vec![1.0, 0.0]),
                chunk("b", vec![0.0, 1.0]),
                chunk("c", vec![0.7, 0.7]),
            ])
            .await
            .unwrap();

        let results = store.search(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.id, "a");
        assert_eq!(results[1].chunk.id, "c");
    }

    #[tokio::test]
    async fn equal_scores_keep_insertion_order() {
        let store = InMemoryVectorStore::new();
        // Three identical embeddings: all ties.
        store
            .insert(&[
                chunk("first", vec![1.0, 1.0]),
                chunk("second", vec![1.0, 1.0]),
                chunk("third", vec![1.0, 1.0]),
            ])
            .await
            .unwrap();

        let results = store.search(&[1.0, 1.0], 3).await.unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.chunk.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn zero_magnitude_vectors_score_zero() {
        let store = InMemoryVectorStore::new();
        store.insert(&[chunk("z", vec![0.0, 0.0])]).await.unwrap();

        let results = store.search(&[1.0, 0.0], 1).await.unwrap();
        assert_eq!(results[0].score, 0.0);
    }

    #[tokio::test]
    async fn len_reports_inserted_chunks() {
        let store = InMemoryVectorStore::new();
        assert_eq!(store.len().await, 0);
        store.insert(&[chunk("a", vec![1.0])]).await.unwrap();
        assert_eq!(store.len().await, 1);
    }
}
