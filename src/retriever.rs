//! The retrieval capability: a query interface bound to one built index.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::document::SearchResult;
use crate::embedding::EmbeddingProvider;
use crate::error::{QaError, Result};
use crate::vectorstore::VectorStore;

/// A bound reference to a built index plus the embedding function it was
/// built with.
///
/// From the caller's perspective this is a pure function from query text to
/// ranked chunks; cloning shares the same underlying index.
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    top_k: usize,
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("top_k", &self.top_k)
            .finish_non_exhaustive()
    }
}

impl Retriever {
    /// Bind an embedder and a populated store into a retrieval capability.
    pub(crate) fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        top_k: usize,
    ) -> Self {
        Self { embedder, store, top_k }
    }

    /// Return the configured number of results per query.
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Embed the query text and return the `top_k` most similar chunks,
    /// ordered by decreasing similarity.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Embedding`] if the query cannot be embedded and
    /// [`QaError::VectorStore`] if the search itself fails.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>> {
        debug!(query_len = query.len(), top_k = self.top_k, "retrieving");

        let query_embedding = self.embedder.embed(query).await.map_err(|e| {
            error!(error = %e, "query embedding failed");
            e
        })?;

        if query_embedding.len() != self.embedder.dimensions() {
            return Err(QaError::Embedding {
                provider: self.embedder.name().to_string(),
                message: format!(
                    "query embedding has dimension {}, index expects {}",
                    query_embedding.len(),
                    self.embedder.dimensions()
                ),
            });
        }

        let results = self.store.search(&query_embedding, self.top_k).await?;
        info!(result_count = results.len(), "retrieval completed");
        Ok(results)
    }
}
