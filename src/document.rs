//! Data types for loaded documents, segments, chunks, and search results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One logical unit of extracted document text, typically a page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    /// 1-based page number within the source document.
    pub page: usize,
    /// The cleaned text of this segment.
    pub text: String,
}

/// A document after text extraction, ready for chunking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoadedDocument {
    /// The file name or identifier of the source document.
    pub name: String,
    /// Size of the source file in bytes.
    pub byte_size: u64,
    /// Extracted segments in source order.
    pub segments: Vec<Segment>,
}

/// A bounded-length span of document text used as a retrieval unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier for the chunk, `{document_id}_{chunk_index}`.
    pub id: String,
    /// The text content of the chunk.
    pub text: String,
    /// The vector embedding for this chunk's text.
    pub embedding: Vec<f32>,
    /// Provenance metadata: at least `chunk_index` and `page`.
    pub metadata: HashMap<String, String>,
    /// The identifier of the parent document.
    pub document_id: String,
}

/// A retrieved [`Chunk`] paired with a relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The similarity score (higher is more relevant).
    pub score: f32,
}
