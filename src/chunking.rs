//! Document chunking: sliding character windows with overlap.

use std::collections::HashMap;

use crate::document::{Chunk, Segment};
use crate::error::{QaError, Result};

/// A strategy for splitting loaded segments into retrieval-sized chunks.
///
/// Implementations produce [`Chunk`]s with text and provenance metadata but
/// no embeddings; embeddings are attached later by the pipeline.
pub trait Chunker: Send + Sync {
    /// Split the segments of one document into ordered chunks.
    ///
    /// Returns an empty `Vec` if the segments contain no text.
    fn chunk(&self, document_id: &str, segments: &[Segment]) -> Vec<Chunk>;
}

/// Join segment texts into one string, separated by a newline per page break.
pub fn join_segments(segments: &[Segment]) -> String {
    segments.iter().map(|s| s.text.as_str()).collect::<Vec<_>>().join("\n")
}

/// Splits the page-joined text into fixed-size chunks by character count
/// with configurable overlap.
///
/// The window advances `chunk_size - chunk_overlap` characters per step;
/// the final chunk may be shorter. Text no longer than `chunk_size` yields
/// exactly one chunk. Windows never split inside a UTF-8 code point.
///
/// Chunk IDs are `{document_id}_{chunk_index}`. Each chunk's metadata
/// carries `chunk_index` and `page` (the page containing its first
/// character).
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per chunk
    /// * `chunk_overlap` — characters shared between consecutive chunks
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Config`] if `chunk_size` is zero or
    /// `chunk_overlap >= chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(QaError::Config("chunk_size must be greater than zero".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(QaError::Config(format!(
                "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, chunk_overlap })
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, document_id: &str, segments: &[Segment]) -> Vec<Chunk> {
        let text = join_segments(segments);
        if text.is_empty() {
            return Vec::new();
        }

        // Character offset at which each segment starts, for page lookup.
        let mut page_starts: Vec<(usize, usize)> = Vec::with_capacity(segments.len());
        let mut offset = 0;
        for segment in segments {
            page_starts.push((offset, segment.page));
            offset += segment.text.chars().count() + 1; // +1 for the joining newline
        }
        let page_of = |char_pos: usize| {
            page_starts
                .iter()
                .rev()
                .find(|(start, _)| *start <= char_pos)
                .map(|(_, page)| *page)
                .unwrap_or(1)
        };

        // Byte offset of every char boundary, so windows measured in
        // characters can slice the string safely.
        let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        boundaries.push(text.len());
        let total = boundaries.len() - 1;

        let step = self.chunk_size - self.chunk_overlap;
        let mut chunks = Vec::new();
        let mut start = 0;
        let mut chunk_index = 0;

        loop {
            let end = (start + self.chunk_size).min(total);
            let chunk_text = &text[boundaries[start]..boundaries[end]];

            let mut metadata = HashMap::new();
            metadata.insert("chunk_index".to_string(), chunk_index.to_string());
            metadata.insert("page".to_string(), page_of(start).to_string());

            chunks.push(Chunk {
                id: format!("{document_id}_{chunk_index}"),
                text: chunk_text.to_string(),
                embedding: Vec::new(),
                metadata,
                document_id: document_id.to_string(),
            });

            if end == total {
                break;
            }
            start += step;
            chunk_index += 1;
        }

        chunks
    }
}
