//! Retrieval-augmented question answering over uploaded documents.
//!
//! This crate provides:
//! - Document loading (PDF per page, plain text) into ordered segments
//! - Fixed-size overlapping chunking with page provenance
//! - Embedding and generation capability traits with OpenAI-compatible
//!   HTTP providers
//! - An in-memory cosine-similarity index behind a [`VectorStore`] seam
//! - The [`QaPipeline`] ingest-and-answer flow and an explicit [`Session`]
//!   holding the per-user index handle and bounded query log
//!
//! # Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docqa::{QaConfig, QaPipeline, Session};
//!
//! let config = QaConfig::builder().api_key(std::env::var("OPENAI_API_KEY")?).build()?;
//! let pipeline = Arc::new(QaPipeline::from_config(config)?);
//!
//! let mut session = Session::new(pipeline);
//! session.process_document("report.pdf".as_ref()).await?;
//! let answer = session.ask("What is the conclusion?").await?;
//! ```

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod inmemory;
pub mod loader;
#[cfg(feature = "openai")]
pub mod openai;
pub mod pipeline;
pub mod prompt;
pub mod retriever;
pub mod session;
pub mod vectorstore;

pub use chunking::{Chunker, FixedSizeChunker};
pub use config::{DEFAULT_MODEL, QaConfig, QaConfigBuilder};
pub use document::{Chunk, LoadedDocument, SearchResult, Segment};
pub use embedding::EmbeddingProvider;
pub use error::{GenerationErrorKind, QaError, Result};
pub use generation::GenerationProvider;
pub use inmemory::InMemoryVectorStore;
#[cfg(feature = "pdf")]
pub use loader::PdfLoader;
pub use loader::{DocumentLoader, TextLoader};
#[cfg(feature = "openai")]
pub use openai::{OpenAiEmbeddingProvider, OpenAiGenerationProvider};
pub use pipeline::{QaPipeline, QaPipelineBuilder, VectorStoreFactory};
pub use prompt::FALLBACK_ANSWER;
pub use retriever::Retriever;
pub use session::{QueryRecord, Session};
pub use vectorstore::VectorStore;
