//! Pipeline orchestrator: ingestion and the answer flow.
//!
//! [`QaPipeline`] composes a [`DocumentLoader`], a [`Chunker`], an
//! [`EmbeddingProvider`], and a [`GenerationProvider`]. Processing a
//! document builds a fresh index and returns a [`Retriever`] bound to it;
//! answering a question runs validate → retrieve → prompt → generate.
//!
//! # Example
//!
//! ```rust,ignore
//! use docqa::{QaConfig, QaPipeline};
//!
//! let config = QaConfig::builder().api_key(key).build()?;
//! let pipeline = QaPipeline::from_config(config)?;
//!
//! let retriever = pipeline.process_document(Path::new("report.pdf")).await?;
//! let answer = pipeline.answer(&retriever, "What is the conclusion?").await?;
//! ```

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::chunking::{Chunker, FixedSizeChunker};
use crate::config::QaConfig;
use crate::document::LoadedDocument;
use crate::embedding::EmbeddingProvider;
use crate::error::{QaError, Result};
use crate::generation::GenerationProvider;
use crate::inmemory::InMemoryVectorStore;
use crate::loader::DocumentLoader;
use crate::prompt;
use crate::retriever::Retriever;
use crate::vectorstore::VectorStore;

/// Produces a fresh, empty index for each processed document.
pub type VectorStoreFactory = dyn Fn() -> Arc<dyn VectorStore> + Send + Sync;

/// The question-answering pipeline.
///
/// Stateless apart from its configuration: every processed document gets
/// its own index from the store factory, so a failed re-ingestion never
/// touches a previously returned [`Retriever`]. Construct one via
/// [`QaPipeline::builder()`] or [`QaPipeline::from_config()`].
pub struct QaPipeline {
    config: QaConfig,
    loader: Arc<dyn DocumentLoader>,
    chunker: Arc<dyn Chunker>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    generation_provider: Arc<dyn GenerationProvider>,
    store_factory: Arc<VectorStoreFactory>,
}

impl QaPipeline {
    /// Create a new [`QaPipelineBuilder`].
    pub fn builder() -> QaPipelineBuilder {
        QaPipelineBuilder::default()
    }

    /// Build a pipeline from a validated [`QaConfig`] with the default
    /// components: PDF loader, fixed-size chunker, OpenAI providers, and
    /// in-memory indexes.
    #[cfg(all(feature = "openai", feature = "pdf"))]
    pub fn from_config(config: QaConfig) -> Result<Self> {
        let embedder = crate::openai::OpenAiEmbeddingProvider::from_config(&config)?;
        let generator = crate::openai::OpenAiGenerationProvider::from_config(&config)?;

        Self::builder()
            .config(config)
            .loader(Arc::new(crate::loader::PdfLoader::new()))
            .embedding_provider(Arc::new(embedder))
            .generation_provider(Arc::new(generator))
            .build()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &QaConfig {
        &self.config
    }

    /// Process a document from disk: load → chunk → embed → index.
    ///
    /// Returns a [`Retriever`] bound to the freshly built index.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Load`] if the file cannot be parsed and
    /// [`QaError::Embedding`] if embedding fails or a vector has the wrong
    /// dimension. On error no index is returned and any previously built
    /// index is unaffected.
    pub async fn process_document(&self, path: &Path) -> Result<Retriever> {
        let document = self.loader.load(path)?;
        self.index_document(&document).await
    }

    /// Process a document supplied as raw bytes, e.g. a web upload.
    pub async fn process_bytes(&self, name: &str, bytes: &[u8]) -> Result<Retriever> {
        let document = self.loader.load_bytes(name, bytes)?;
        self.index_document(&document).await
    }

    /// Chunk, embed, and index an already-loaded document.
    pub async fn index_document(&self, document: &LoadedDocument) -> Result<Retriever> {
        let mut chunks = self.chunker.chunk(&document.name, &document.segments);
        if chunks.is_empty() {
            return Err(QaError::Load {
                source_name: document.name.clone(),
                message: "document produced no chunks to index".to_string(),
            });
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedding_provider.embed_batch(&texts).await.map_err(|e| {
            error!(document.name = %document.name, error = %e, "embedding failed during ingestion");
            e
        })?;

        // The index only holds vectors of one dimension; reject any
        // malformed response before it gets stored.
        let expected = self.embedding_provider.dimensions();
        if embeddings.len() != chunks.len() {
            return Err(QaError::Embedding {
                provider: self.embedding_provider.name().to_string(),
                message: format!(
                    "provider returned {} embeddings for {} chunks",
                    embeddings.len(),
                    chunks.len()
                ),
            });
        }
        for (i, embedding) in embeddings.iter().enumerate() {
            if embedding.len() != expected {
                return Err(QaError::Embedding {
                    provider: self.embedding_provider.name().to_string(),
                    message: format!(
                        "chunk {i} embedding has dimension {}, expected {expected}",
                        embedding.len()
                    ),
                });
            }
        }

        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = embedding;
        }

        let store = (self.store_factory)();
        store.insert(&chunks).await.map_err(|e| {
            error!(document.name = %document.name, error = %e, "index insert failed");
            e
        })?;

        info!(
            document.name = %document.name,
            chunk_count = chunks.len(),
            page_count = document.segments.len(),
            "indexed document"
        );

        Ok(Retriever::new(self.embedding_provider.clone(), store, self.config.top_k))
    }

    /// Answer a question against a previously built index.
    ///
    /// Runs the query flow: validate → retrieve → format context → render
    /// prompt → generate. The generated text is returned verbatim as one
    /// unit.
    ///
    /// # Errors
    ///
    /// - [`QaError::Validation`] if the question is empty after trimming;
    ///   no retrieval or generation capability is invoked in that case.
    /// - [`QaError::Embedding`] / [`QaError::VectorStore`] if retrieval
    ///   fails.
    /// - [`QaError::Generation`] if the remote completion fails; the error
    ///   kind distinguishes missing credential, invalid credential, and
    ///   transient failures.
    pub async fn answer(&self, retriever: &Retriever, question: &str) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(QaError::Validation("question must not be empty".to_string()));
        }

        debug!(phase = "retrieving", "answer flow started");
        let results = retriever.retrieve(question).await?;

        debug!(phase = "prompting", result_count = results.len(), "formatting context");
        let context = prompt::format_context(&results);
        let filled = prompt::render(&context, question);

        debug!(phase = "generating", prompt_len = filled.len(), "invoking generation");
        let answer = self.generation_provider.generate(&filled).await.map_err(|e| {
            error!(error = %e, "generation failed");
            e
        })?;

        info!(answer_len = answer.len(), "query completed");
        Ok(answer)
    }
}

/// Builder for constructing a [`QaPipeline`].
///
/// `config`, `loader`, `embedding_provider`, and `generation_provider` are
/// required. The chunker defaults to a [`FixedSizeChunker`] with the
/// configured size and overlap; the store factory defaults to fresh
/// [`InMemoryVectorStore`]s.
#[derive(Default)]
pub struct QaPipelineBuilder {
    config: Option<QaConfig>,
    loader: Option<Arc<dyn DocumentLoader>>,
    chunker: Option<Arc<dyn Chunker>>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    generation_provider: Option<Arc<dyn GenerationProvider>>,
    store_factory: Option<Arc<VectorStoreFactory>>,
}

impl QaPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: QaConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the document loader.
    pub fn loader(mut self, loader: Arc<dyn DocumentLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the generation provider.
    pub fn generation_provider(mut self, provider: Arc<dyn GenerationProvider>) -> Self {
        self.generation_provider = Some(provider);
        self
    }

    /// Set the factory producing one fresh index per processed document.
    pub fn store_factory(mut self, factory: Arc<VectorStoreFactory>) -> Self {
        self.store_factory = Some(factory);
        self
    }

    /// Build the [`QaPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Config`] if any required field is missing.
    pub fn build(self) -> Result<QaPipeline> {
        let config =
            self.config.ok_or_else(|| QaError::Config("config is required".to_string()))?;
        let loader =
            self.loader.ok_or_else(|| QaError::Config("loader is required".to_string()))?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| QaError::Config("embedding_provider is required".to_string()))?;
        let generation_provider = self
            .generation_provider
            .ok_or_else(|| QaError::Config("generation_provider is required".to_string()))?;

        let chunker = match self.chunker {
            Some(chunker) => chunker,
            None => Arc::new(FixedSizeChunker::new(config.chunk_size, config.chunk_overlap)?),
        };
        let store_factory: Arc<VectorStoreFactory> = match self.store_factory {
            Some(factory) => factory,
            None => Arc::new(|| Arc::new(InMemoryVectorStore::new()) as Arc<dyn VectorStore>),
        };

        Ok(QaPipeline {
            config,
            loader,
            chunker,
            embedding_provider,
            generation_provider,
            store_factory,
        })
    }
}
