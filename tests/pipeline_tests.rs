//! End-to-end scenarios over the pipeline and session with stub providers.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use docqa::{
    EmbeddingProvider, FALLBACK_ANSWER, GenerationProvider, QaConfig, QaError, QaPipeline,
    Session, TextLoader,
};

// ---------------------------------------------------------------------------
// Stub providers
// ---------------------------------------------------------------------------

/// Deterministic hash-based embeddings: the vector direction depends only on
/// the text content, so tests need no API keys.
struct HashEmbedder {
    dimensions: usize,
    calls: AtomicUsize,
}

impl HashEmbedder {
    fn new(dimensions: usize) -> Self {
        Self { dimensions, calls: AtomicUsize::new(0) }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> docqa::Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let mut emb = vec![0.0f32; self.dimensions];
        for (i, v) in emb.iter_mut().enumerate() {
            *v = ((hash.wrapping_add(i as u64)) as f32).sin();
        }
        let norm: f32 = emb.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            emb.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(emb)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hash-stub"
    }
}

/// An embedder that always returns vectors of the wrong length.
struct WrongDimensionEmbedder;

#[async_trait::async_trait]
impl EmbeddingProvider for WrongDimensionEmbedder {
    async fn embed(&self, _text: &str) -> docqa::Result<Vec<f32>> {
        Ok(vec![1.0, 2.0, 3.0])
    }

    fn dimensions(&self) -> usize {
        8
    }
}

/// A generator that follows the instruction template the way a cooperative
/// model would: it answers with the context sentences that share a keyword
/// with the question, and falls back to the literal refusal otherwise.
struct KeywordEchoGenerator {
    calls: AtomicUsize,
}

impl KeywordEchoGenerator {
    fn new() -> Self {
        Self { calls: AtomicUsize::new(0) }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn section<'a>(prompt: &'a str, header: &str, next: &str) -> &'a str {
        let start = prompt.find(header).map(|p| p + header.len()).unwrap_or(0);
        let end = prompt[start..].find(next).map(|p| start + p).unwrap_or(prompt.len());
        prompt[start..end].trim()
    }
}

#[async_trait::async_trait]
impl GenerationProvider for KeywordEchoGenerator {
    async fn generate(&self, prompt: &str) -> docqa::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let context = Self::section(prompt, "Context:", "Question:");
        let question = Self::section(prompt, "Question:", "Answer:");

        const STOPWORDS: &[&str] = &["what", "the", "is", "are", "was", "who", "how", "does"];
        let keywords: Vec<String> = question
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() >= 3)
            .map(|w| w.to_lowercase())
            .filter(|w| !STOPWORDS.contains(&w.as_str()))
            .collect();

        let matching: Vec<&str> = context
            .split(['.', '\n'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter(|sentence| {
                let lower = sentence.to_lowercase();
                keywords.iter().any(|k| lower.contains(k))
            })
            .collect();

        if matching.is_empty() {
            Ok(FALLBACK_ANSWER.to_string())
        } else {
            Ok(format!("{}.", matching.join(". ")))
        }
    }
}

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

fn config() -> QaConfig {
    QaConfig::builder()
        .api_key("test-key")
        .chunk_size(200)
        .chunk_overlap(50)
        .top_k(3)
        .history_limit(3)
        .build()
        .unwrap()
}

fn pipeline_with(
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn GenerationProvider>,
) -> Arc<QaPipeline> {
    Arc::new(
        QaPipeline::builder()
            .config(config())
            .loader(Arc::new(TextLoader::new()))
            .embedding_provider(embedder)
            .generation_provider(generator)
            .build()
            .unwrap(),
    )
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn answers_from_a_one_page_document() {
    let pipeline =
        pipeline_with(Arc::new(HashEmbedder::new(64)), Arc::new(KeywordEchoGenerator::new()));
    let mut session = Session::new(pipeline);

    session.process_bytes("sky.txt", b"The sky is blue.").await.unwrap();
    let answer = session.ask("What color is the sky?").await.unwrap();

    assert!(answer.contains("blue"), "answer should come from the document: {answer}");
    assert_eq!(session.total_queries(), 1);
    assert_eq!(session.document_name(), Some("sky.txt"));
}

#[tokio::test]
async fn off_topic_question_gets_the_literal_fallback() {
    let pipeline =
        pipeline_with(Arc::new(HashEmbedder::new(64)), Arc::new(KeywordEchoGenerator::new()));
    let mut session = Session::new(pipeline);

    session.process_bytes("sky.txt", b"The sky is blue.").await.unwrap();
    let answer = session.ask("Who wrote Hamlet?").await.unwrap();

    assert_eq!(answer, FALLBACK_ANSWER);
}

#[tokio::test]
async fn empty_question_is_rejected_before_any_capability_runs() {
    let embedder = Arc::new(HashEmbedder::new(64));
    let generator = Arc::new(KeywordEchoGenerator::new());
    let pipeline = pipeline_with(embedder.clone(), generator.clone());
    let mut session = Session::new(pipeline);

    session.process_bytes("sky.txt", b"The sky is blue.").await.unwrap();
    let embeds_after_ingest = embedder.calls();

    for question in ["", "   ", "\n\t"] {
        let err = session.ask(question).await.unwrap_err();
        assert!(matches!(err, QaError::Validation(_)), "got {err:?}");
    }

    assert_eq!(embedder.calls(), embeds_after_ingest, "validation must not embed");
    assert_eq!(generator.calls(), 0, "validation must not generate");
    assert!(session.history().is_empty(), "failed queries are not recorded");
}

#[tokio::test]
async fn asking_before_processing_is_a_validation_error() {
    let embedder = Arc::new(HashEmbedder::new(64));
    let generator = Arc::new(KeywordEchoGenerator::new());
    let pipeline = pipeline_with(embedder.clone(), generator.clone());
    let mut session = Session::new(pipeline);

    let err = session.ask("What color is the sky?").await.unwrap_err();
    assert!(matches!(err, QaError::Validation(_)));
    assert_eq!(embedder.calls(), 0);
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn single_chunk_index_always_returns_that_chunk() {
    let pipeline =
        pipeline_with(Arc::new(HashEmbedder::new(64)), Arc::new(KeywordEchoGenerator::new()));

    let retriever = pipeline.process_bytes("sky.txt", b"The sky is blue.").await.unwrap();
    assert_eq!(retriever.top_k(), 3);

    for query in ["completely unrelated text", "sky", "zzzz"] {
        let results = retriever.retrieve(query).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.text, "The sky is blue.");
    }
}

#[tokio::test]
async fn history_is_bounded_and_chronological() {
    let pipeline =
        pipeline_with(Arc::new(HashEmbedder::new(64)), Arc::new(KeywordEchoGenerator::new()));
    // history_limit is 3 in the fixture config.
    let mut session = Session::new(pipeline);
    session.process_bytes("sky.txt", b"The sky is blue.").await.unwrap();

    for question in ["q1 sky", "q2 sky", "q3 sky", "q4 sky"] {
        session.ask(question).await.unwrap();
    }

    let history = session.history();
    assert_eq!(history.len(), 3);
    let questions: Vec<&str> = history.iter().map(|r| r.question.as_str()).collect();
    assert_eq!(questions, vec!["q2 sky", "q3 sky", "q4 sky"]);
    for pair in history.iter().collect::<Vec<_>>().windows(2) {
        assert!(pair[0].timestamp <= pair[1].timestamp);
    }
    assert_eq!(session.total_queries(), 4);

    session.clear_history();
    assert!(session.history().is_empty());
    assert_eq!(session.total_queries(), 4);
}

#[tokio::test]
async fn wrong_dimension_embeddings_are_rejected_at_ingestion() {
    let pipeline =
        pipeline_with(Arc::new(WrongDimensionEmbedder), Arc::new(KeywordEchoGenerator::new()));

    let err = pipeline.process_bytes("sky.txt", b"The sky is blue.").await.unwrap_err();
    assert!(matches!(err, QaError::Embedding { .. }), "got {err:?}");
}

#[tokio::test]
async fn failed_reprocessing_leaves_the_existing_index_usable() {
    let pipeline =
        pipeline_with(Arc::new(HashEmbedder::new(64)), Arc::new(KeywordEchoGenerator::new()));
    let mut session = Session::new(pipeline);

    session.process_bytes("sky.txt", b"The sky is blue.").await.unwrap();

    // A byte upload that is not valid UTF-8 text fails in the loader.
    let err = session.process_bytes("broken.txt", &[0xff, 0xfe, 0x00]).await.unwrap_err();
    assert!(matches!(err, QaError::Load { .. }));

    // The previous document is still indexed and answerable.
    assert_eq!(session.document_name(), Some("sky.txt"));
    let answer = session.ask("What color is the sky?").await.unwrap();
    assert!(answer.contains("blue"));
}

#[tokio::test]
async fn missing_credential_fails_before_any_upload() {
    let err = QaConfig::builder().chunk_size(256).build().unwrap_err();
    match err {
        QaError::Generation { kind, .. } => {
            assert_eq!(kind, docqa::GenerationErrorKind::MissingCredential);
        }
        other => panic!("expected a missing-credential generation error, got {other:?}"),
    }
}
