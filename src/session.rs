//! Explicit per-user session state: the current index handle and the
//! bounded recent-query log.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{QaError, Result};
use crate::pipeline::QaPipeline;
use crate::retriever::Retriever;

/// One answered question, kept for display in the recent-query log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRecord {
    /// When the answer was produced.
    pub timestamp: DateTime<Utc>,
    /// The trimmed question text.
    pub question: String,
    /// The generated answer, verbatim.
    pub answer: String,
}

/// A single user's session: owns the retriever for the currently processed
/// document and a bounded log of recent queries.
///
/// The front end holds one `Session` per user and calls
/// [`process_document`](Session::process_document) /
/// [`ask`](Session::ask) on it. A failed operation leaves the existing
/// index and the query log untouched, so the user can simply retry.
pub struct Session {
    pipeline: Arc<QaPipeline>,
    retriever: Option<Retriever>,
    document_name: Option<String>,
    history: VecDeque<QueryRecord>,
    history_limit: usize,
    total_queries: u64,
}

impl Session {
    /// Create a session over the given pipeline, with the history bound
    /// from the pipeline configuration.
    pub fn new(pipeline: Arc<QaPipeline>) -> Self {
        let history_limit = pipeline.config().history_limit;
        Self {
            pipeline,
            retriever: None,
            document_name: None,
            history: VecDeque::new(),
            history_limit,
            total_queries: 0,
        }
    }

    /// Process a document from disk, replacing the session's index
    /// wholesale on success.
    ///
    /// # Errors
    ///
    /// On any error the previously processed document stays queryable.
    pub async fn process_document(&mut self, path: &Path) -> Result<()> {
        let retriever = self.pipeline.process_document(path).await?;
        self.install(path.file_name().and_then(|n| n.to_str()).unwrap_or("unknown"), retriever);
        Ok(())
    }

    /// Process an uploaded document supplied as raw bytes.
    pub async fn process_bytes(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        let retriever = self.pipeline.process_bytes(name, bytes).await?;
        self.install(name, retriever);
        Ok(())
    }

    fn install(&mut self, name: &str, retriever: Retriever) {
        self.retriever = Some(retriever);
        self.document_name = Some(name.to_string());
        info!(document = name, "session document replaced");
    }

    /// Ask a question against the session's current document.
    ///
    /// Successful answers are appended to the recent-query log, evicting
    /// the oldest entry beyond the configured bound. Failed queries are
    /// not recorded.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Validation`] if no document has been processed
    /// yet — the answer flow is not invoked at all in that case — or if
    /// the question is empty. Remote failures propagate as embedding or
    /// generation errors.
    pub async fn ask(&mut self, question: &str) -> Result<String> {
        let retriever = self.retriever.as_ref().ok_or_else(|| {
            QaError::Validation(
                "no document has been processed yet; upload a document first".to_string(),
            )
        })?;

        let answer = self.pipeline.answer(retriever, question).await?;

        self.history.push_back(QueryRecord {
            timestamp: Utc::now(),
            question: question.trim().to_string(),
            answer: answer.clone(),
        });
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }
        self.total_queries += 1;

        Ok(answer)
    }

    /// True once a document has been processed successfully.
    pub fn has_document(&self) -> bool {
        self.retriever.is_some()
    }

    /// Name of the currently processed document, if any.
    pub fn document_name(&self) -> Option<&str> {
        self.document_name.as_deref()
    }

    /// The recent-query log, oldest first. Never longer than the
    /// configured bound.
    pub fn history(&self) -> &VecDeque<QueryRecord> {
        &self.history
    }

    /// Drop all recent-query records.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Count of successfully answered questions over the session lifetime,
    /// independent of the bounded log.
    pub fn total_queries(&self) -> u64 {
        self.total_queries
    }
}
