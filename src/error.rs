//! Error types for the `docqa` crate.

use thiserror::Error;

/// Distinguishes why a generation request failed, so callers can branch on
/// the remediation action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationErrorKind {
    /// No credential was configured at all.
    MissingCredential,
    /// A credential was supplied but the remote endpoint rejected it.
    InvalidCredential,
    /// A transient failure: timeout, connection error, rate limit, or a
    /// server-side error. Retrying later may succeed.
    Transient,
}

impl std::fmt::Display for GenerationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::MissingCredential => "missing credential",
            Self::InvalidCredential => "invalid credential",
            Self::Transient => "transient",
        };
        f.write_str(s)
    }
}

/// Errors that can occur in document question-answering operations.
#[derive(Debug, Error)]
pub enum QaError {
    /// A document could not be loaded or parsed.
    #[error("failed to load document '{source_name}': {message}")]
    Load {
        /// The file name or identifier of the document.
        source_name: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An error during embedding generation, including dimension mismatches.
    #[error("embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error in the vector store backend.
    #[error("vector store error ({backend}): {message}")]
    VectorStore {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// The caller supplied invalid input, e.g. an empty question or a
    /// question asked before any document was indexed.
    #[error("validation error: {0}")]
    Validation(String),

    /// A remote generation failure. The `kind` tells the caller whether the
    /// credential is missing, rejected, or whether the failure is transient.
    #[error("generation error ({kind}): {message}")]
    Generation {
        /// Which remediation path applies.
        kind: GenerationErrorKind,
        /// A description of the failure. Never contains the credential.
        message: String,
    },
}

/// A convenience result type for question-answering operations.
pub type Result<T> = std::result::Result<T, QaError>;
