//! Generation provider trait for remote text completion.

use async_trait::async_trait;

use crate::error::Result;

/// A remote text-completion capability.
///
/// The pipeline hands implementations a fully formatted prompt and expects
/// the generated answer back as one unit; streaming is not part of this
/// contract. Failures are reported as [`QaError::Generation`] with a
/// [`GenerationErrorKind`] the caller can branch on.
///
/// [`QaError::Generation`]: crate::QaError::Generation
/// [`GenerationErrorKind`]: crate::GenerationErrorKind
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate text for the given prompt and return it verbatim.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
