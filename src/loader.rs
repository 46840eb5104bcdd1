//! Document loaders: turn a source file into ordered text segments.
//!
//! This module provides the [`DocumentLoader`] trait and two implementations:
//!
//! - [`PdfLoader`] — one segment per PDF page (feature `pdf`)
//! - [`TextLoader`] — a plain-text file as a single segment

use std::path::Path;

use crate::document::{LoadedDocument, Segment};
use crate::error::{QaError, Result};

/// A loader that extracts ordered text segments from a source file.
///
/// Loading is a blocking operation; failures are surfaced immediately with
/// [`QaError::Load`] and never retried.
pub trait DocumentLoader: Send + Sync {
    /// Load and extract text from the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Load`] if the file is unreadable, cannot be
    /// parsed, or yields no text.
    fn load(&self, path: &Path) -> Result<LoadedDocument>;

    /// Load a document supplied as raw bytes, e.g. an upload held in
    /// memory. `name` identifies the document in errors and provenance.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Load`] if the bytes cannot be parsed or yield
    /// no text.
    fn load_bytes(&self, name: &str, bytes: &[u8]) -> Result<LoadedDocument>;
}

/// The display name used when a path has no readable file name.
fn name_of(path: &Path) -> String {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("unknown").to_string()
}

fn file_size(path: &Path, name: &str) -> Result<u64> {
    std::fs::metadata(path).map(|m| m.len()).map_err(|e| QaError::Load {
        source_name: name.to_string(),
        message: format!("cannot read file: {e}"),
    })
}

/// Loads PDF files, producing one [`Segment`] per page.
///
/// Uses `pdf-extract` for text extraction. Pages that are empty after
/// trimming are skipped; a document where every page is empty fails with
/// [`QaError::Load`] since there is nothing to index.
#[cfg(feature = "pdf")]
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfLoader;

#[cfg(feature = "pdf")]
impl PdfLoader {
    /// Create a new `PdfLoader`.
    pub fn new() -> Self {
        Self
    }
}

/// Extract per-page text from a PDF on disk.
///
/// `pdf-extract` is known to panic on some malformed files, so the call is
/// wrapped in `catch_unwind` and a panic is reported as a parse failure.
#[cfg(feature = "pdf")]
fn extract_pages(path: &Path, name: &str) -> Result<Vec<Segment>> {
    let pages = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        pdf_extract::extract_text_by_pages(path)
    }));

    let pages = match pages {
        Ok(Ok(pages)) => pages,
        Ok(Err(e)) => {
            tracing::error!(document = name, error = %e, "PDF text extraction failed");
            return Err(QaError::Load {
                source_name: name.to_string(),
                message: format!(
                    "incompatible or corrupt PDF ({e}); try re-exporting it from its source application"
                ),
            });
        }
        Err(panic) => {
            let detail = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!(document = name, detail = %detail, "PDF extractor panicked");
            return Err(QaError::Load {
                source_name: name.to_string(),
                message: format!("PDF extractor failed on this file: {detail}"),
            });
        }
    };

    let segments: Vec<Segment> = pages
        .iter()
        .enumerate()
        .filter_map(|(i, text)| {
            let text = text.trim();
            if text.is_empty() {
                None
            } else {
                Some(Segment { page: i + 1, text: text.to_string() })
            }
        })
        .collect();

    if segments.is_empty() {
        return Err(QaError::Load {
            source_name: name.to_string(),
            message: "no text could be extracted from this document".to_string(),
        });
    }

    tracing::info!(document = name, page_count = segments.len(), "extracted PDF text");
    Ok(segments)
}

#[cfg(feature = "pdf")]
impl DocumentLoader for PdfLoader {
    fn load(&self, path: &Path) -> Result<LoadedDocument> {
        let name = name_of(path);
        let byte_size = file_size(path, &name)?;
        let segments = extract_pages(path, &name)?;
        Ok(LoadedDocument { name, byte_size, segments })
    }

    /// Writes the bytes to a temporary file which is removed again once
    /// extraction finishes.
    fn load_bytes(&self, name: &str, bytes: &[u8]) -> Result<LoadedDocument> {
        use std::io::Write;

        let mut tmp = tempfile::NamedTempFile::new().map_err(|e| QaError::Load {
            source_name: name.to_string(),
            message: format!("cannot create temporary file: {e}"),
        })?;
        tmp.write_all(bytes).map_err(|e| QaError::Load {
            source_name: name.to_string(),
            message: format!("cannot write temporary file: {e}"),
        })?;

        let segments = extract_pages(tmp.path(), name)?;
        // The temporary file is deleted when `tmp` drops.
        Ok(LoadedDocument { name: name.to_string(), byte_size: bytes.len() as u64, segments })
    }
}

/// Loads a plain-text file as a single page-1 segment.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextLoader;

impl TextLoader {
    /// Create a new `TextLoader`.
    pub fn new() -> Self {
        Self
    }

    fn document_from(name: String, byte_size: u64, text: &str) -> Result<LoadedDocument> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(QaError::Load {
                source_name: name,
                message: "file contains no text".to_string(),
            });
        }

        Ok(LoadedDocument {
            name,
            byte_size,
            segments: vec![Segment { page: 1, text: trimmed.to_string() }],
        })
    }
}

impl DocumentLoader for TextLoader {
    fn load(&self, path: &Path) -> Result<LoadedDocument> {
        let name = name_of(path);
        let byte_size = file_size(path, &name)?;
        let text = std::fs::read_to_string(path).map_err(|e| QaError::Load {
            source_name: name.clone(),
            message: format!("cannot read file as UTF-8 text: {e}"),
        })?;
        Self::document_from(name, byte_size, &text)
    }

    fn load_bytes(&self, name: &str, bytes: &[u8]) -> Result<LoadedDocument> {
        let text = std::str::from_utf8(bytes).map_err(|e| QaError::Load {
            source_name: name.to_string(),
            message: format!("bytes are not valid UTF-8 text: {e}"),
        })?;
        Self::document_from(name.to_string(), bytes.len() as u64, text)
    }
}
