// Text source abstraction for report processing
//
// This module defines the boundary between text extraction (file -> lines)
// and table recovery (lines -> ParseResult). Everything after this boundary
// is format-agnostic and never touches the file system.

use crate::types::DocumentText;
use anyhow::{Context, Result};
use std::path::Path;

#[cfg(feature = "pdf-backend")]
use super::pdf::PdfTextSource;
use super::plain_text::PlainTextSource;

/// TextSource trait - converts a report file into its linearized text
pub trait TextSource {
    /// Extract the full text of report bytes already in memory
    fn extract_from_bytes(&self, bytes: &[u8]) -> Result<String>;

    /// Convenience method: read the report at `path` and extract it
    fn extract_text(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read report file: {}", path.display()))?;
        self.extract_from_bytes(&bytes)
    }

    /// Convenience method: extract and split into lines
    fn extract_document(&self, path: &Path) -> Result<DocumentText> {
        let text = self.extract_text(path)?;
        Ok(DocumentText::from_text(&text))
    }

    /// Get source name for debugging/logging
    fn name(&self) -> &str;

    /// Check if source supports the given file type
    fn supports_file_type(&self, path: &Path) -> bool;
}

/// Source enum for runtime selection by file extension
pub enum TextSourceImpl {
    #[cfg(feature = "pdf-backend")]
    Pdf(PdfTextSource),
    PlainText(PlainTextSource),
}

impl TextSourceImpl {
    /// Pick the source for `path`; unknown extensions fall back to the PDF
    /// backend when compiled in, else to plain text.
    pub fn for_path(path: &Path) -> Self {
        let plain = PlainTextSource::new();
        if plain.supports_file_type(path) {
            return TextSourceImpl::PlainText(plain);
        }
        #[cfg(feature = "pdf-backend")]
        {
            TextSourceImpl::Pdf(PdfTextSource::new())
        }
        #[cfg(not(feature = "pdf-backend"))]
        {
            TextSourceImpl::PlainText(plain)
        }
    }
}

impl TextSource for TextSourceImpl {
    fn extract_from_bytes(&self, bytes: &[u8]) -> Result<String> {
        match self {
            #[cfg(feature = "pdf-backend")]
            TextSourceImpl::Pdf(source) => source.extract_from_bytes(bytes),
            TextSourceImpl::PlainText(source) => source.extract_from_bytes(bytes),
        }
    }

    fn extract_text(&self, path: &Path) -> Result<String> {
        match self {
            #[cfg(feature = "pdf-backend")]
            TextSourceImpl::Pdf(source) => source.extract_text(path),
            TextSourceImpl::PlainText(source) => source.extract_text(path),
        }
    }

    fn name(&self) -> &str {
        match self {
            #[cfg(feature = "pdf-backend")]
            TextSourceImpl::Pdf(source) => source.name(),
            TextSourceImpl::PlainText(source) => source.name(),
        }
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        match self {
            #[cfg(feature = "pdf-backend")]
            TextSourceImpl::Pdf(source) => source.supports_file_type(path),
            TextSourceImpl::PlainText(source) => source.supports_file_type(path),
        }
    }
}

/// Lower-cased file extension, empty when absent
pub(crate) fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}
