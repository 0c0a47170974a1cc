//! PDF Text Source
//!
//! Linearizes a PDF report with pdf-extract. Column alignment is lost in the
//! process, which is exactly the degradation the parser is built to undo.

use super::source::{extension_of, TextSource};
use anyhow::{anyhow, Context, Result};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct PdfTextSource;

impl PdfTextSource {
    pub fn new() -> Self {
        Self
    }
}

impl TextSource for PdfTextSource {
    fn extract_from_bytes(&self, pdf_bytes: &[u8]) -> Result<String> {
        // pdf-extract can panic on malformed PDFs
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(pdf_bytes)
        }));

        match result {
            Ok(Ok(text)) => {
                debug!("PDF extracted with pdf-extract: {} chars", text.len());
                Ok(text)
            }
            Ok(Err(e)) => Err(anyhow!("PDF extraction failed: {e}")),
            Err(_) => Err(anyhow!("PDF extraction panicked (malformed PDF)")),
        }
    }

    fn extract_text(&self, path: &Path) -> Result<String> {
        let pdf_bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read PDF file: {}", path.display()))?;
        self.extract_from_bytes(&pdf_bytes)
            .with_context(|| format!("Failed to extract text from PDF: {}", path.display()))
    }

    fn name(&self) -> &str {
        "PdfTextSource"
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        extension_of(path) == "pdf"
    }
}
