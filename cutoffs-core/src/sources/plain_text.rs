use super::source::{extension_of, TextSource};
use anyhow::{Context, Result};
use std::path::Path;

/// Text already extracted from a report by an external tool
#[derive(Debug, Clone, Default)]
pub struct PlainTextSource;

impl PlainTextSource {
    pub fn new() -> Self {
        Self
    }
}

impl TextSource for PlainTextSource {
    fn extract_from_bytes(&self, bytes: &[u8]) -> Result<String> {
        String::from_utf8(bytes.to_vec()).context("Report text is not valid UTF-8")
    }

    fn name(&self) -> &str {
        "PlainTextSource"
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        matches!(extension_of(path).as_str(), "txt" | "text")
    }
}
