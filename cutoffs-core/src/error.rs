use thiserror::Error;

/// Failures the parser reports to its caller.
///
/// Structural variants (see `is_structural`) abort a whole document;
/// `CollegeParseFailure` is absorbed by the parser and surfaces as a skipped-college diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CutoffError {
    #[error("Could not extract text from PDF: {reason}")]
    ExtractionFailure { reason: String },

    #[error("Could not extract any colleges from PDF")]
    NoCollegesFound,

    #[error("Every college section failed to parse ({count} found)")]
    AllCollegesFailed { count: usize },

    #[error("Error parsing college {code}: {reason}")]
    CollegeParseFailure { code: String, reason: String },

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl CutoffError {
    pub fn extraction(reason: impl Into<String>) -> Self {
        Self::ExtractionFailure {
            reason: reason.into(),
        }
    }

    /// True for failures that invalidate the whole document
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::ExtractionFailure { .. } | Self::NoCollegesFound | Self::AllCollegesFailed { .. }
        )
    }
}
